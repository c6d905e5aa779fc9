//! Subscriber projections of frame updates.
//!
//! A connection publishes [`FrameUpdate`](crate::driver::FrameUpdate)s; each
//! subscriber picks the shape it wants through [`FrameAdapter`]:
//!
//! - [`DashboardView`]: frame, timing tower, lap history and best splits for
//!   the live dashboard
//! - [`MetricBatch`]: tagged time-series points for the metrics exporter
//! - `Arc<TelemetryFrame>` / `Arc<PlayerLapHistory>` / `FrameUpdate`: raw access
//!
//! # Example Usage
//!
//! ```rust
//! use trackside::adapters::FrameAdapter;
//! use trackside::driver::FrameUpdate;
//!
//! /// Just the numbers a shift light needs.
//! struct ShiftLight {
//!     rev_percent: u8,
//!     gear: f32,
//! }
//!
//! impl FrameAdapter for ShiftLight {
//!     fn adapt(update: &FrameUpdate) -> Self {
//!         Self { rev_percent: update.frame.rev_lights_percent, gear: update.frame.gear }
//!     }
//! }
//! ```

mod dashboard;
mod frame_adapter;
mod metrics;

pub use dashboard::{DashboardView, DriverRow};
pub use frame_adapter::FrameAdapter;
pub use metrics::{CAR_MEASUREMENT, FieldValue, MetricBatch, MetricPoint, TELEMETRY_MEASUREMENT};
