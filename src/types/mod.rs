//! Core types for decoded telemetry and lap timing.
//!
//! ## Architecture
//!
//! - [`TelemetryFrame`] is one decoded packet: scalar physics and session
//!   fields plus a [`CarTable`] of per-car [`CarSnapshot`]s
//! - [`CarTable`] is a bounded collection: a fixed buffer of [`MAX_CARS`]
//!   records of which only the reported prefix is visible
//! - [`LapRecord`] holds sector 1/2/3 and total time of one lap
//! - [`PlayerLapHistory`] is the growing list of lap records for the tracked car
//! - [`UpdateRate`] controls how often subscribers receive updates
//!
//! ## Usage Example
//!
//! ```rust
//! use trackside::types::{CarSnapshot, CarTable, TelemetryFrame};
//!
//! let player = CarSnapshot { current_lap_num: 2, car_position: 5, ..Default::default() };
//! let frame = TelemetryFrame {
//!     player_car_index: 0,
//!     cars: CarTable::from_cars(&[player]),
//!     ..Default::default()
//! };
//!
//! assert_eq!(frame.player_car().map(|c| c.car_position), Some(5));
//! ```

mod car;
mod frame;
mod lap;
mod update_rate;

pub use car::{CarSnapshot, CarTable, MAX_CARS, PitStatus, Sector};
pub use frame::{TelemetryFrame, WheelArray};
pub use lap::{LapRecord, LapSlot, PlayerLapHistory};
pub use update_rate::UpdateRate;
