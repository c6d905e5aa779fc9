//! Async Rust library for F1 2017 UDP telemetry.
//!
//! Trackside decodes the game's legacy fixed-size telemetry packet, keeps a
//! per-lap sector timing history for the player's car and hands both to
//! subscribers as `futures::Stream`s.
//!
//! # Features
//!
//! - **Live ingestion**: listens for the game on UDP (default port 20777)
//! - **Lap timing**: sector 1/2/3 and total for every lap, derived from the
//!   cumulative timers the game reports
//! - **Replay**: record sessions to capture files and play them back
//! - **Projections**: dashboard and metric views via [`FrameAdapter`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use trackside::{DashboardView, ListenerConfig, Trackside, UpdateRate};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> trackside::Result<()> {
//!     let connection = Trackside::listen(&ListenerConfig::default()).await?;
//!     let mut views = Box::pin(connection.subscribe::<DashboardView>(UpdateRate::Max(10)));
//!
//!     while let Some(view) = views.next().await {
//!         println!("{:.1} m/s, {} laps", view.speed(), view.laps.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod capture;
pub mod config;
mod error;
pub mod laps;
pub mod packet;
pub mod standings;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Stream-based ingestion
pub mod connection;
pub mod driver;
pub mod provider;
pub mod providers;
pub mod stream;

pub use adapters::*;
pub use config::{ListenerConfig, ReplayConfig, TracksideConfig};
pub use error::*;
pub use laps::LapAggregator;
pub use standings::{Standings, rank_by_position};
pub use types::*;

pub use connection::replay::ReplayConnection;
pub use connection::udp::UdpConnection;
pub use driver::{DriverStats, FrameUpdate};

/// Entry point for telemetry connections.
///
/// ```rust,no_run
/// use trackside::Trackside;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> trackside::Result<()> {
/// let connection = Trackside::replay("session.cap").await?;
/// connection.finished().await;
/// println!("{} laps", connection.current_laps().len());
/// # Ok(())
/// # }
/// ```
pub struct Trackside;

impl Trackside {
    /// Listen for the game on `config.bind_addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the socket cannot
    /// be bound.
    pub async fn listen(config: &ListenerConfig) -> Result<UdpConnection> {
        UdpConnection::bind(config).await
    }

    /// Replay a capture file in real time.
    pub async fn replay<P: AsRef<std::path::Path>>(path: P) -> Result<ReplayConnection> {
        Self::replay_with(path, &ReplayConfig::default()).await
    }

    /// Replay a capture file with explicit pacing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed, or no frame
    /// decodes before the first-frame timeout.
    pub async fn replay_with<P: AsRef<std::path::Path>>(
        path: P,
        config: &ReplayConfig,
    ) -> Result<ReplayConnection> {
        config.validate()?;
        ReplayConnection::open(path, config).await
    }
}
