//! Replay connection for capture files

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tracing::{info, warn};

use super::Subscriptions;
use crate::adapters::FrameAdapter;
use crate::config::ReplayConfig;
use crate::driver::{Driver, DriverOptions, DriverStats, FrameUpdate};
use crate::provider::Provider;
use crate::providers::ReplayProvider;
use crate::types::{PlayerLapHistory, UpdateRate};
use crate::{Result, TelemetryError};

/// How long `open` waits for the first decoded frame, on top of the time
/// paced playback of the whole capture can take.
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Replay connection from a capture file
pub struct ReplayConnection {
    pub(super) subs: Subscriptions,
}

impl ReplayConnection {
    /// Open a capture for replay.
    ///
    /// Waits until the first frame has been decoded (or the capture turned
    /// out to hold none) so subscriptions start with data.
    pub async fn open(path: impl AsRef<Path>, config: &ReplayConfig) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening capture");

        let provider = ReplayProvider::open(path, config)?;
        let source_hz = provider.tick_rate();
        let wait = FIRST_FRAME_TIMEOUT.saturating_add(provider.remaining_playback());
        let channels = Driver::spawn(provider, DriverOptions::default());

        let mut stats = channels.stats.clone();
        let first = tokio::time::timeout(wait, async {
            // Err means the task ended before any frame decoded.
            stats.wait_for(|s| s.decoded > 0).await.is_ok()
        })
        .await;

        match first {
            Ok(true) => {}
            Ok(false) => warn!(path = %path.display(), "Capture contained no decodable frames"),
            Err(_) => {
                channels.cancel.cancel();
                return Err(TelemetryError::Timeout { duration: wait });
            }
        }

        info!(source_hz, "Replay connection opened");
        Ok(Self { subs: Subscriptions::new(channels, source_hz) })
    }

    /// Subscribe to updates, projected through `T` and rate limited by `rate`
    pub fn subscribe<T>(&self, rate: UpdateRate) -> impl Stream<Item = T> + Send + 'static
    where
        T: FrameAdapter + Send + 'static,
    {
        self.subs.subscribe(rate)
    }

    /// Lap history, yielding the current value then every change
    pub fn lap_updates(&self) -> impl Stream<Item = Arc<PlayerLapHistory>> + Send + 'static {
        self.subs.lap_updates()
    }

    pub fn current_laps(&self) -> Arc<PlayerLapHistory> {
        self.subs.current_laps()
    }

    pub fn latest(&self) -> Option<Arc<FrameUpdate>> {
        self.subs.latest()
    }

    pub fn stats(&self) -> DriverStats {
        self.subs.stats()
    }

    pub fn source_hz(&self) -> f64 {
        self.subs.source_hz()
    }

    /// Resolves once the whole capture has been ingested.
    pub async fn finished(&self) {
        let mut updates = self.subs.updates();
        while updates.changed().await.is_ok() {}
    }
}
