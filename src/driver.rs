//! Driver spawns and manages the ingestion task

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::ListenerConfig;
use crate::laps::LapAggregator;
use crate::packet;
use crate::provider::Provider;
use crate::types::{PlayerLapHistory, TelemetryFrame};

/// Consecutive provider errors tolerated before the task gives up.
const MAX_ERRORS: u32 = 10;

/// One decoded frame paired with the lap history as of that frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUpdate {
    /// Count of decoded frames, starting at 1
    pub sequence: u64,
    pub frame: Arc<TelemetryFrame>,
    pub laps: Arc<PlayerLapHistory>,
}

/// Ingestion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DriverStats {
    /// Packets handed over by the provider
    pub packets: u64,
    pub decoded: u64,
    /// Packets that failed to decode
    pub dropped: u64,
    pub provider_errors: u64,
}

/// How the driver treats incoming packets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Only accept packets of exactly the documented size
    pub strict_length: bool,
}

impl From<&ListenerConfig> for DriverOptions {
    fn from(config: &ListenerConfig) -> Self {
        Self { strict_length: config.strict_length }
    }
}

/// Result of spawning the driver task
pub struct DriverChannels {
    /// Latest frame with its lap history; `None` before the first frame and after the end
    pub updates: watch::Receiver<Option<Arc<FrameUpdate>>>,
    /// Lap history alone, updated only when it changes
    pub laps: watch::Receiver<Arc<PlayerLapHistory>>,
    pub stats: watch::Receiver<DriverStats>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the ingestion task
///
/// The task owns the provider and the only [`LapAggregator`]. Readers get
/// immutable snapshots through watch channels and never block it.
pub struct Driver;

impl Driver {
    /// Spawn the ingestion task for the given provider
    pub fn spawn<P>(provider: P, options: DriverOptions) -> DriverChannels
    where
        P: Provider,
    {
        let (update_tx, update_rx) = watch::channel(None);
        let (laps_tx, laps_rx) = watch::channel(Arc::new(PlayerLapHistory::new()));
        let (stats_tx, stats_rx) = watch::channel(DriverStats::default());
        let cancel = CancellationToken::new();

        let task = IngestTask { update_tx, laps_tx, stats_tx, options };
        let cancel_task = cancel.clone();
        tokio::spawn(async move {
            task.run(provider, cancel_task).await;
        });

        DriverChannels { updates: update_rx, laps: laps_rx, stats: stats_rx, cancel }
    }
}

struct IngestTask {
    update_tx: watch::Sender<Option<Arc<FrameUpdate>>>,
    laps_tx: watch::Sender<Arc<PlayerLapHistory>>,
    stats_tx: watch::Sender<DriverStats>,
    options: DriverOptions,
}

impl IngestTask {
    async fn run<P: Provider>(self, mut provider: P, cancel: CancellationToken) {
        info!(tick_rate = provider.tick_rate(), "Ingestion task started");
        let mut aggregator = LapAggregator::new();
        let mut laps = Arc::new(PlayerLapHistory::new());
        let mut stats = DriverStats::default();
        let mut error_count = 0u32;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Ingestion cancelled");
                    break;
                }
                result = provider.next_packet() => result,
            };

            match result {
                Ok(Some(bytes)) => {
                    error_count = 0;
                    stats.packets += 1;

                    let decoded = if self.options.strict_length {
                        packet::decode_strict(&bytes)
                    } else {
                        packet::decode(&bytes)
                    };
                    let frame = match decoded {
                        Ok(frame) => frame,
                        Err(e) => {
                            stats.dropped += 1;
                            warn!(error = %e, dropped = stats.dropped, "Dropped packet");
                            self.stats_tx.send_replace(stats);
                            continue;
                        }
                    };
                    stats.decoded += 1;

                    if aggregator.ingest(&frame) {
                        laps = Arc::new(aggregator.snapshot());
                        self.laps_tx.send_replace(Arc::clone(&laps));
                        trace!(laps = laps.len(), "Lap history published");
                    }

                    let update = FrameUpdate {
                        sequence: stats.decoded,
                        frame: Arc::new(frame),
                        laps: Arc::clone(&laps),
                    };
                    if self.update_tx.send(Some(Arc::new(update))).is_err() {
                        debug!("Update receivers dropped, shutting down");
                        break;
                    }
                    self.stats_tx.send_replace(stats);
                }
                Ok(None) => {
                    info!(frames = stats.decoded, "Provider stream ended");
                    self.update_tx.send_replace(None);
                    break;
                }
                Err(e) => {
                    error_count += 1;
                    stats.provider_errors += 1;
                    self.stats_tx.send_replace(stats);

                    if e.is_fatal() || error_count >= MAX_ERRORS {
                        error!(error = %e, consecutive = error_count, "Provider failed, shutting down");
                        for suggestion in e.recovery_suggestions() {
                            info!("  - {suggestion}");
                        }
                        self.update_tx.send_replace(None);
                        break;
                    }

                    let backoff = backoff_delay(error_count);
                    warn!(error = %e, consecutive = error_count, ?backoff, "Provider error, retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        info!(
            packets = stats.packets,
            decoded = stats.decoded,
            dropped = stats.dropped,
            laps = aggregator.history().len(),
            "Ingestion task ended"
        );
    }
}

/// 50 ms, 100 ms, 200 ms, ... capped at 1.6 s.
fn backoff_delay(consecutive_errors: u32) -> Duration {
    let exponent = consecutive_errors.saturating_sub(1).min(5);
    Duration::from_millis(50 << exponent)
}
