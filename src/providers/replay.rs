//! Replay provider for capture files

use std::path::Path;

use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::Result;
use crate::capture::CaptureReader;
use crate::config::ReplayConfig;
use crate::provider::Provider;

/// Shortest gap between paced records; `interval` rejects a zero period.
const MIN_PACE: Duration = Duration::from_micros(1);

/// Replays a capture at its recorded tick rate, scaled by the configured speed.
pub struct ReplayProvider {
    reader: CaptureReader,

    /// Time between records, `None` when pacing is off
    pace: Option<Duration>,

    /// Created on first read so construction works outside a runtime
    interval: Option<Interval>,

    tick_rate: f64,
}

impl ReplayProvider {
    pub fn open(path: impl AsRef<Path>, config: &ReplayConfig) -> Result<Self> {
        config.validate()?;
        let reader = CaptureReader::open(path)?;
        info!(
            path = %reader.path().display(),
            tick_rate = reader.tick_rate(),
            records = reader.header().record_count,
            "Opened capture for replay"
        );
        Ok(Self::from_reader(reader, config))
    }

    pub fn from_reader(reader: CaptureReader, config: &ReplayConfig) -> Self {
        let tick_rate = f64::from(reader.tick_rate());
        let pace = config
            .effective_speed()
            .map(|speed| Duration::from_secs_f64(1.0 / (tick_rate * speed)).max(MIN_PACE));
        debug!(?pace, "Replay pacing");
        Self { reader, pace, interval: None, tick_rate }
    }

    /// Time between records, `None` when pacing is off.
    pub fn pace(&self) -> Option<Duration> {
        self.pace
    }

    /// Longest the rest of the capture can take to play back at this pace.
    pub fn remaining_playback(&self) -> Duration {
        let Some(pace) = self.pace else {
            return Duration::ZERO;
        };
        let records = u32::try_from(self.reader.remaining_records_hint()).unwrap_or(u32::MAX);
        pace.checked_mul(records).unwrap_or(Duration::MAX)
    }

    /// Seconds of recording replayed so far.
    pub fn position_secs(&self) -> f64 {
        self.reader.records_read() as f64 / self.tick_rate
    }
}

#[async_trait::async_trait]
impl Provider for ReplayProvider {
    async fn next_packet(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(record) = self.reader.next_record()? else {
            debug!(records = self.reader.records_read(), "Reached end of capture");
            return Ok(None);
        };

        if let Some(pace) = self.pace {
            let ticker = self.interval.get_or_insert_with(|| {
                let mut ticker = interval(pace);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker
            });
            ticker.tick().await;
        }

        trace!(record = self.reader.records_read(), bytes = record.len(), "Replayed record");
        Ok(Some(record))
    }

    fn tick_rate(&self) -> f64 {
        self.tick_rate
    }
}
