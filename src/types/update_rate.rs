//! Update rate control for subscriber streams

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Update rate requested by a subscriber.
///
/// The game sends at the rate selected in its telemetry settings (up to
/// 60Hz). Dashboards rarely need that; exporters usually do.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum UpdateRate {
    /// Every decoded packet
    #[default]
    Native,

    /// At most this many updates per second, latest wins.
    /// Rates at or above the source rate fall back to `Native`.
    Max(u32),
}

impl UpdateRate {
    /// Resolve the rate against the source frequency.
    pub fn normalize(self, source_hz: f64) -> Self {
        match self {
            UpdateRate::Max(hz) if hz == 0 || f64::from(hz) >= source_hz => UpdateRate::Native,
            other => other,
        }
    }

    /// Interval between emitted updates, `None` when no throttling applies.
    pub fn throttle_interval(self, source_hz: f64) -> Option<Duration> {
        match self.normalize(source_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / f64::from(hz))),
        }
    }
}
