//! Lap and sector aggregation for the tracked car.
//!
//! The game never announces "lap complete" or "sector complete". It reports,
//! per car, the lap number, the current sector index, the time elapsed in the
//! current lap, the last completed lap time and the sector 1 / sector 2 times.
//! [`LapAggregator`] turns that per-tick snapshot into a [`PlayerLapHistory`]:
//!
//! | sector byte | previous lap (`n - 1`)                          | current lap (`n`)                      |
//! |-------------|-------------------------------------------------|----------------------------------------|
//! | any         | total = last lap time                           | total = elapsed                        |
//! | 0           | s1, s2 = reported; s3 = last lap - s1 - s2      | s1 = elapsed                           |
//! | 1           |                                                 | s1 = reported; s2 = elapsed - s1       |
//! | 2           |                                                 | s1, s2 = reported; s3 = elapsed - s1 - s2 |
//!
//! Sector 3 is never reported, so it is always derived by subtraction. If the
//! frame at a sector boundary is lost the derived split for that lap is
//! silently off; nothing tries to detect or repair that.

use tracing::{debug, info, trace};

use crate::types::{CarSnapshot, LapSlot, PlayerLapHistory, TelemetryFrame};

/// Maintains the lap history of the car at each frame's player index.
///
/// Not shareable between writers: exactly one ingestion path drives it, and
/// readers take snapshots.
#[derive(Debug, Clone, Default)]
pub struct LapAggregator {
    history: PlayerLapHistory,
    tracked_lap: Option<u8>,
}

impl LapAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame into the history. Returns whether the history changed.
    ///
    /// Frames whose player index is outside the valid cars, or which report
    /// lap 0, are ignored.
    pub fn ingest(&mut self, frame: &TelemetryFrame) -> bool {
        match frame.player_car() {
            Some(car) => self.apply(car),
            None => {
                trace!(
                    player_car_index = frame.player_car_index,
                    num_cars = frame.cars.len(),
                    "Player index out of range, frame ignored"
                );
                false
            }
        }
    }

    fn apply(&mut self, car: &CarSnapshot) -> bool {
        let lap = usize::from(car.current_lap_num);
        if lap == 0 {
            return false;
        }

        let added = self.history.ensure_lap(lap);
        if added > 0 {
            debug!(lap, added, "Started tracking new lap");
        }
        let mut changed = added > 0;

        let elapsed = car.current_lap_time;
        let s1 = car.sector1_time;
        let s2 = car.sector2_time;
        let h = &mut self.history;

        if lap >= 2 {
            changed |= h.write(lap - 1, LapSlot::Total, car.last_lap_time);
        }
        changed |= h.write(lap, LapSlot::Total, elapsed);

        match car.sector {
            0 => {
                if lap >= 2 {
                    changed |= h.write(lap - 1, LapSlot::Sector1, s1);
                    changed |= h.write(lap - 1, LapSlot::Sector2, s2);
                    changed |= h.write(lap - 1, LapSlot::Sector3, car.last_lap_time - s1 - s2);
                    changed |= h.write(lap, LapSlot::Sector1, elapsed);
                }
            }
            1 => {
                changed |= h.write(lap, LapSlot::Sector1, s1);
                changed |= h.write(lap, LapSlot::Sector2, elapsed - s1);
            }
            2 => {
                changed |= h.write(lap, LapSlot::Sector1, s1);
                changed |= h.write(lap, LapSlot::Sector2, s2);
                changed |= h.write(lap, LapSlot::Sector3, elapsed - s1 - s2);
            }
            other => {
                trace!(sector = other, "Unknown sector index, splits left untouched");
            }
        }

        if self.tracked_lap != Some(car.current_lap_num) {
            if let Some(done) = self.history.get(lap - 1).filter(|_| lap >= 2 && car.sector == 0) {
                info!(
                    lap = lap - 1,
                    sector1 = done.sector1(),
                    sector2 = done.sector2(),
                    sector3 = done.sector3(),
                    total = done.total(),
                    "Lap completed"
                );
            }
            self.tracked_lap = Some(car.current_lap_num);
        }

        changed
    }

    pub fn history(&self) -> &PlayerLapHistory {
        &self.history
    }

    /// Owned copy of the history for hand-off to readers.
    pub fn snapshot(&self) -> PlayerLapHistory {
        self.history.clone()
    }

    /// Lap number of the tracked car in the last accepted frame.
    pub fn tracked_lap(&self) -> Option<u8> {
        self.tracked_lap
    }
}
