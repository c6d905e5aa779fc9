//! Renderer input: everything the live dashboard draws for one frame

use std::sync::Arc;

use serde::Serialize;

use super::FrameAdapter;
use crate::driver::FrameUpdate;
use crate::standings::{Standings, rank_by_position};
use crate::types::{CarSnapshot, LapRecord, LapSlot, PlayerLapHistory, TelemetryFrame};

/// Session type value for a race.
const SESSION_RACE: f32 = 3.0;

/// One row of the timing tower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriverRow {
    pub car: CarSnapshot,
    /// Best lap outside races, last lap in races
    pub shown_lap_time: f32,
    /// Last lap was the car's best so far
    pub last_lap_is_best: bool,
    /// Share of the current lap completed, `None` when the track length is unknown
    pub lap_fraction: Option<f32>,
}

impl DriverRow {
    fn new(car: &CarSnapshot, frame: &TelemetryFrame) -> Self {
        let shown_lap_time =
            if frame.session_type == SESSION_RACE { car.last_lap_time } else { car.best_lap_time };
        Self {
            car: *car,
            shown_lap_time,
            last_lap_is_best: car.last_lap_time == car.best_lap_time,
            lap_fraction: frame.lap_fraction(car),
        }
    }
}

/// Snapshot handed to the dashboard renderer.
///
/// Colors, driver names and unit conversion stay with the renderer; this is
/// only the data it formats.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub sequence: u64,
    pub frame: Arc<TelemetryFrame>,
    /// Timing tower rows in position order; gaps are `None`
    pub tower: Vec<Option<DriverRow>>,
    pub standings: Standings,
    pub laps: Arc<PlayerLapHistory>,
    /// Fastest value of each lap column over completed laps
    pub best_splits: LapRecord,
}

impl DashboardView {
    /// Speed of the player car in m/s.
    pub fn speed(&self) -> f32 {
        self.frame.speed
    }

    /// Throttle and brake application, 0-100.
    pub fn pedals_percent(&self) -> (u8, u8) {
        let pct = |v: f32| (v.clamp(0.0, 1.0) * 100.0) as u8;
        (pct(self.frame.throttle), pct(self.frame.brake))
    }

    pub fn player(&self) -> Option<&CarSnapshot> {
        self.frame.player_car()
    }

    /// Whether `slot` of `record` holds the best value so far.
    pub fn is_best(&self, record: &LapRecord, slot: LapSlot) -> bool {
        let value = record.get(slot);
        value > 0.0 && value == self.best_splits.get(slot)
    }
}

impl FrameAdapter for DashboardView {
    fn adapt(update: &FrameUpdate) -> Self {
        let frame = &update.frame;
        let standings = rank_by_position(&frame.cars);
        let tower = standings
            .slots()
            .iter()
            .map(|slot| slot.as_ref().map(|car| DriverRow::new(car, frame)))
            .collect();

        Self {
            sequence: update.sequence,
            frame: Arc::clone(frame),
            tower,
            standings,
            laps: Arc::clone(&update.laps),
            best_splits: update.laps.best_splits(),
        }
    }
}
