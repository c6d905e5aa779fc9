//! Lap timing records

use serde::{Deserialize, Serialize};

/// Column of a [`LapRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LapSlot {
    Sector1 = 0,
    Sector2 = 1,
    Sector3 = 2,
    Total = 3,
}

impl LapSlot {
    pub const ALL: [LapSlot; 4] = [LapSlot::Sector1, LapSlot::Sector2, LapSlot::Sector3, LapSlot::Total];
}

/// Sector 1, sector 2, sector 3 and total time of one lap, in seconds.
///
/// Zero means the value is not known yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LapRecord([f32; 4]);

impl LapRecord {
    pub fn new(sector1: f32, sector2: f32, sector3: f32, total: f32) -> Self {
        Self([sector1, sector2, sector3, total])
    }

    pub fn get(&self, slot: LapSlot) -> f32 {
        self.0[slot as usize]
    }

    pub fn sector1(&self) -> f32 {
        self.get(LapSlot::Sector1)
    }

    pub fn sector2(&self) -> f32 {
        self.get(LapSlot::Sector2)
    }

    pub fn sector3(&self) -> f32 {
        self.get(LapSlot::Sector3)
    }

    pub fn total(&self) -> f32 {
        self.get(LapSlot::Total)
    }

    pub fn as_array(&self) -> [f32; 4] {
        self.0
    }

    /// Sum of the three sector times.
    pub fn splits_total(&self) -> f32 {
        self.sector1() + self.sector2() + self.sector3()
    }

    /// Whether every slot holds a value.
    pub fn is_complete(&self) -> bool {
        self.0.iter().all(|v| *v > 0.0)
    }

    /// Store `value` in `slot`, returning whether the record changed.
    pub(crate) fn set(&mut self, slot: LapSlot, value: f32) -> bool {
        let current = &mut self.0[slot as usize];
        if current.to_bits() == value.to_bits() {
            return false;
        }
        *current = value;
        true
    }
}

impl From<[f32; 4]> for LapRecord {
    fn from(values: [f32; 4]) -> Self {
        Self(values)
    }
}

/// Lap records of the tracked car, indexed by `lap_number - 1`.
///
/// Grows as the car starts new laps and is never truncated. The last entry is
/// the lap in progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct PlayerLapHistory {
    laps: Vec<LapRecord>,
}

impl PlayerLapHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LapRecord> {
        self.laps.iter()
    }

    /// Record for a 1-indexed lap number.
    pub fn get(&self, lap_number: usize) -> Option<&LapRecord> {
        lap_number.checked_sub(1).and_then(|idx| self.laps.get(idx))
    }

    /// The lap currently being driven.
    pub fn in_progress(&self) -> Option<&LapRecord> {
        self.laps.last()
    }

    /// Every lap before the one in progress.
    pub fn completed(&self) -> &[LapRecord] {
        match self.laps.split_last() {
            Some((_, done)) => done,
            None => &[],
        }
    }

    pub fn last_completed(&self) -> Option<&LapRecord> {
        self.completed().last()
    }

    /// Fastest non-zero value of each column across completed laps.
    ///
    /// Columns with no value yet stay at zero.
    pub fn best_splits(&self) -> LapRecord {
        let mut best = LapRecord::default();
        for lap in self.completed() {
            for slot in LapSlot::ALL {
                let value = lap.get(slot);
                if value > 0.0 && (best.get(slot) == 0.0 || value < best.get(slot)) {
                    best.set(slot, value);
                }
            }
        }
        best
    }

    /// Append empty records until `lap_number` has one. Returns how many were added.
    pub(crate) fn ensure_lap(&mut self, lap_number: usize) -> usize {
        let missing = lap_number.saturating_sub(self.laps.len());
        self.laps.resize(self.laps.len() + missing, LapRecord::default());
        missing
    }

    /// Write one slot of a 1-indexed lap, returning whether anything changed.
    pub(crate) fn write(&mut self, lap_number: usize, slot: LapSlot, value: f32) -> bool {
        match lap_number.checked_sub(1).and_then(|idx| self.laps.get_mut(idx)) {
            Some(record) => record.set(slot, value),
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a PlayerLapHistory {
    type Item = &'a LapRecord;
    type IntoIter = std::slice::Iter<'a, LapRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(records: &[[f32; 4]]) -> PlayerLapHistory {
        let mut history = PlayerLapHistory::new();
        history.ensure_lap(records.len());
        for (idx, record) in records.iter().enumerate() {
            for slot in LapSlot::ALL {
                history.write(idx + 1, slot, record[slot as usize]);
            }
        }
        history
    }

    #[test]
    fn ensure_lap_is_idempotent() {
        let mut history = PlayerLapHistory::new();
        assert_eq!(history.ensure_lap(3), 3);
        assert_eq!(history.ensure_lap(3), 0);
        assert_eq!(history.ensure_lap(1), 0);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn lap_numbers_are_one_indexed() {
        let history = history_of(&[[1.0, 2.0, 3.0, 6.0]]);
        assert!(history.get(0).is_none());
        assert_eq!(history.get(1).map(LapRecord::total), Some(6.0));
        assert!(history.get(2).is_none());
    }

    #[test]
    fn write_reports_changes_only() {
        let mut history = PlayerLapHistory::new();
        history.ensure_lap(1);
        assert!(history.write(1, LapSlot::Total, 12.5));
        assert!(!history.write(1, LapSlot::Total, 12.5));
        assert!(!history.write(4, LapSlot::Total, 1.0));
    }

    #[test]
    fn completed_excludes_lap_in_progress() {
        let history = history_of(&[[30.0, 30.0, 30.0, 90.0], [29.0, 0.0, 0.0, 35.0]]);
        assert_eq!(history.completed().len(), 1);
        assert_eq!(history.in_progress().map(LapRecord::sector1), Some(29.0));
        assert_eq!(history.last_completed().map(LapRecord::total), Some(90.0));
    }

    #[test]
    fn best_splits_pick_fastest_per_column() {
        let history = history_of(&[
            [30.0, 31.0, 32.0, 93.0],
            [29.5, 31.5, 0.0, 0.0],
            [31.0, 30.0, 31.0, 92.0],
            [10.0, 0.0, 0.0, 10.0],
        ]);
        let best = history.best_splits();
        assert_eq!(best.as_array(), [29.5, 30.0, 31.0, 92.0]);
    }

    #[test]
    fn record_completeness() {
        let record = LapRecord::new(28.0, 30.0, 32.0, 90.0);
        assert!(record.is_complete());
        assert_eq!(record.splits_total(), 90.0);
        assert!(!LapRecord::new(28.0, 0.0, 0.0, 28.0).is_complete());
    }
}
