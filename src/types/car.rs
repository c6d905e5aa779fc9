//! Per-car state and the bounded car table

use serde::{Deserialize, Serialize};

/// Capacity of the per-car array in every packet.
pub const MAX_CARS: usize = 20;

/// Track sector as reported by the car's sector byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Sector {
    First,
    Second,
    Third,
}

impl Sector {
    /// Interpret a raw sector byte (0, 1 or 2).
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Sector::First),
            1 => Some(Sector::Second),
            2 => Some(Sector::Third),
            _ => None,
        }
    }
}

/// Pit lane status as reported by the car's pit byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum PitStatus {
    OnTrack,
    Pitting,
    InPitArea,
}

impl PitStatus {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(PitStatus::OnTrack),
            1 => Some(PitStatus::Pitting),
            2 => Some(PitStatus::InPitArea),
            _ => None,
        }
    }
}

/// State of one car at the instant of a frame.
///
/// Byte-sized fields are kept exactly as received. Use [`CarSnapshot::sector`]
/// and [`CarSnapshot::pit_status`] for interpreted views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CarSnapshot {
    /// World co-ordinates of the vehicle
    pub world_position: [f32; 3],
    /// Total time of the last completed lap
    pub last_lap_time: f32,
    /// Elapsed time in the current lap
    pub current_lap_time: f32,
    pub best_lap_time: f32,
    /// Sector 1 time of the current lap, or of the lap just completed while in sector 1
    pub sector1_time: f32,
    /// Sector 2 time, same semantics as `sector1_time`
    pub sector2_time: f32,
    pub lap_distance: f32,
    pub driver_id: u8,
    pub team_id: u8,
    /// Race position, 1-indexed. Zero means not yet classified.
    pub car_position: u8,
    /// Current lap number, 1-indexed
    pub current_lap_num: u8,
    pub tyre_compound: u8,
    pub in_pits: u8,
    /// Raw sector index: 0, 1 or 2 for sector 1, 2 or 3
    pub sector: u8,
    pub current_lap_invalid: u8,
    /// Accumulated time penalties in seconds
    pub penalties: u8,
}

impl CarSnapshot {
    pub fn sector(&self) -> Option<Sector> {
        Sector::from_raw(self.sector)
    }

    pub fn pit_status(&self) -> Option<PitStatus> {
        PitStatus::from_raw(self.in_pits)
    }

    /// Whether the car has a race position yet.
    pub fn is_classified(&self) -> bool {
        self.car_position != 0
    }

    pub fn lap_invalid(&self) -> bool {
        self.current_lap_invalid != 0
    }
}

/// Fixed-capacity car buffer plus the number of valid entries.
///
/// Every packet carries [`MAX_CARS`] records but only the first `num_cars` are
/// meaningful. The table keeps all records (so a frame can be re-encoded
/// bit-for-bit) and only exposes the valid prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarTable {
    cars: [CarSnapshot; MAX_CARS],
    num_cars: u8,
}

impl CarTable {
    /// Build a table from a full buffer and the car count reported on the wire.
    pub fn new(cars: [CarSnapshot; MAX_CARS], num_cars: u8) -> Self {
        Self { cars, num_cars }
    }

    /// Build a table holding `cars` as its valid prefix.
    ///
    /// Entries beyond [`MAX_CARS`] are dropped.
    pub fn from_cars(cars: &[CarSnapshot]) -> Self {
        let mut buffer = [CarSnapshot::default(); MAX_CARS];
        let count = cars.len().min(MAX_CARS);
        buffer[..count].copy_from_slice(&cars[..count]);
        Self { cars: buffer, num_cars: count as u8 }
    }

    /// Number of valid cars, clamped to [`MAX_CARS`].
    pub fn len(&self) -> usize {
        usize::from(self.num_cars).min(MAX_CARS)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Car count exactly as reported by the packet.
    pub fn reported_count(&self) -> u8 {
        self.num_cars
    }

    pub fn as_slice(&self) -> &[CarSnapshot] {
        &self.cars[..self.len()]
    }

    pub fn get(&self, index: usize) -> Option<&CarSnapshot> {
        self.as_slice().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CarSnapshot> {
        self.as_slice().iter()
    }

    /// The whole buffer, including records past the valid prefix.
    pub(crate) fn raw(&self) -> &[CarSnapshot; MAX_CARS] {
        &self.cars
    }
}

impl<'a> IntoIterator for &'a CarTable {
    type Item = &'a CarSnapshot;
    type IntoIter = std::slice::Iter<'a, CarSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(position: u8) -> CarSnapshot {
        CarSnapshot { car_position: position, current_lap_num: 1, ..Default::default() }
    }

    #[test]
    fn only_reported_prefix_is_visible() {
        let mut cars = [CarSnapshot::default(); MAX_CARS];
        cars[0] = car(1);
        cars[1] = car(2);
        cars[5] = car(6);
        let table = CarTable::new(cars, 2);

        assert_eq!(table.len(), 2);
        assert!(table.get(1).is_some());
        assert!(table.get(5).is_none());
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn oversized_count_is_clamped() {
        let table = CarTable::new([CarSnapshot::default(); MAX_CARS], 64);
        assert_eq!(table.len(), MAX_CARS);
        assert_eq!(table.reported_count(), 64);
    }

    #[test]
    fn from_cars_drops_overflow() {
        let cars = vec![car(1); MAX_CARS + 3];
        let table = CarTable::from_cars(&cars);
        assert_eq!(table.len(), MAX_CARS);
    }

    #[test]
    fn raw_bytes_are_interpreted_lazily() {
        let mut snapshot = car(4);
        snapshot.sector = 7;
        snapshot.in_pits = 1;
        assert_eq!(snapshot.sector(), None);
        assert_eq!(snapshot.pit_status(), Some(PitStatus::Pitting));
        assert_eq!(Sector::from_raw(2), Some(Sector::Third));
    }
}
