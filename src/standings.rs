//! Tracked-car lookup and race-position ordering.
//!
//! These helpers feed the presentation side; lap aggregation only needs
//! [`player_car`].

use crate::types::{CarSnapshot, CarTable, MAX_CARS, TelemetryFrame};

/// Snapshot of the tracked car, `None` if the player index is outside the valid cars.
pub fn player_car(frame: &TelemetryFrame) -> Option<&CarSnapshot> {
    frame.player_car()
}

/// Cars ordered by race position.
///
/// Slot `i` holds the car in position `i + 1`. Positions nobody reports stay
/// empty, so gaps are visible rather than closed up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Standings {
    slots: [Option<CarSnapshot>; MAX_CARS],
}

impl Standings {
    /// Car in the given slot (`position - 1`), `None` for a gap.
    pub fn slot(&self, index: usize) -> Option<&CarSnapshot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Car holding a 1-indexed race position.
    pub fn at_position(&self, position: u8) -> Option<&CarSnapshot> {
        usize::from(position).checked_sub(1).and_then(|idx| self.slot(idx))
    }

    pub fn leader(&self) -> Option<&CarSnapshot> {
        self.slot(0)
    }

    /// Classified cars in position order, gaps skipped.
    pub fn iter(&self) -> impl Iterator<Item = &CarSnapshot> + '_ {
        self.slots.iter().flatten()
    }

    /// Number of classified cars.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// All slots including gaps.
    pub fn slots(&self) -> &[Option<CarSnapshot>] {
        &self.slots
    }
}

/// Order the valid cars by their race position.
///
/// Cars with position 0 (not classified) or a position beyond the table
/// capacity are left out. When two cars claim the same position the later
/// one in the table wins.
pub fn rank_by_position(cars: &CarTable) -> Standings {
    let mut standings = Standings::default();
    for car in cars {
        let Some(slot) = usize::from(car.car_position).checked_sub(1) else {
            continue;
        };
        if let Some(entry) = standings.slots.get_mut(slot) {
            *entry = Some(*car);
        }
    }
    standings
}
