//! Byte layout of the legacy F1 telemetry packet
//!
//! ## Packet Structure
//!
//! Every field is packed with no padding, little-endian:
//!
//! 1. **Motion block** (offset 0) - 17 `f32`: times, distances, position, speed, velocity, orientation
//! 2. **Suspension/wheels** (offset 68) - 3 x `[f32; 4]`, order RL, RR, FL, FR
//! 3. **Inputs and car state** (offset 116) - 22 `f32`, ending with the player's sector times
//! 4. **Brakes/tyres** (offset 204) - 2 x `[f32; 4]`
//! 5. **Session block** (offset 236) - 17 `f32`: team, laps, track, rpm limits, flags, angular velocity
//! 6. **Byte block** (offset 304) - tyre temps/wear, compound, bias, damage, pit limiter
//! 7. **Session time left** (offset 328) - `f32`
//! 8. **Spectator and car count** (offset 332) - 5 `u8`
//! 9. **Car records** (offset 337) - [`MAX_CARS`](crate::types::MAX_CARS) x 45 bytes
//!
//! The game appends a motion extension after the car records which this
//! layout does not cover.

use crate::types::MAX_CARS;

/// Size of one per-car record in bytes.
pub const CAR_RECORD_SIZE: usize = 45;

/// Offset of the first car record.
pub const CARS_OFFSET: usize = 337;

/// Bytes covered by the layout: everything up to the end of the car array.
pub const PACKET_SIZE: usize = CARS_OFFSET + MAX_CARS * CAR_RECORD_SIZE;

/// Bytes the game actually sends per datagram, motion extension included.
pub const GAME_DATAGRAM_SIZE: usize = PACKET_SIZE + MOTION_EXTENSION_SIZE;

/// Trailing yaw/pitch/roll, local velocity, suspension and angular accelerations.
pub const MOTION_EXTENSION_SIZE: usize = 52;

// Offsets used outside the sequential decoder (tests, quick peeks).
pub const OFF_SPEED: usize = 28;
pub const OFF_THROTTLE: usize = 116;
pub const OFF_BRAKE: usize = 124;
pub const OFF_SESSION_TIME_LEFT: usize = 328;
pub const OFF_NUM_CARS: usize = 335;
pub const OFF_PLAYER_CAR_INDEX: usize = 336;

// Within a car record.
pub const CAR_OFF_LAST_LAP_TIME: usize = 12;
pub const CAR_OFF_CURRENT_LAP_NUM: usize = 39;
pub const CAR_OFF_SECTOR: usize = 42;

/// Offset of car `index`'s record within the packet.
pub const fn car_offset(index: usize) -> usize {
    CARS_OFFSET + index * CAR_RECORD_SIZE
}
