//! Decoded telemetry frame

use serde::{Deserialize, Serialize};

use super::{CarSnapshot, CarTable};

/// Four wheel-indexed values in wire order: rear-left, rear-right, front-left, front-right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelArray<T>(pub [T; 4]);

impl<T: Copy> WheelArray<T> {
    pub fn rear_left(&self) -> T {
        self.0[0]
    }

    pub fn rear_right(&self) -> T {
        self.0[1]
    }

    pub fn front_left(&self) -> T {
        self.0[2]
    }

    pub fn front_right(&self) -> T {
        self.0[3]
    }

    pub fn as_array(&self) -> [T; 4] {
        self.0
    }
}

/// One decoded telemetry packet.
///
/// Field order follows the wire layout. Floats are SI units unless noted;
/// byte fields are percentages or raw enum values passed through as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    /// Session time in seconds
    pub time: f32,
    pub lap_time: f32,
    pub lap_distance: f32,
    pub total_distance: f32,
    /// World space position
    pub position: [f32; 3],
    /// Speed of car in m/s
    pub speed: f32,
    /// Velocity in world space
    pub velocity: [f32; 3],
    /// World space right direction
    pub right_dir: [f32; 3],
    /// World space forward direction
    pub forward_dir: [f32; 3],

    pub susp_pos: WheelArray<f32>,
    pub susp_vel: WheelArray<f32>,
    pub wheel_speed: WheelArray<f32>,

    pub throttle: f32,
    pub steer: f32,
    pub brake: f32,
    pub clutch: f32,
    pub gear: f32,
    pub gforce_lat: f32,
    pub gforce_lon: f32,
    pub lap: f32,
    pub engine_rate: f32,
    pub sli_pro_native_support: f32,
    pub car_position: f32,
    pub kers_level: f32,
    pub kers_max_level: f32,
    /// 0 = off, 1 = on
    pub drs: f32,
    /// 0 (off) - 2 (high)
    pub traction_control: f32,
    pub anti_lock_brakes: f32,
    pub fuel_in_tank: f32,
    pub fuel_capacity: f32,
    /// 0 = none, 1 = pitting, 2 = in pit area
    pub in_pits: f32,
    /// 0 = sector 1, 1 = sector 2, 2 = sector 3
    pub sector: f32,
    pub sector1_time: f32,
    pub sector2_time: f32,

    /// Brake temperatures in degrees Celsius
    pub brakes_temp: WheelArray<f32>,
    /// Tyre pressures in PSI
    pub tyres_pressure: WheelArray<f32>,

    pub team_info: f32,
    pub total_laps: f32,
    /// Track length in metres
    pub track_size: f32,
    pub last_lap_time: f32,
    pub max_rpm: f32,
    pub idle_rpm: f32,
    pub max_gears: f32,
    /// 0 = unknown, 1 = practice, 2 = qualifying, 3 = race
    pub session_type: f32,
    /// 0 = not allowed, 1 = allowed, -1 = unknown
    pub drs_allowed: f32,
    /// -1 for unknown, 0-21 for tracks
    pub track_number: f32,
    /// -1 = unknown, 0 = none, 1 = green, 2 = blue, 3 = yellow, 4 = red
    pub vehicle_fia_flags: f32,
    /// 2017 (modern) or 1980 (classic)
    pub era: f32,
    pub engine_temperature: f32,
    pub gforce_vert: f32,
    pub ang_vel: [f32; 3],

    pub tyres_temperature: WheelArray<u8>,
    pub tyres_wear: WheelArray<u8>,
    pub tyre_compound: u8,
    pub front_brake_bias: u8,
    pub fuel_mix: u8,
    pub current_lap_invalid: u8,
    pub tyres_damage: WheelArray<u8>,
    pub front_left_wing_damage: u8,
    pub front_right_wing_damage: u8,
    pub rear_wing_damage: u8,
    pub engine_damage: u8,
    pub gear_box_damage: u8,
    pub exhaust_damage: u8,
    pub pit_limiter_status: u8,
    /// Pit speed limit in m/s
    pub pit_speed_limit: u8,
    pub session_time_left: f32,
    pub rev_lights_percent: u8,
    pub is_spectating: u8,
    pub spectator_car_index: u8,

    /// Index of the tracked (player) car in `cars`
    pub player_car_index: u8,
    pub cars: CarTable,
}

impl TelemetryFrame {
    /// Snapshot of the tracked car, if the player index is within the valid cars.
    pub fn player_car(&self) -> Option<&CarSnapshot> {
        self.cars.get(usize::from(self.player_car_index))
    }

    /// Fraction of the lap completed by `car`, if the track length is known.
    pub fn lap_fraction(&self, car: &CarSnapshot) -> Option<f32> {
        (self.track_size > 0.0).then(|| car.lap_distance / self.track_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_accessors_follow_wire_order() {
        let wheels = WheelArray([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(wheels.rear_left(), 1.0);
        assert_eq!(wheels.rear_right(), 2.0);
        assert_eq!(wheels.front_left(), 3.0);
        assert_eq!(wheels.front_right(), 4.0);
    }

    #[test]
    fn player_car_respects_car_count() {
        let car = CarSnapshot { current_lap_num: 3, ..Default::default() };
        let mut frame = TelemetryFrame {
            player_car_index: 1,
            cars: CarTable::from_cars(&[car, car]),
            ..Default::default()
        };
        assert_eq!(frame.player_car().map(|c| c.current_lap_num), Some(3));

        frame.player_car_index = 2;
        assert!(frame.player_car().is_none());
    }

    #[test]
    fn lap_fraction_needs_track_size() {
        let car = CarSnapshot { lap_distance: 1500.0, ..Default::default() };
        let mut frame = TelemetryFrame::default();
        assert_eq!(frame.lap_fraction(&car), None);
        frame.track_size = 5000.0;
        assert_eq!(frame.lap_fraction(&car), Some(0.3));
    }
}
