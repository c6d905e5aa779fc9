//! Decoding and encoding of raw telemetry packets.
//!
//! A packet is a fixed-size, densely packed little-endian record (see
//! [`layout`]). Decoding is all-or-nothing: a buffer shorter than
//! [`PACKET_SIZE`] is rejected before any field is read, so a partially
//! populated frame is never produced.
//!
//! ```rust
//! use trackside::packet::{self, PACKET_SIZE};
//! use trackside::TelemetryError;
//!
//! let frame = packet::decode(&[0u8; PACKET_SIZE]).unwrap();
//! assert_eq!(frame.cars.len(), 0);
//!
//! let short = packet::decode(&[0u8; 100]);
//! assert!(matches!(short, Err(TelemetryError::Decode { actual: 100, .. })));
//! ```

mod cursor;
pub mod layout;

pub use layout::{GAME_DATAGRAM_SIZE, PACKET_SIZE};

use cursor::{PacketReader, PacketWriter};
use tracing::trace;

use crate::types::{CarSnapshot, CarTable, MAX_CARS, TelemetryFrame};
use crate::{Result, TelemetryError};

/// Decode a packet, ignoring any bytes past [`PACKET_SIZE`].
///
/// The game's own datagrams carry a motion extension after the car array;
/// it is skipped.
pub fn decode(data: &[u8]) -> Result<TelemetryFrame> {
    if data.len() < PACKET_SIZE {
        return Err(TelemetryError::decode(PACKET_SIZE, data.len()));
    }

    let mut r = PacketReader::new(data, PACKET_SIZE);

    let time = r.f32()?;
    let lap_time = r.f32()?;
    let lap_distance = r.f32()?;
    let total_distance = r.f32()?;
    let position = r.vec3()?;
    let speed = r.f32()?;
    let velocity = r.vec3()?;
    let right_dir = r.vec3()?;
    let forward_dir = r.vec3()?;

    let susp_pos = r.wheels_f32()?;
    let susp_vel = r.wheels_f32()?;
    let wheel_speed = r.wheels_f32()?;

    let throttle = r.f32()?;
    let steer = r.f32()?;
    let brake = r.f32()?;
    let clutch = r.f32()?;
    let gear = r.f32()?;
    let gforce_lat = r.f32()?;
    let gforce_lon = r.f32()?;
    let lap = r.f32()?;
    let engine_rate = r.f32()?;
    let sli_pro_native_support = r.f32()?;
    let car_position = r.f32()?;
    let kers_level = r.f32()?;
    let kers_max_level = r.f32()?;
    let drs = r.f32()?;
    let traction_control = r.f32()?;
    let anti_lock_brakes = r.f32()?;
    let fuel_in_tank = r.f32()?;
    let fuel_capacity = r.f32()?;
    let in_pits = r.f32()?;
    let sector = r.f32()?;
    let sector1_time = r.f32()?;
    let sector2_time = r.f32()?;

    let brakes_temp = r.wheels_f32()?;
    let tyres_pressure = r.wheels_f32()?;

    let team_info = r.f32()?;
    let total_laps = r.f32()?;
    let track_size = r.f32()?;
    let last_lap_time = r.f32()?;
    let max_rpm = r.f32()?;
    let idle_rpm = r.f32()?;
    let max_gears = r.f32()?;
    let session_type = r.f32()?;
    let drs_allowed = r.f32()?;
    let track_number = r.f32()?;
    let vehicle_fia_flags = r.f32()?;
    let era = r.f32()?;
    let engine_temperature = r.f32()?;
    let gforce_vert = r.f32()?;
    let ang_vel = r.vec3()?;

    let tyres_temperature = r.wheels_u8()?;
    let tyres_wear = r.wheels_u8()?;
    let tyre_compound = r.u8()?;
    let front_brake_bias = r.u8()?;
    let fuel_mix = r.u8()?;
    let current_lap_invalid = r.u8()?;
    let tyres_damage = r.wheels_u8()?;
    let front_left_wing_damage = r.u8()?;
    let front_right_wing_damage = r.u8()?;
    let rear_wing_damage = r.u8()?;
    let engine_damage = r.u8()?;
    let gear_box_damage = r.u8()?;
    let exhaust_damage = r.u8()?;
    let pit_limiter_status = r.u8()?;
    let pit_speed_limit = r.u8()?;
    let session_time_left = r.f32()?;
    let rev_lights_percent = r.u8()?;
    let is_spectating = r.u8()?;
    let spectator_car_index = r.u8()?;

    let num_cars = r.u8()?;
    let player_car_index = r.u8()?;

    let mut cars = [CarSnapshot::default(); MAX_CARS];
    for car in cars.iter_mut() {
        *car = read_car(&mut r)?;
    }
    debug_assert_eq!(r.offset(), PACKET_SIZE);

    trace!(bytes = data.len(), num_cars, player_car_index, "Decoded packet");

    Ok(TelemetryFrame {
        time,
        lap_time,
        lap_distance,
        total_distance,
        position,
        speed,
        velocity,
        right_dir,
        forward_dir,
        susp_pos,
        susp_vel,
        wheel_speed,
        throttle,
        steer,
        brake,
        clutch,
        gear,
        gforce_lat,
        gforce_lon,
        lap,
        engine_rate,
        sli_pro_native_support,
        car_position,
        kers_level,
        kers_max_level,
        drs,
        traction_control,
        anti_lock_brakes,
        fuel_in_tank,
        fuel_capacity,
        in_pits,
        sector,
        sector1_time,
        sector2_time,
        brakes_temp,
        tyres_pressure,
        team_info,
        total_laps,
        track_size,
        last_lap_time,
        max_rpm,
        idle_rpm,
        max_gears,
        session_type,
        drs_allowed,
        track_number,
        vehicle_fia_flags,
        era,
        engine_temperature,
        gforce_vert,
        ang_vel,
        tyres_temperature,
        tyres_wear,
        tyre_compound,
        front_brake_bias,
        fuel_mix,
        current_lap_invalid,
        tyres_damage,
        front_left_wing_damage,
        front_right_wing_damage,
        rear_wing_damage,
        engine_damage,
        gear_box_damage,
        exhaust_damage,
        pit_limiter_status,
        pit_speed_limit,
        session_time_left,
        rev_lights_percent,
        is_spectating,
        spectator_car_index,
        player_car_index,
        cars: CarTable::new(cars, num_cars),
    })
}

/// Decode a packet that must be exactly [`PACKET_SIZE`] bytes long.
pub fn decode_strict(data: &[u8]) -> Result<TelemetryFrame> {
    if data.len() != PACKET_SIZE {
        return Err(TelemetryError::decode(PACKET_SIZE, data.len()));
    }
    decode(data)
}

fn read_car(r: &mut PacketReader<'_>) -> Result<CarSnapshot> {
    Ok(CarSnapshot {
        world_position: r.vec3()?,
        last_lap_time: r.f32()?,
        current_lap_time: r.f32()?,
        best_lap_time: r.f32()?,
        sector1_time: r.f32()?,
        sector2_time: r.f32()?,
        lap_distance: r.f32()?,
        driver_id: r.u8()?,
        team_id: r.u8()?,
        car_position: r.u8()?,
        current_lap_num: r.u8()?,
        tyre_compound: r.u8()?,
        in_pits: r.u8()?,
        sector: r.u8()?,
        current_lap_invalid: r.u8()?,
        penalties: r.u8()?,
    })
}

/// Encode a frame into exactly [`PACKET_SIZE`] bytes of wire layout.
///
/// Every car record in the table's buffer is written, including those past
/// the valid prefix, so `decode(&encode(f))` reproduces `f`.
pub fn encode(frame: &TelemetryFrame) -> Vec<u8> {
    let mut w = PacketWriter::with_capacity(PACKET_SIZE);

    w.f32(frame.time);
    w.f32(frame.lap_time);
    w.f32(frame.lap_distance);
    w.f32(frame.total_distance);
    w.vec3(frame.position);
    w.f32(frame.speed);
    w.vec3(frame.velocity);
    w.vec3(frame.right_dir);
    w.vec3(frame.forward_dir);

    w.wheels_f32(frame.susp_pos);
    w.wheels_f32(frame.susp_vel);
    w.wheels_f32(frame.wheel_speed);

    for value in [
        frame.throttle,
        frame.steer,
        frame.brake,
        frame.clutch,
        frame.gear,
        frame.gforce_lat,
        frame.gforce_lon,
        frame.lap,
        frame.engine_rate,
        frame.sli_pro_native_support,
        frame.car_position,
        frame.kers_level,
        frame.kers_max_level,
        frame.drs,
        frame.traction_control,
        frame.anti_lock_brakes,
        frame.fuel_in_tank,
        frame.fuel_capacity,
        frame.in_pits,
        frame.sector,
        frame.sector1_time,
        frame.sector2_time,
    ] {
        w.f32(value);
    }

    w.wheels_f32(frame.brakes_temp);
    w.wheels_f32(frame.tyres_pressure);

    for value in [
        frame.team_info,
        frame.total_laps,
        frame.track_size,
        frame.last_lap_time,
        frame.max_rpm,
        frame.idle_rpm,
        frame.max_gears,
        frame.session_type,
        frame.drs_allowed,
        frame.track_number,
        frame.vehicle_fia_flags,
        frame.era,
        frame.engine_temperature,
        frame.gforce_vert,
    ] {
        w.f32(value);
    }
    w.vec3(frame.ang_vel);

    w.wheels_u8(frame.tyres_temperature);
    w.wheels_u8(frame.tyres_wear);
    w.u8(frame.tyre_compound);
    w.u8(frame.front_brake_bias);
    w.u8(frame.fuel_mix);
    w.u8(frame.current_lap_invalid);
    w.wheels_u8(frame.tyres_damage);
    for value in [
        frame.front_left_wing_damage,
        frame.front_right_wing_damage,
        frame.rear_wing_damage,
        frame.engine_damage,
        frame.gear_box_damage,
        frame.exhaust_damage,
        frame.pit_limiter_status,
        frame.pit_speed_limit,
    ] {
        w.u8(value);
    }
    w.f32(frame.session_time_left);
    w.u8(frame.rev_lights_percent);
    w.u8(frame.is_spectating);
    w.u8(frame.spectator_car_index);
    w.u8(frame.cars.reported_count());
    w.u8(frame.player_car_index);

    for car in frame.cars.raw() {
        w.vec3(car.world_position);
        w.f32(car.last_lap_time);
        w.f32(car.current_lap_time);
        w.f32(car.best_lap_time);
        w.f32(car.sector1_time);
        w.f32(car.sector2_time);
        w.f32(car.lap_distance);
        w.u8(car.driver_id);
        w.u8(car.team_id);
        w.u8(car.car_position);
        w.u8(car.current_lap_num);
        w.u8(car.tyre_compound);
        w.u8(car.in_pits);
        w.u8(car.sector);
        w.u8(car.current_lap_invalid);
        w.u8(car.penalties);
    }

    debug_assert_eq!(w.len(), PACKET_SIZE);
    w.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::layout::*;
    use super::*;
    use crate::test_utils::{CarBuilder, FrameBuilder};
    use proptest::prelude::*;

    fn sample_frame() -> TelemetryFrame {
        FrameBuilder::new()
            .speed(83.5)
            .pedals(0.75, 0.1)
            .track_size(5891.0)
            .session_type(3)
            .car(CarBuilder::new().position(2).lap(4).sector(1).elapsed(42.1).splits(30.1, 0.0).driver(9, 4))
            .car(CarBuilder::new().position(1).lap(5).sector(0).elapsed(1.5).splits(29.8, 31.0).driver(22, 0))
            .player(0)
            .build()
    }

    #[test]
    fn encode_produces_fixed_size() {
        assert_eq!(encode(&sample_frame()).len(), PACKET_SIZE);
        assert_eq!(encode(&TelemetryFrame::default()).len(), PACKET_SIZE);
    }

    #[test]
    fn decode_reads_fields_at_documented_offsets() {
        let bytes = encode(&sample_frame());

        let speed = f32::from_le_bytes(bytes[OFF_SPEED..OFF_SPEED + 4].try_into().unwrap());
        assert_eq!(speed, 83.5);
        let throttle =
            f32::from_le_bytes(bytes[OFF_THROTTLE..OFF_THROTTLE + 4].try_into().unwrap());
        assert_eq!(throttle, 0.75);
        assert_eq!(bytes[OFF_NUM_CARS], 2);
        assert_eq!(bytes[OFF_PLAYER_CAR_INDEX], 0);
        assert_eq!(bytes[car_offset(1) + CAR_OFF_CURRENT_LAP_NUM], 5);
        assert_eq!(bytes[car_offset(0) + CAR_OFF_SECTOR], 1);
    }

    #[test]
    fn decode_round_trips_encoded_frame() {
        let frame = sample_frame();
        let decoded = decode(&encode(&frame)).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.cars.len(), 2);
        assert_eq!(decoded.player_car().map(|c| c.current_lap_num), Some(4));
    }

    #[test]
    fn game_datagram_with_motion_extension_is_accepted() {
        let mut bytes = encode(&sample_frame());
        bytes.extend_from_slice(&[0xAB; MOTION_EXTENSION_SIZE]);
        assert_eq!(bytes.len(), GAME_DATAGRAM_SIZE);

        assert_eq!(decode(&bytes).unwrap(), sample_frame());
        assert!(matches!(
            decode_strict(&bytes),
            Err(TelemetryError::Decode { expected: PACKET_SIZE, actual: GAME_DATAGRAM_SIZE })
        ));
    }

    #[test]
    fn out_of_range_enum_bytes_pass_through() {
        let mut bytes = encode(&sample_frame());
        bytes[car_offset(0) + CAR_OFF_SECTOR] = 9;
        bytes[OFF_NUM_CARS] = 250;

        let frame = decode(&bytes).unwrap();
        assert_eq!(frame.cars.reported_count(), 250);
        assert_eq!(frame.cars.len(), MAX_CARS);
        assert_eq!(frame.cars.get(0).map(|c| c.sector), Some(9));
    }

    #[test]
    fn empty_buffer_is_rejected() {
        assert!(matches!(decode(&[]), Err(TelemetryError::Decode { actual: 0, .. })));
    }

    proptest! {
        #[test]
        fn short_buffers_always_fail(len in 0usize..PACKET_SIZE, fill in any::<u8>()) {
            let bytes = vec![fill; len];
            match decode(&bytes) {
                Err(TelemetryError::Decode { expected, actual }) => {
                    prop_assert_eq!(expected, PACKET_SIZE);
                    prop_assert_eq!(actual, len);
                }
                other => prop_assert!(false, "expected decode error, got {:?}", other.map(|_| ())),
            }
        }

        #[test]
        fn any_full_buffer_reencodes_bit_for_bit(bytes in prop::collection::vec(any::<u8>(), PACKET_SIZE)) {
            // Float fields may hold NaN payloads; compare bytes, not frames.
            let frame = decode(&bytes).unwrap();
            prop_assert_eq!(encode(&frame), bytes);
        }
    }
}
