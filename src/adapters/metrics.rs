//! Exporter input: time-series points for one frame
//!
//! Each frame becomes one `telemetry` point for the player (tag
//! `driver=self`) followed by one `car` point per valid car (tag
//! `driver=<driver id>`). Wheel arrays are split into four fields suffixed
//! `-rl`, `-rr`, `-fl`, `-fr`. Timestamps, batching and transport belong to
//! the exporter.

use std::collections::BTreeMap;

use serde::Serialize;

use super::FrameAdapter;
use crate::driver::FrameUpdate;
use crate::types::{CarSnapshot, TelemetryFrame, WheelArray};

pub const TELEMETRY_MEASUREMENT: &str = "telemetry";
pub const CAR_MEASUREMENT: &str = "car";

const WHEEL_SUFFIXES: [&str; 4] = ["rl", "rr", "fl", "fr"];

/// A numeric field value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Float(f32),
    Int(u8),
}

impl FieldValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Float(v) => f64::from(v),
            FieldValue::Int(v) => f64::from(v),
        }
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(v)
    }
}

impl From<u8> for FieldValue {
    fn from(v: u8) -> Self {
        FieldValue::Int(v)
    }
}

/// One tagged measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    pub measurement: &'static str,
    pub tags: BTreeMap<&'static str, String>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl MetricPoint {
    fn new(measurement: &'static str, driver: String) -> Self {
        Self { measurement, tags: BTreeMap::from([("driver", driver)]), fields: BTreeMap::new() }
    }

    pub fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields.get(name).copied()
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    fn put(&mut self, name: &str, value: impl Into<FieldValue>) -> &mut Self {
        self.fields.insert(name.to_owned(), value.into());
        self
    }

    fn put_vec3(&mut self, names: [&str; 3], values: [f32; 3]) -> &mut Self {
        for (name, value) in names.into_iter().zip(values) {
            self.put(name, value);
        }
        self
    }

    fn put_wheels<T: Into<FieldValue> + Copy>(&mut self, base: &str, wheels: WheelArray<T>) -> &mut Self {
        for (suffix, value) in WHEEL_SUFFIXES.into_iter().zip(wheels.as_array()) {
            self.fields.insert(format!("{base}-{suffix}"), value.into());
        }
        self
    }
}

/// Points produced from one frame, player point first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricBatch {
    pub sequence: u64,
    pub points: Vec<MetricPoint>,
}

impl MetricBatch {
    pub fn from_frame(sequence: u64, frame: &TelemetryFrame) -> Self {
        let mut points = Vec::with_capacity(1 + frame.cars.len());
        points.push(telemetry_point(frame));
        points.extend(frame.cars.iter().map(car_point));
        Self { sequence, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The player's `telemetry` point.
    pub fn telemetry(&self) -> Option<&MetricPoint> {
        self.points.iter().find(|p| p.measurement == TELEMETRY_MEASUREMENT)
    }

    pub fn cars(&self) -> impl Iterator<Item = &MetricPoint> + '_ {
        self.points.iter().filter(|p| p.measurement == CAR_MEASUREMENT)
    }
}

impl FrameAdapter for MetricBatch {
    fn adapt(update: &FrameUpdate) -> Self {
        Self::from_frame(update.sequence, &update.frame)
    }
}

fn telemetry_point(f: &TelemetryFrame) -> MetricPoint {
    let mut p = MetricPoint::new(TELEMETRY_MEASUREMENT, "self".to_owned());
    p.put("time", f.time)
        .put("laptime", f.lap_time)
        .put("lapdistance", f.lap_distance)
        .put("totaldistance", f.total_distance)
        .put_vec3(["x", "y", "z"], f.position)
        .put("speed", f.speed)
        .put_vec3(["xv", "yv", "zv"], f.velocity)
        .put_vec3(["xr", "yr", "zr"], f.right_dir)
        .put_vec3(["xd", "yd", "zd"], f.forward_dir)
        .put_wheels("susp-pos", f.susp_pos)
        .put_wheels("susp-vel", f.susp_vel)
        .put_wheels("wheel-speed", f.wheel_speed)
        .put("throttle", f.throttle)
        .put("steer", f.steer)
        .put("brake", f.brake)
        .put("clutch", f.clutch)
        .put("gear", f.gear)
        .put("gforce-lat", f.gforce_lat)
        .put("gforce-lon", f.gforce_lon)
        .put("lap", f.lap)
        .put("enginerate", f.engine_rate)
        .put("sli-pro-native-support", f.sli_pro_native_support)
        .put("car-position", f.car_position)
        .put("kers-level", f.kers_level)
        .put("kers-max-level", f.kers_max_level)
        .put("drs", f.drs)
        .put("traction-control", f.traction_control)
        .put("anti-lock-brakes", f.anti_lock_brakes)
        .put("fuel-in-tank", f.fuel_in_tank)
        .put("fuel-capacity", f.fuel_capacity)
        .put("in-pits", f.in_pits)
        .put("sector", f.sector)
        .put("sector1-time", f.sector1_time)
        .put("sector2-time", f.sector2_time)
        .put_wheels("brakes-temp", f.brakes_temp)
        .put_wheels("tyres-pressure", f.tyres_pressure)
        .put("team-info", f.team_info)
        .put("total-laps", f.total_laps)
        .put("track-size", f.track_size)
        .put("last-lap-time", f.last_lap_time)
        .put("max-rpm", f.max_rpm)
        .put("idle-rpm", f.idle_rpm)
        .put("max-gears", f.max_gears)
        .put("session-type", f.session_type)
        .put("drsallowed", f.drs_allowed)
        .put("track-number", f.track_number)
        .put("vehiclefiaflags", f.vehicle_fia_flags)
        .put("era", f.era)
        .put("engine-temperature", f.engine_temperature)
        .put("gforce-vert", f.gforce_vert)
        .put_vec3(["ang-vel-x", "ang-vel-y", "ang-vel-z"], f.ang_vel)
        .put_wheels("tyres-temperature", f.tyres_temperature)
        .put_wheels("tyres-wear", f.tyres_wear)
        .put("tyre-compound", f.tyre_compound)
        .put("front-brake-bias", f.front_brake_bias)
        .put("fuel-mix", f.fuel_mix)
        .put("currentlapinvalid", f.current_lap_invalid)
        .put_wheels("tyres-damage", f.tyres_damage)
        .put("front-left-wing-damage", f.front_left_wing_damage)
        .put("front-right-wing-damage", f.front_right_wing_damage)
        .put("rear-wing-damage", f.rear_wing_damage)
        .put("engine-damage", f.engine_damage)
        .put("gear-box-damage", f.gear_box_damage)
        .put("exhaust-damage", f.exhaust_damage)
        .put("pit-limiter-status", f.pit_limiter_status)
        .put("pit-speed-limit", f.pit_speed_limit)
        .put("session-time-left", f.session_time_left)
        .put("rev-lights-percent", f.rev_lights_percent)
        .put("is-spectating", f.is_spectating)
        .put("spectator-car-index", f.spectator_car_index)
        .put("num-cars", f.cars.reported_count())
        .put("player-car-index", f.player_car_index);
    p
}

fn car_point(car: &CarSnapshot) -> MetricPoint {
    let mut p = MetricPoint::new(CAR_MEASUREMENT, car.driver_id.to_string());
    p.put("lastlap-time", car.last_lap_time)
        .put("currentlap-time", car.current_lap_time)
        .put("bestlap-time", car.best_lap_time)
        .put("sector1-time", car.sector1_time)
        .put("sector2-time", car.sector2_time)
        .put("lap-distance", car.lap_distance)
        .put("driver-id", car.driver_id)
        .put("team-id", car.team_id)
        .put("car-position", car.car_position)
        .put("current-lap-num", car.current_lap_num)
        .put("tyre-compound", car.tyre_compound)
        .put("in-pits", car.in_pits)
        .put("sector", car.sector)
        .put("currentlapinvalid", car.current_lap_invalid)
        .put("penalties", car.penalties);
    p
}
