//! Fixtures for unit tests, integration tests and benchmarks
//!
//! Builders produce frames without going through the wire format; pair them
//! with [`crate::packet::encode`] when raw bytes are needed.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::time::Duration;

use crate::packet;
use crate::provider::Provider;
use crate::types::{CarSnapshot, CarTable, MAX_CARS, TelemetryFrame};
use crate::{Result, TelemetryError};

/// Install a fmt subscriber honouring `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builder for one car record.
#[derive(Debug, Clone, Copy)]
pub struct CarBuilder {
    car: CarSnapshot,
}

impl Default for CarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CarBuilder {
    /// A car on lap 1, sector 1, unclassified.
    pub fn new() -> Self {
        Self { car: CarSnapshot { current_lap_num: 1, ..Default::default() } }
    }

    pub fn position(mut self, position: u8) -> Self {
        self.car.car_position = position;
        self
    }

    pub fn lap(mut self, lap: u8) -> Self {
        self.car.current_lap_num = lap;
        self
    }

    /// Raw sector byte (0, 1 or 2).
    pub fn sector(mut self, sector: u8) -> Self {
        self.car.sector = sector;
        self
    }

    /// Time elapsed in the current lap.
    pub fn elapsed(mut self, seconds: f32) -> Self {
        self.car.current_lap_time = seconds;
        self
    }

    pub fn splits(mut self, sector1: f32, sector2: f32) -> Self {
        self.car.sector1_time = sector1;
        self.car.sector2_time = sector2;
        self
    }

    pub fn last_lap(mut self, seconds: f32) -> Self {
        self.car.last_lap_time = seconds;
        self
    }

    pub fn best_lap(mut self, seconds: f32) -> Self {
        self.car.best_lap_time = seconds;
        self
    }

    pub fn driver(mut self, driver_id: u8, team_id: u8) -> Self {
        self.car.driver_id = driver_id;
        self.car.team_id = team_id;
        self
    }

    pub fn pits(mut self, status: u8) -> Self {
        self.car.in_pits = status;
        self
    }

    pub fn lap_distance(mut self, metres: f32) -> Self {
        self.car.lap_distance = metres;
        self
    }

    pub fn build(self) -> CarSnapshot {
        self.car
    }
}

/// Builder for a whole frame. Each added car bumps the reported car count.
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
    frame: TelemetryFrame,
    cars: Vec<CarSnapshot>,
    num_cars: Option<u8>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speed(mut self, metres_per_second: f32) -> Self {
        self.frame.speed = metres_per_second;
        self
    }

    pub fn pedals(mut self, throttle: f32, brake: f32) -> Self {
        self.frame.throttle = throttle;
        self.frame.brake = brake;
        self
    }

    pub fn track_size(mut self, metres: f32) -> Self {
        self.frame.track_size = metres;
        self
    }

    pub fn session_type(mut self, session_type: u8) -> Self {
        self.frame.session_type = f32::from(session_type);
        self
    }

    pub fn time(mut self, seconds: f32) -> Self {
        self.frame.time = seconds;
        self
    }

    pub fn car(mut self, car: CarBuilder) -> Self {
        if self.cars.len() < MAX_CARS {
            self.cars.push(car.build());
        }
        self
    }

    /// Override the reported car count, e.g. to hide cars that were added.
    pub fn num_cars(mut self, count: u8) -> Self {
        self.num_cars = Some(count);
        self
    }

    pub fn player(mut self, index: u8) -> Self {
        self.frame.player_car_index = index;
        self
    }

    pub fn build(self) -> TelemetryFrame {
        let mut buffer = [CarSnapshot::default(); MAX_CARS];
        buffer[..self.cars.len()].copy_from_slice(&self.cars);
        let count = self.num_cars.unwrap_or(self.cars.len() as u8);
        TelemetryFrame { cars: CarTable::new(buffer, count), ..self.frame }
    }
}

/// Frames of a player driving `laps` laps with constant sector times.
///
/// Each lap produces two frames in sector 1, one in sector 2 and one in
/// sector 3. From lap 2 on, the sector 1 frames report the previous lap as
/// `last_lap_time` with its sector 1/2 times. The final lap is left in
/// progress, so a history built from these frames has `laps` rows of which
/// `laps - 1` are finalized.
pub fn lap_frames(laps: usize, sectors: [f32; 3]) -> Vec<TelemetryFrame> {
    let [s1, s2, s3] = sectors;
    let lap_time = s1 + s2 + s3;
    let mut frames = Vec::with_capacity(laps * 4);

    for lap in 1..=laps.min(usize::from(u8::MAX)) {
        let lap_num = lap as u8;
        let (carried, last) = if lap >= 2 { ((s1, s2), lap_time) } else { ((0.0, 0.0), 0.0) };
        let base = CarBuilder::new().lap(lap_num).last_lap(last).position(1);
        let time = (lap - 1) as f32 * lap_time;

        for elapsed in [0.5, s1 * 0.5] {
            frames.push(player_frame(
                base.sector(0).elapsed(elapsed).splits(carried.0, carried.1),
                time + elapsed,
            ));
        }
        let elapsed = s1 + s2 * 0.5;
        frames.push(player_frame(base.sector(1).elapsed(elapsed).splits(s1, 0.0), time + elapsed));
        let elapsed = s1 + s2 + s3 * 0.5;
        frames.push(player_frame(base.sector(2).elapsed(elapsed).splits(s1, s2), time + elapsed));
    }
    frames
}

fn player_frame(car: CarBuilder, time: f32) -> TelemetryFrame {
    FrameBuilder::new().time(time).car(car).player(0).build()
}

/// In-memory provider replaying queued packets and errors.
///
/// Once the queue is empty it either reports end of stream or, with
/// [`VecProvider::hold_open`], stays pending like an idle socket.
#[derive(Debug)]
pub struct VecProvider {
    queue: VecDeque<Result<Vec<u8>>>,
    tick_rate: f64,
    interval: Option<Duration>,
    hold_open: bool,
}

impl VecProvider {
    pub fn new(packets: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            queue: packets.into_iter().map(Ok).collect(),
            tick_rate: 60.0,
            interval: None,
            hold_open: false,
        }
    }

    /// Provider yielding the wire encoding of each frame.
    pub fn from_frames<'a>(frames: impl IntoIterator<Item = &'a TelemetryFrame>) -> Self {
        Self::new(frames.into_iter().map(packet::encode))
    }

    pub fn push_error(mut self, error: TelemetryError) -> Self {
        self.queue.push_back(Err(error));
        self
    }

    pub fn push_packet(mut self, bytes: Vec<u8>) -> Self {
        self.queue.push_back(Ok(bytes));
        self
    }

    pub fn with_tick_rate(mut self, hz: f64) -> Self {
        self.tick_rate = hz;
        self
    }

    /// Sleep this long before every packet.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }
}

#[async_trait::async_trait]
impl Provider for VecProvider {
    async fn next_packet(&mut self) -> Result<Option<Vec<u8>>> {
        if let Some(interval) = self.interval {
            tokio::time::sleep(interval).await;
        }
        match self.queue.pop_front() {
            Some(item) => item.map(Some),
            None if self.hold_open => std::future::pending().await,
            None => Ok(None),
        }
    }

    fn tick_rate(&self) -> f64 {
        self.tick_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_counts_cars() {
        let frame = FrameBuilder::new().car(CarBuilder::new()).car(CarBuilder::new()).build();
        assert_eq!(frame.cars.len(), 2);

        let hidden = FrameBuilder::new().car(CarBuilder::new()).num_cars(0).build();
        assert!(hidden.cars.is_empty());
    }

    #[test]
    fn lap_frames_cover_every_sector() {
        let frames = lap_frames(3, [25.0, 30.0, 35.0]);
        assert_eq!(frames.len(), 12);

        let last = frames.last().and_then(|f| f.player_car().copied()).unwrap();
        assert_eq!(last.current_lap_num, 3);
        assert_eq!(last.sector, 2);
        assert_eq!(last.last_lap_time, 90.0);
    }

    #[tokio::test]
    async fn vec_provider_drains_then_ends() {
        let mut provider = VecProvider::new([vec![1u8], vec![2u8]])
            .push_error(TelemetryError::Timeout { duration: Duration::from_millis(5) });

        assert_eq!(provider.next_packet().await.unwrap(), Some(vec![1]));
        assert_eq!(provider.next_packet().await.unwrap(), Some(vec![2]));
        assert!(provider.next_packet().await.is_err());
        assert_eq!(provider.next_packet().await.unwrap(), None);
    }
}
