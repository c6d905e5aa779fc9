//! Public API scenarios for decoding, lap aggregation and ranking.

use trackside::packet::{self, GAME_DATAGRAM_SIZE, PACKET_SIZE};
use trackside::{
    CarSnapshot, CarTable, LapAggregator, TelemetryError, TelemetryFrame, rank_by_position,
};

fn player(lap: u8, sector: u8, elapsed: f32, s1: f32, s2: f32, last: f32) -> TelemetryFrame {
    let car = CarSnapshot {
        current_lap_num: lap,
        sector,
        current_lap_time: elapsed,
        sector1_time: s1,
        sector2_time: s2,
        last_lap_time: last,
        car_position: 1,
        ..Default::default()
    };
    TelemetryFrame { player_car_index: 0, cars: CarTable::from_cars(&[car]), ..Default::default() }
}

/// Frames travel through the wire format the way the game sends them.
fn over_the_wire(frame: &TelemetryFrame) -> TelemetryFrame {
    let mut datagram = packet::encode(frame);
    datagram.resize(GAME_DATAGRAM_SIZE, 0);
    packet::decode(&datagram).unwrap()
}

#[test]
fn first_lap_splits_are_recovered_at_the_line() {
    let frames = [
        player(1, 0, 5.0, 0.0, 0.0, 0.0),
        player(1, 1, 28.0, 28.0, 0.0, 0.0),
        player(1, 2, 58.0, 28.0, 30.0, 0.0),
        player(2, 0, 0.5, 28.0, 30.0, 90.0),
    ];

    let mut aggregator = LapAggregator::new();
    for frame in &frames {
        aggregator.ingest(&over_the_wire(frame));
    }

    let history = aggregator.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.laps()[0].as_array(), [28.0, 30.0, 32.0, 90.0]);
    assert_eq!(history.laps()[1].sector1(), 0.5);
    assert_eq!(history.laps()[1].total(), 0.5);
}

#[test]
fn finished_lap_is_not_touched_by_later_frames() {
    let mut aggregator = LapAggregator::new();
    aggregator.ingest(&player(1, 2, 58.0, 28.0, 30.0, 0.0));
    aggregator.ingest(&player(2, 0, 0.5, 28.0, 30.0, 90.0));
    let finished = aggregator.history().laps()[0];

    for elapsed in [10.0, 20.0, 27.0] {
        aggregator.ingest(&player(2, 0, elapsed, 28.0, 30.0, 90.0));
    }
    aggregator.ingest(&player(2, 1, 33.0, 29.0, 0.0, 90.0));
    aggregator.ingest(&player(2, 2, 61.0, 29.0, 31.0, 90.0));

    assert_eq!(aggregator.history().laps()[0], finished);
    assert_eq!(aggregator.history().laps()[1].as_array(), [29.0, 31.0, 1.0, 61.0]);
}

#[test]
fn repeated_frames_are_idempotent() {
    let frame = player(3, 1, 40.0, 27.5, 0.0, 88.0);
    let mut once = LapAggregator::new();
    once.ingest(&frame);

    let mut many = LapAggregator::new();
    for _ in 0..5 {
        many.ingest(&frame);
    }
    assert_eq!(once.history(), many.history());
    assert_eq!(many.history().len(), 3);
}

#[test]
fn short_buffers_are_decode_errors() {
    for len in [0, 1, 336, PACKET_SIZE - 1] {
        let result = packet::decode(&vec![0; len]);
        assert!(
            matches!(result, Err(TelemetryError::Decode { expected: PACKET_SIZE, actual }) if actual == len),
            "length {len}"
        );
    }
}

#[test]
fn ranking_leaves_gaps_for_missing_positions() {
    let car = |position: u8, driver_id: u8| CarSnapshot { car_position: position, driver_id, ..Default::default() };
    let cars = CarTable::from_cars(&[car(3, 30), car(1, 10), car(0, 99)]);

    let standings = rank_by_position(&cars);
    assert_eq!(standings.len(), 2);
    assert_eq!(standings.slot(0).map(|c| c.driver_id), Some(10));
    assert!(standings.slot(1).is_none());
    assert_eq!(standings.slot(2).map(|c| c.driver_id), Some(30));
}
