//! Tests for the connection layer
//!
//! These verify that updates, lap history and stats propagate through both
//! connection kinds.

use super::*;
use crate::adapters::{DashboardView, MetricBatch};
use crate::capture::CaptureWriter;
use crate::config::{ListenerConfig, ReplayConfig};
use crate::packet;
use crate::test_utils::{init_tracing, lap_frames};
use crate::types::TelemetryFrame;
use crate::TelemetryError;
use futures::StreamExt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;

fn write_capture(dir: &tempfile::TempDir, frames: &[TelemetryFrame]) -> PathBuf {
    let path = dir.path().join("session.cap");
    let mut writer = CaptureWriter::create(&path, 60).unwrap();
    for frame in frames {
        writer.write_packet(&packet::encode(frame)).unwrap();
    }
    writer.finish().unwrap();
    path
}

fn loopback() -> ListenerConfig {
    ListenerConfig::on(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)))
}

#[tokio::test]
async fn replay_builds_full_lap_history() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let frames = lap_frames(4, [28.0, 30.0, 32.0]);
    let path = write_capture(&dir, &frames);

    let connection = ReplayConnection::open(&path, &ReplayConfig::unpaced()).await.unwrap();
    connection.finished().await;

    let laps = connection.current_laps();
    assert_eq!(laps.len(), 4);
    assert_eq!(laps.completed().len(), 3);
    for lap in laps.completed() {
        assert_eq!(lap.as_array(), [28.0, 30.0, 32.0, 90.0]);
    }
    assert_eq!(connection.stats().decoded, frames.len() as u64);
    assert!(connection.latest().is_none());
    assert_eq!(connection.source_hz(), 60.0);
}

#[tokio::test]
async fn replay_subscription_delivers_adapted_updates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_capture(&dir, &lap_frames(2, [20.0, 20.0, 20.0]));

    // Paced at 60 Hz: 8 frames over roughly 130 ms.
    let config = ReplayConfig::default();
    let connection = ReplayConnection::open(&path, &config).await.unwrap();
    let views: Vec<DashboardView> = connection.subscribe(UpdateRate::Native).collect().await;

    assert!(!views.is_empty());
    assert!(views.windows(2).all(|w| w[0].sequence < w[1].sequence));
    let last = views.last().unwrap();
    assert_eq!(last.laps.len(), 2);
    assert_eq!(last.tower[0].map(|row| row.car.current_lap_num), Some(2));
}

#[tokio::test]
async fn replay_throttled_subscription_thins_updates() {
    let dir = tempfile::tempdir().unwrap();
    let frames = lap_frames(5, [10.0, 10.0, 10.0]);
    let path = write_capture(&dir, &frames);

    let config = ReplayConfig { speed: 4.0, pacing: true };
    let connection = ReplayConnection::open(&path, &config).await.unwrap();
    let batches: Vec<MetricBatch> = connection.subscribe(UpdateRate::Max(20)).collect().await;

    assert!(!batches.is_empty());
    assert!(batches.len() < frames.len());
    assert!(batches.windows(2).all(|w| w[0].sequence < w[1].sequence));
    assert!(batches.iter().all(|b| b.sequence <= frames.len() as u64));
}

#[tokio::test]
async fn lap_updates_stream_starts_with_current_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_capture(&dir, &lap_frames(3, [15.0, 15.0, 15.0]));

    let connection = ReplayConnection::open(&path, &ReplayConfig::unpaced()).await.unwrap();
    connection.finished().await;

    let mut laps = Box::pin(connection.lap_updates());
    let first = laps.next().await.unwrap();
    assert_eq!(first.len(), 3);
}

#[tokio::test]
async fn empty_capture_opens_and_ends() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_capture(&dir, &[]);

    let connection = ReplayConnection::open(&path, &ReplayConfig::unpaced()).await.unwrap();
    let frames: Vec<Arc<TelemetryFrame>> = connection.subscribe(UpdateRate::Native).collect().await;
    assert!(frames.is_empty());
    assert!(connection.current_laps().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_capture_with_leading_junk_still_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slow.cap");
    let frame = &lap_frames(1, [20.0, 20.0, 20.0])[1];

    // One record per second: the first frame decodes ten seconds in.
    let mut writer = CaptureWriter::create(&path, 1).unwrap();
    for _ in 0..10 {
        writer.write_packet(&[0u8; 16]).unwrap();
    }
    writer.write_packet(&packet::encode(frame)).unwrap();
    writer.finish().unwrap();

    let connection = ReplayConnection::open(&path, &ReplayConfig::default()).await.unwrap();
    let stats = connection.stats();
    assert_eq!(stats.dropped, 10);
    assert_eq!(stats.decoded, 1);
}

#[tokio::test]
async fn missing_capture_fails_to_open() {
    let result = ReplayConnection::open("/nonexistent/session.cap", &ReplayConfig::default()).await;
    assert!(matches!(result, Err(TelemetryError::File { .. })));
}

#[tokio::test]
async fn udp_connection_tracks_player_laps() {
    init_tracing();
    let connection = UdpConnection::bind(&loopback()).await.unwrap();
    let sender = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let frames = lap_frames(2, [25.0, 25.0, 25.0]);

    let mut updates = Box::pin(connection.subscribe::<Arc<TelemetryFrame>>(UpdateRate::Native));
    for frame in &frames {
        let mut datagram = packet::encode(frame);
        datagram.extend_from_slice(&[0; packet::layout::MOTION_EXTENSION_SIZE]);
        sender.send_to(&datagram, connection.local_addr()).await.unwrap();
        // Wait for each frame so the watch channel does not coalesce them.
        let received = tokio::time::timeout(Duration::from_secs(2), updates.next()).await;
        assert_eq!(received.ok().flatten().as_deref(), Some(frame));
    }

    let laps = connection.current_laps();
    assert_eq!(laps.len(), 2);
    assert_eq!(laps.laps()[0].as_array(), [25.0, 25.0, 25.0, 75.0]);
    assert_eq!(connection.stats().dropped, 0);
}

#[tokio::test]
async fn udp_connection_drops_short_datagrams() {
    let connection = UdpConnection::bind(&loopback()).await.unwrap();
    let sender = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();

    sender.send_to(&[0u8; 64], connection.local_addr()).await.unwrap();

    let mut stats = connection.subs.stats.clone();
    let stats = tokio::time::timeout(Duration::from_secs(2), stats.wait_for(|s| s.packets == 1))
        .await
        .unwrap()
        .map(|s| *s)
        .unwrap();
    assert_eq!(stats.dropped, 1);
    assert!(connection.latest().is_none());
}

#[tokio::test]
async fn strict_listener_drops_game_sized_datagrams() {
    let config = ListenerConfig {
        recv_buffer_size: packet::PACKET_SIZE,
        strict_length: true,
        ..loopback()
    };
    let connection = UdpConnection::bind(&config).await.unwrap();
    let sender = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let frame = &lap_frames(1, [20.0, 20.0, 20.0])[0];

    let mut datagram = packet::encode(frame);
    datagram.resize(packet::GAME_DATAGRAM_SIZE, 0);
    sender.send_to(&datagram, connection.local_addr()).await.unwrap();
    sender.send_to(&packet::encode(frame), connection.local_addr()).await.unwrap();

    let mut stats = connection.subs.stats.clone();
    let stats = tokio::time::timeout(Duration::from_secs(2), stats.wait_for(|s| s.packets == 2))
        .await
        .unwrap()
        .map(|s| *s)
        .unwrap();
    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.decoded, 1);
}

#[tokio::test]
async fn dropping_connection_cancels_driver() {
    let connection = UdpConnection::bind(&loopback()).await.unwrap();
    let mut updates = connection.subs.updates();
    drop(connection);

    let ended = tokio::time::timeout(Duration::from_secs(2), async {
        while updates.changed().await.is_ok() {}
    })
    .await;
    assert!(ended.is_ok());
}

#[tokio::test]
async fn recording_connection_writes_a_replayable_capture() {
    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("live.cap");
    let frames = lap_frames(2, [20.0, 21.0, 22.0]);

    {
        let connection = UdpConnection::bind_recording(&loopback(), &capture).await.unwrap();
        let sender = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut stats = connection.subs.stats.clone();
        for frame in &frames {
            sender.send_to(&packet::encode(frame), connection.local_addr()).await.unwrap();
        }
        tokio::time::timeout(
            Duration::from_secs(2),
            stats.wait_for(|s| s.packets == frames.len() as u64),
        )
        .await
        .unwrap()
        .unwrap();
    }

    // The driver task drops the recorder once it observes cancellation.
    let mut replayed = None;
    for _ in 0..50 {
        let connection = ReplayConnection::open(&capture, &ReplayConfig::unpaced()).await;
        if let Ok(connection) = connection {
            connection.finished().await;
            if connection.stats().decoded == frames.len() as u64 {
                replayed = Some(connection.current_laps());
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let laps = replayed.expect("capture should replay every recorded frame");
    assert_eq!(laps.len(), 2);
    assert_eq!(laps.laps()[0].total(), 63.0);
}
