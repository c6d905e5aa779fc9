//! Live connection to the game over UDP

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use futures::Stream;
use tracing::info;

use super::Subscriptions;
use crate::adapters::FrameAdapter;
use crate::capture::CaptureWriter;
use crate::config::ListenerConfig;
use crate::driver::{Driver, DriverOptions, DriverStats, FrameUpdate};
use crate::provider::Provider;
use crate::providers::{RecordingProvider, UdpProvider};
use crate::types::{PlayerLapHistory, UpdateRate};
use crate::Result;

/// Live UDP telemetry connection
pub struct UdpConnection {
    pub(super) subs: Subscriptions,
    local_addr: SocketAddr,
}

impl UdpConnection {
    /// Bind the listener socket and start ingesting.
    ///
    /// Returns as soon as the socket is bound; updates arrive once the game
    /// starts sending.
    pub async fn bind(config: &ListenerConfig) -> Result<Self> {
        let provider = UdpProvider::bind(config).await?;
        let local_addr = provider.local_addr();
        let source_hz = provider.tick_rate();
        let channels = Driver::spawn(provider, DriverOptions::from(config));

        info!(addr = %local_addr, source_hz, "UDP connection ready");
        Ok(Self { subs: Subscriptions::new(channels, source_hz), local_addr })
    }

    /// Like [`bind`](Self::bind), additionally recording every datagram to `capture`.
    pub async fn bind_recording(config: &ListenerConfig, capture: impl AsRef<Path>) -> Result<Self> {
        let provider = UdpProvider::bind(config).await?;
        let local_addr = provider.local_addr();
        let source_hz = provider.tick_rate();
        let writer = CaptureWriter::create(capture, source_hz.round().max(1.0) as u32)?;
        let channels =
            Driver::spawn(RecordingProvider::new(provider, writer), DriverOptions::from(config));

        info!(addr = %local_addr, source_hz, "UDP connection ready, recording");
        Ok(Self { subs: Subscriptions::new(channels, source_hz), local_addr })
    }

    /// Subscribe to updates, projected through `T` and rate limited by `rate`
    pub fn subscribe<T>(&self, rate: UpdateRate) -> impl Stream<Item = T> + Send + 'static
    where
        T: FrameAdapter + Send + 'static,
    {
        self.subs.subscribe(rate)
    }

    /// Lap history, yielding the current value then every change
    pub fn lap_updates(&self) -> impl Stream<Item = Arc<PlayerLapHistory>> + Send + 'static {
        self.subs.lap_updates()
    }

    pub fn current_laps(&self) -> Arc<PlayerLapHistory> {
        self.subs.current_laps()
    }

    /// Most recent update, `None` before the first packet
    pub fn latest(&self) -> Option<Arc<FrameUpdate>> {
        self.subs.latest()
    }

    pub fn stats(&self) -> DriverStats {
        self.subs.stats()
    }

    pub fn source_hz(&self) -> f64 {
        self.subs.source_hz()
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
