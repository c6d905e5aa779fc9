//! UDP provider for live game telemetry

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::{debug, info, trace};

use crate::config::ListenerConfig;
use crate::packet::PACKET_SIZE;
use crate::provider::Provider;
use crate::{Result, TelemetryError};

/// Receives one packet per datagram from the game.
pub struct UdpProvider {
    socket: UdpSocket,
    buf: Vec<u8>,
    tick_rate: f64,
    local_addr: SocketAddr,
    first_sender: Option<SocketAddr>,
}

impl UdpProvider {
    /// Validate `config` and bind its address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self> {
        config.validate()?;

        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|e| TelemetryError::bind_failed(config.bind_addr, e))?;
        let local_addr =
            socket.local_addr().map_err(|e| TelemetryError::bind_failed(config.bind_addr, e))?;

        info!(addr = %local_addr, "Listening for telemetry");

        Ok(Self {
            socket,
            // One spare byte so an oversized datagram is never truncated to
            // exactly one packet.
            buf: vec![0; config.recv_buffer_size.max(PACKET_SIZE + 1)],
            tick_rate: config.tick_rate_hz,
            local_addr,
            first_sender: None,
        })
    }

    /// Address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait::async_trait]
impl Provider for UdpProvider {
    async fn next_packet(&mut self) -> Result<Option<Vec<u8>>> {
        let (len, from) = self.socket.recv_from(&mut self.buf).await?;

        match self.first_sender {
            None => {
                info!(%from, bytes = len, "First telemetry datagram received");
                self.first_sender = Some(from);
            }
            Some(first) if first != from => {
                debug!(%from, %first, "Datagram from a different sender");
            }
            Some(_) => trace!(bytes = len, "Datagram received"),
        }

        Ok(Some(self.buf[..len].to_vec()))
    }

    fn tick_rate(&self) -> f64 {
        self.tick_rate
    }
}
