//! Provider trait for packet sources

use crate::Result;

/// Source of raw telemetry packets.
///
/// Providers hand over bytes exactly as received; decoding happens in the
/// driver so every source shares one decode path. Each provider handles its
/// own timing:
/// - UDP: waits on the socket
/// - Replay: sleeps between records to match the recorded rate
#[async_trait::async_trait]
pub trait Provider: Send + 'static {
    /// Get the next raw packet
    ///
    /// Returns:
    /// - `Ok(Some(bytes))` - one datagram or capture record
    /// - `Ok(None)` - stream ended (normal termination)
    /// - `Err(e)` - error occurred; the driver decides whether to retry
    async fn next_packet(&mut self) -> Result<Option<Vec<u8>>>;

    /// Native packet rate in Hz
    fn tick_rate(&self) -> f64;
}
