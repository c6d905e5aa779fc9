//! Provider wrapper that records every packet it passes on

use tracing::{info, warn};

use crate::Result;
use crate::capture::CaptureWriter;
use crate::provider::Provider;

/// Tees packets from an inner provider into a capture file.
///
/// Recording failures are logged and stop the recording; they never
/// interrupt the telemetry stream itself.
pub struct RecordingProvider<P> {
    inner: P,
    writer: Option<CaptureWriter>,
}

impl<P: Provider> RecordingProvider<P> {
    pub fn new(inner: P, writer: CaptureWriter) -> Self {
        Self { inner, writer: Some(writer) }
    }

    /// Whether the capture is still being written.
    pub fn is_recording(&self) -> bool {
        self.writer.is_some()
    }
}

impl<P> RecordingProvider<P> {
    fn finish(&mut self) {
        if let Some(writer) = self.writer.take() {
            let path = writer.path().to_path_buf();
            match writer.finish() {
                Ok(records) => info!(path = %path.display(), records, "Capture saved"),
                Err(e) => warn!(error = %e, "Failed to finalize capture"),
            }
        }
    }
}

#[async_trait::async_trait]
impl<P: Provider> Provider for RecordingProvider<P> {
    async fn next_packet(&mut self) -> Result<Option<Vec<u8>>> {
        let packet = self.inner.next_packet().await?;

        match &packet {
            Some(bytes) => {
                let failed = match self.writer.as_mut() {
                    Some(writer) => writer.write_packet(bytes).err(),
                    None => None,
                };
                if let Some(e) = failed {
                    warn!(error = %e, "Recording stopped");
                    self.writer = None;
                }
            }
            None => self.finish(),
        }

        Ok(packet)
    }

    fn tick_rate(&self) -> f64 {
        self.inner.tick_rate()
    }
}

impl<P> Drop for RecordingProvider<P> {
    fn drop(&mut self) {
        self.finish();
    }
}
