//! Capture file writer

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::format::{CaptureHeader, MAX_RECORD_SIZE, MAX_TICK_RATE, RECORD_COUNT_OFFSET};
use crate::{Result, TelemetryError};

/// Appends raw datagrams to a capture file.
///
/// The header is written on create with a record count of 0; [`finish`]
/// patches the real count. A writer dropped without `finish` leaves a file
/// that still replays, read to EOF.
///
/// [`finish`]: CaptureWriter::finish
pub struct CaptureWriter {
    out: BufWriter<File>,
    path: PathBuf,
    records: u32,
}

impl CaptureWriter {
    /// Create (or truncate) `path` and write the header.
    pub fn create(path: impl AsRef<Path>, tick_rate: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if tick_rate == 0 || tick_rate > MAX_TICK_RATE {
            return Err(TelemetryError::config(format!(
                "capture tick rate must be 1..={MAX_TICK_RATE} Hz, got {tick_rate}"
            )));
        }

        let file = File::create(&path).map_err(|e| TelemetryError::file_error(path.clone(), e))?;
        let mut out = BufWriter::new(file);
        out.write_all(&CaptureHeader { tick_rate, record_count: 0 }.to_bytes())
            .map_err(|e| TelemetryError::file_error(path.clone(), e))?;

        info!(path = %path.display(), tick_rate, "Recording capture");
        Ok(Self { out, path, records: 0 })
    }

    pub fn write_packet(&mut self, packet: &[u8]) -> Result<()> {
        if packet.len() > MAX_RECORD_SIZE {
            return Err(TelemetryError::capture(
                &self.path,
                format!("packet of {} bytes exceeds record limit", packet.len()),
            ));
        }
        let len = packet.len() as u32;
        self.out
            .write_all(&len.to_le_bytes())
            .and_then(|()| self.out.write_all(packet))
            .map_err(|e| TelemetryError::file_error(self.path.clone(), e))?;
        self.records += 1;
        Ok(())
    }

    pub fn records(&self) -> u32 {
        self.records
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Patch the record count and flush. Returns the number of records written.
    pub fn finish(mut self) -> Result<u32> {
        let records = self.records;
        let path = self.path.clone();
        let io = |e| TelemetryError::file_error(path.clone(), e);

        self.out.flush().map_err(io)?;
        let file = self.out.get_mut();
        file.seek(SeekFrom::Start(RECORD_COUNT_OFFSET)).map_err(io)?;
        file.write_all(&records.to_le_bytes()).map_err(io)?;
        file.sync_all().map_err(io)?;

        debug!(path = %self.path.display(), records, "Capture finished");
        Ok(records)
    }
}
