//! Capture file reader
//!
//! ```rust,no_run
//! use trackside::capture::CaptureReader;
//!
//! fn count_packets() -> trackside::Result<usize> {
//!     let mut reader = CaptureReader::open("session.cap")?;
//!     let mut count = 0;
//!     while let Some(_packet) = reader.next_record()? {
//!         count += 1;
//!     }
//!     Ok(count)
//! }
//! ```
//!
//! The whole file is loaded at open; records are sliced out of memory.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::format::{CaptureHeader, HEADER_SIZE, MAX_RECORD_SIZE, RECORD_PREFIX_SIZE};
use crate::{Result, TelemetryError};

pub struct CaptureReader {
    data: Vec<u8>,
    position: usize,
    records_read: usize,
    header: CaptureHeader,
    path: PathBuf,
}

impl CaptureReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data =
            std::fs::read(&path).map_err(|e| TelemetryError::file_error(path.clone(), e))?;
        Self::from_bytes_with_path(data, path)
    }

    /// Reader over an in-memory capture.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_path(data, PathBuf::from("<memory>"))
    }

    fn from_bytes_with_path(data: Vec<u8>, path: PathBuf) -> Result<Self> {
        let header = CaptureHeader::parse(&data, &path)?;
        debug!(
            path = %path.display(),
            tick_rate = header.tick_rate,
            declared_records = header.record_count,
            bytes = data.len(),
            "Opened capture"
        );
        Ok(Self { data, position: HEADER_SIZE, records_read: 0, header, path })
    }

    pub fn tick_rate(&self) -> u32 {
        self.header.tick_rate
    }

    pub fn header(&self) -> CaptureHeader {
        self.header
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Upper bound on the records left: the declared count when there is
    /// one, otherwise what the remaining bytes could hold.
    pub fn remaining_records_hint(&self) -> usize {
        match self.header.record_count as usize {
            0 => (self.data.len() - self.position) / RECORD_PREFIX_SIZE,
            declared => declared.saturating_sub(self.records_read),
        }
    }

    /// Next record payload, `None` at a clean end of file.
    ///
    /// A length prefix or payload cut off by EOF is an error.
    pub fn next_record(&mut self) -> Result<Option<Vec<u8>>> {
        let remaining = &self.data[self.position..];
        if remaining.is_empty() {
            let declared = self.header.record_count as usize;
            if declared != 0 && declared != self.records_read {
                warn!(
                    declared,
                    read = self.records_read,
                    "Capture record count does not match contents"
                );
            }
            return Ok(None);
        }

        let prefix: [u8; RECORD_PREFIX_SIZE] = remaining
            .get(..RECORD_PREFIX_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| self.truncated("length prefix"))?;
        let len = u32::from_le_bytes(prefix) as usize;
        if len > MAX_RECORD_SIZE {
            return Err(TelemetryError::capture(
                &self.path,
                format!("record {} claims {len} bytes", self.records_read),
            ));
        }

        let payload = remaining
            .get(RECORD_PREFIX_SIZE..RECORD_PREFIX_SIZE + len)
            .ok_or_else(|| self.truncated("payload"))?
            .to_vec();

        self.position += RECORD_PREFIX_SIZE + len;
        self.records_read += 1;
        Ok(Some(payload))
    }

    /// Every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<Vec<u8>>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record()? {
            records.push(record);
        }
        Ok(records)
    }

    fn truncated(&self, what: &str) -> TelemetryError {
        TelemetryError::capture(
            &self.path,
            format!("record {} {what} truncated at byte {}", self.records_read, self.data.len()),
        )
    }
}
