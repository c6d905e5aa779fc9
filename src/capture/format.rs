//! Capture file layout
//!
//! ## File Structure
//!
//! 1. **Magic** (8 bytes) - `TRKSCAP1`
//! 2. **Tick rate** (u32 LE) - packets per second the source was sending at
//! 3. **Record count** (u32 LE) - 0 while recording; patched when the writer finishes
//! 4. **Records** - `u32 LE length` followed by that many payload bytes, repeated to EOF
//!
//! Readers never trust the record count alone: a file whose writer was killed
//! still has 0 there and is read to EOF.

use crate::{Result, TelemetryError};
use std::path::Path;

pub const MAGIC: &[u8; 8] = b"TRKSCAP1";
pub const HEADER_SIZE: usize = 16;
pub const RECORD_PREFIX_SIZE: usize = 4;

/// Offset of the record count, patched in place by the writer.
pub(crate) const RECORD_COUNT_OFFSET: u64 = 12;

/// Payloads above this are treated as corruption rather than allocated.
pub const MAX_RECORD_SIZE: usize = 64 * 1024;

/// Highest tick rate a capture may declare, in Hz. The game sends at most 60.
pub const MAX_TICK_RATE: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureHeader {
    pub tick_rate: u32,
    /// Records declared by the writer, 0 if unknown.
    pub record_count: u32,
}

impl CaptureHeader {
    pub fn parse(data: &[u8], path: &Path) -> Result<Self> {
        let header = data.get(..HEADER_SIZE).ok_or_else(|| {
            TelemetryError::capture(
                path,
                format!("file is {} bytes, header needs {HEADER_SIZE}", data.len()),
            )
        })?;

        if &header[..8] != MAGIC {
            return Err(TelemetryError::capture(path, "missing TRKSCAP1 magic"));
        }

        let tick_rate = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
        let record_count = u32::from_le_bytes([header[12], header[13], header[14], header[15]]);

        if tick_rate == 0 {
            return Err(TelemetryError::capture(path, "tick rate is zero"));
        }
        if tick_rate > MAX_TICK_RATE {
            return Err(TelemetryError::capture(
                path,
                format!("tick rate {tick_rate} Hz exceeds {MAX_TICK_RATE} Hz"),
            ));
        }

        Ok(Self { tick_rate, record_count })
    }

    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..8].copy_from_slice(MAGIC);
        bytes[8..12].copy_from_slice(&self.tick_rate.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.record_count.to_le_bytes());
        bytes
    }
}
