//! Recording and reading raw datagram captures.
//!
//! A capture stores datagrams exactly as received, so replaying one goes
//! through the same decode path as a live socket.

pub mod format;
pub mod reader;
pub mod writer;

pub use format::{CaptureHeader, MAX_TICK_RATE};
pub use reader::CaptureReader;
pub use writer::CaptureWriter;
