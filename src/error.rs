//! Error types for telemetry ingestion.
//!
//! All errors implement `std::error::Error` and carry enough structured context
//! to decide whether the ingestion loop should keep going.
//!
//! ## Error Categories
//!
//! - **Decode Errors**: a datagram does not match the fixed packet size
//! - **Socket Errors**: binding or receiving on the UDP socket failed
//! - **Capture Errors**: a recorded capture file is missing or malformed
//! - **Configuration Errors**: invalid listener or replay settings
//!
//! ## Recovery and Retry
//!
//! Only startup failures are fatal. Everything that happens per packet is
//! reported and skipped:
//!
//! ```rust
//! use trackside::TelemetryError;
//!
//! let error = TelemetryError::decode(1237, 12);
//! assert!(!error.is_fatal());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Packet size mismatch: expected {expected} bytes, got {actual}")]
    Decode { expected: usize, actual: usize },

    #[error("Failed to bind telemetry socket on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Telemetry socket error")]
    Socket {
        #[source]
        source: std::io::Error,
    },

    #[error("Capture file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed capture file {path}: {details}")]
    Capture { path: PathBuf, details: String },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },
}

impl TelemetryError {
    /// Returns whether this error should abort ingestion entirely.
    ///
    /// Decode errors only ever cost a single frame; socket receive errors are
    /// retried by the driver. Binding and configuration problems stop startup.
    pub fn is_fatal(&self) -> bool {
        match self {
            TelemetryError::Decode { .. } => false,
            TelemetryError::Socket { .. } => false,
            TelemetryError::Timeout { .. } => false,
            TelemetryError::Bind { .. } => true,
            TelemetryError::File { .. } => true,
            TelemetryError::Capture { .. } => true,
            TelemetryError::Config { .. } => true,
        }
    }

    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TelemetryError::Socket { .. } | TelemetryError::Timeout { .. })
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::Decode { .. } => vec![
                "Set the game's UDP telemetry format to 2017 (legacy)",
                "Make sure only one game instance sends to this port",
            ],
            TelemetryError::Bind { .. } => vec![
                "Check that no other telemetry tool is listening on the port",
                "Choose a different bind address in the listener config",
                "Verify the process may bind privileged ports if below 1024",
            ],
            TelemetryError::Socket { .. } => vec![
                "Check the network interface is up",
                "Restart the listener",
            ],
            TelemetryError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
                "Ensure sufficient disk space when recording",
            ],
            TelemetryError::Capture { .. } => vec![
                "Verify the file was written by the trackside recorder",
                "Re-record the session",
            ],
            TelemetryError::Config { .. } => vec![
                "Check the YAML syntax of the config file",
                "Compare field names with the documented defaults",
            ],
            TelemetryError::Timeout { .. } => vec![
                "Increase timeout duration",
                "Verify the capture file contains packets",
            ],
        }
    }

    /// Helper constructor for packet size mismatches.
    pub fn decode(expected: usize, actual: usize) -> Self {
        TelemetryError::Decode { expected, actual }
    }

    /// Helper constructor for bind failures.
    pub fn bind_failed(addr: SocketAddr, source: std::io::Error) -> Self {
        TelemetryError::Bind { addr, source }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }

    /// Helper constructor for malformed capture files.
    pub fn capture(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        TelemetryError::Capture { path: path.into(), details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        TelemetryError::Config { reason: reason.into() }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::Socket { source: err }
    }
}

impl From<serde_yaml_ng::Error> for TelemetryError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        TelemetryError::Config { reason: err.to_string() }
    }
}
