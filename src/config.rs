//! Listener and replay configuration
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```rust
//! use trackside::config::TracksideConfig;
//!
//! let config = TracksideConfig::from_yaml_str(
//!     "listener:\n  bind_addr: 127.0.0.1:20777\nreplay:\n  speed: 2.0\n",
//! ).unwrap();
//! assert_eq!(config.listener.recv_buffer_size, 2048);
//! assert_eq!(config.replay.speed, 2.0);
//! ```

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capture::MAX_TICK_RATE;
use crate::packet::PACKET_SIZE;
use crate::{Result, TelemetryError};

/// Port the game sends to unless told otherwise.
pub const DEFAULT_PORT: u16 = 20777;

/// Replay speed bounds; values outside are clamped.
pub const MIN_REPLAY_SPEED: f64 = 0.1;
pub const MAX_REPLAY_SPEED: f64 = 10.0;

/// UDP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenerConfig {
    pub bind_addr: SocketAddr,
    /// Receive buffer per datagram. Must hold at least one packet; the
    /// listener always allocates at least one byte more.
    pub recv_buffer_size: usize,
    /// Reject datagrams that are not exactly one packet long.
    pub strict_length: bool,
    /// Send rate configured in the game, used for throttling decisions.
    pub tick_rate_hz: f64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            recv_buffer_size: 2048,
            strict_length: false,
            tick_rate_hz: 60.0,
        }
    }
}

impl ListenerConfig {
    /// Listen on `addr` with every other setting at its default.
    pub fn on(addr: SocketAddr) -> Self {
        Self { bind_addr: addr, ..Default::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.recv_buffer_size < PACKET_SIZE {
            return Err(TelemetryError::config(format!(
                "recv_buffer_size {} cannot hold a {PACKET_SIZE}-byte packet",
                self.recv_buffer_size
            )));
        }
        if !(self.tick_rate_hz > 0.0 && self.tick_rate_hz <= f64::from(MAX_TICK_RATE)) {
            return Err(TelemetryError::config(format!(
                "tick_rate_hz must be in (0, {MAX_TICK_RATE}], got {}",
                self.tick_rate_hz
            )));
        }
        Ok(())
    }
}

/// Capture playback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayConfig {
    /// Playback speed multiplier. Zero disables pacing.
    pub speed: f64,
    /// Sleep between records to match the recorded tick rate.
    pub pacing: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { speed: 1.0, pacing: true }
    }
}

impl ReplayConfig {
    /// Replay as fast as the consumer reads.
    pub fn unpaced() -> Self {
        Self { speed: 1.0, pacing: false }
    }

    /// Effective speed multiplier, `None` when pacing is off.
    pub fn effective_speed(&self) -> Option<f64> {
        if !self.pacing || self.speed == 0.0 {
            return None;
        }
        Some(self.speed.clamp(MIN_REPLAY_SPEED, MAX_REPLAY_SPEED))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(TelemetryError::config(format!(
                "replay speed must be a non-negative number, got {}",
                self.speed
            )));
        }
        Ok(())
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TracksideConfig {
    pub listener: ListenerConfig,
    pub replay: ReplayConfig,
    /// Record every received datagram to this capture file.
    pub record_to: Option<PathBuf>,
}

impl TracksideConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;
        let config = Self::from_yaml_str(&yaml)?;
        debug!(path = %path.display(), bind_addr = %config.listener.bind_addr, "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.listener.validate()?;
        self.replay.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_game() {
        let config = ListenerConfig::default();
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert!(config.bind_addr.ip().is_unspecified());
        assert_eq!(config.recv_buffer_size, 2048);
        assert!(!config.strict_length);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(TracksideConfig::from_yaml_str("").unwrap(), TracksideConfig::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = TracksideConfig::from_yaml_str(
            "listener:\n  strict_length: true\nrecord_to: /tmp/session.cap\n",
        )
        .unwrap();
        assert!(config.listener.strict_length);
        assert_eq!(config.listener.tick_rate_hz, 60.0);
        assert_eq!(config.record_to, Some(PathBuf::from("/tmp/session.cap")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = TracksideConfig::from_yaml_str("listener:\n  bind_adress: 1.2.3.4:5\n").unwrap_err();
        assert!(matches!(err, TelemetryError::Config { .. }));
    }

    #[test]
    fn undersized_buffer_is_invalid() {
        let err = TracksideConfig::from_yaml_str("listener:\n  recv_buffer_size: 512\n").unwrap_err();
        match err {
            TelemetryError::Config { reason } => assert!(reason.contains("512")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn tick_rate_must_be_in_range() {
        for hz in [0.0, -60.0, f64::NAN, f64::INFINITY, 1001.0, 1e12] {
            let config = ListenerConfig { tick_rate_hz: hz, ..Default::default() };
            assert!(matches!(config.validate(), Err(TelemetryError::Config { .. })), "{hz}");
        }
        let config = ListenerConfig { tick_rate_hz: f64::from(MAX_TICK_RATE), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn replay_speed_is_clamped() {
        let fast = ReplayConfig { speed: 50.0, pacing: true };
        assert_eq!(fast.effective_speed(), Some(MAX_REPLAY_SPEED));
        let slow = ReplayConfig { speed: 0.01, pacing: true };
        assert_eq!(slow.effective_speed(), Some(MIN_REPLAY_SPEED));
        assert_eq!(ReplayConfig { speed: 0.0, pacing: true }.effective_speed(), None);
        assert_eq!(ReplayConfig::unpaced().effective_speed(), None);
        assert!(ReplayConfig { speed: -1.0, pacing: true }.validate().is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "replay:\n  pacing: false").unwrap();

        let config = TracksideConfig::load(file.path()).unwrap();
        assert!(!config.replay.pacing);
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let err = TracksideConfig::load("/nonexistent/trackside.yaml").unwrap_err();
        assert!(matches!(err, TelemetryError::File { .. }));
    }
}
