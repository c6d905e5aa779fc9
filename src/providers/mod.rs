//! Packet sources: UDP socket, capture replay and a recording tap.

pub mod recording;
pub mod replay;
pub mod udp;

pub use recording::RecordingProvider;
pub use replay::ReplayProvider;
pub use udp::UdpProvider;
