//! Frame adapter trait for subscriber projections

use std::sync::Arc;

use crate::driver::FrameUpdate;
use crate::types::{PlayerLapHistory, TelemetryFrame};

/// Projection of a [`FrameUpdate`] into the shape a subscriber wants.
///
/// `adapt()` runs once per delivered update (every packet at native rate),
/// so implementations should stay allocation-light.
pub trait FrameAdapter: Sized {
    fn adapt(update: &FrameUpdate) -> Self;
}

/// The update itself, for subscribers that want everything.
impl FrameAdapter for FrameUpdate {
    fn adapt(update: &FrameUpdate) -> Self {
        update.clone()
    }
}

/// The decoded frame alone.
impl FrameAdapter for Arc<TelemetryFrame> {
    fn adapt(update: &FrameUpdate) -> Self {
        Arc::clone(&update.frame)
    }
}

/// The lap history as of the frame.
impl FrameAdapter for Arc<PlayerLapHistory> {
    fn adapt(update: &FrameUpdate) -> Self {
        Arc::clone(&update.laps)
    }
}
