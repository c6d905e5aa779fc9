//! Connection handles over a running driver task.
//!
//! [`UdpConnection`] listens for the game, [`ReplayConnection`] plays back a
//! capture. Both expose the same subscription surface; dropping either one
//! stops its driver task.

pub mod replay;
pub mod udp;

#[cfg(test)]
mod tests;

pub use replay::ReplayConnection;
pub use udp::UdpConnection;

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::adapters::FrameAdapter;
use crate::driver::{DriverChannels, DriverStats, FrameUpdate};
use crate::stream::ThrottleExt;
use crate::types::{PlayerLapHistory, UpdateRate};

/// Receivers and shutdown handle shared by both connection kinds.
pub(crate) struct Subscriptions {
    updates: watch::Receiver<Option<Arc<FrameUpdate>>>,
    laps: watch::Receiver<Arc<PlayerLapHistory>>,
    stats: watch::Receiver<DriverStats>,
    source_hz: f64,
    cancel: CancellationToken,
}

impl Subscriptions {
    pub(crate) fn new(channels: DriverChannels, source_hz: f64) -> Self {
        Self {
            updates: channels.updates,
            laps: channels.laps,
            stats: channels.stats,
            source_hz,
            cancel: channels.cancel,
        }
    }

    pub(crate) fn subscribe<T>(&self, rate: UpdateRate) -> BoxStream<'static, T>
    where
        T: FrameAdapter + Send + 'static,
    {
        let updates = WatchStream::new(self.updates.clone()).filter_map(|opt| async move { opt });

        match rate.throttle_interval(self.source_hz) {
            None => updates.map(|update| T::adapt(&update)).boxed(),
            Some(interval) => {
                updates.throttle(interval).map(|update| T::adapt(&update)).boxed()
            }
        }
    }

    pub(crate) fn lap_updates(&self) -> impl Stream<Item = Arc<PlayerLapHistory>> + Send + 'static {
        WatchStream::new(self.laps.clone())
    }

    pub(crate) fn current_laps(&self) -> Arc<PlayerLapHistory> {
        Arc::clone(&self.laps.borrow())
    }

    pub(crate) fn latest(&self) -> Option<Arc<FrameUpdate>> {
        self.updates.borrow().clone()
    }

    pub(crate) fn stats(&self) -> DriverStats {
        *self.stats.borrow()
    }

    pub(crate) fn updates(&self) -> watch::Receiver<Option<Arc<FrameUpdate>>> {
        self.updates.clone()
    }

    pub(crate) fn source_hz(&self) -> f64 {
        self.source_hz
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        debug!("Dropping connection, cancelling driver");
        self.cancel.cancel();
    }
}
