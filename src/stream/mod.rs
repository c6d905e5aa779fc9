//! Stream combinators for subscriber rate control.

pub mod throttle;

pub use throttle::{Throttle, ThrottleExt};
