//! Session composition.
//!
//! - [`FocusSession`]: the pure engine, one synchronous transition per input
//! - [`SessionDriver`]: virtual clock, duck timers and the persistence sink
//! - [`LiveSession`]: the driver hosted on tokio against the wall clock

mod driver;
mod engine;
mod runtime;
mod scheduler;

pub use driver::SessionDriver;
pub use engine::{Effect, FocusSession, Input, SessionParams, SessionSnapshot};
pub use runtime::{LiveSession, LiveSessionHandle};
pub use scheduler::TimerQueue;
