//! Activity signal sources.
//!
//! Each detector turns raw input into edge-triggered signals:
//! - [`IdleDetector`]: warning / idle / active from pointer and keyboard input
//! - [`VisibilityDetector`]: hidden / visible from document visibility
//! - [`HeartbeatTracker`]: the "learning in another window" veto

mod heartbeat;
mod idle;
mod visibility;

pub use heartbeat::{
    HeartbeatChannel, HeartbeatKind, HeartbeatMessage, HeartbeatSubscription, HeartbeatTracker,
    LearningWindowPublisher,
};
pub use idle::{IdleDetector, IdleSignal};
pub use visibility::{VisibilityDetector, VisibilitySignal};
