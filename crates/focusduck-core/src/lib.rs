//! # Focusduck Core Library
//!
//! Focus-session engine for a study page with an animated duck companion.
//! Everything runs off caller-supplied time: the host feeds inputs and
//! ticks, and the engine answers with timers to schedule and rows to persist.
//!
//! ## Architecture
//!
//! - **Timeline**: contiguous focus and gap segments on the counted session axis
//! - **Duck**: animation state machine with protected recovery states
//! - **Signals**: idle, visibility and "learning in another window" detection
//! - **Progress**: goal percentage with freezing and one-shot milestones
//! - **Session**: the engine that composes all of the above, plus its drivers
//! - **Storage**: SQLite persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`FocusSession`]: Pure per-session state machine
//! - [`SessionDriver`]: Deterministic driver with timers and persistence
//! - [`LiveSession`]: Tokio host against the wall clock
//! - [`Config`]: Application configuration management

pub mod duck;
pub mod error;
pub mod events;
pub mod progress;
pub mod session;
pub mod signals;
pub mod storage;
pub mod timeline;

pub use duck::{AnimationState, DuckMachine, DuckTimer};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{PersistOp, SessionEventKind, SessionEventRecord};
pub use progress::{Milestone, ProgressSnapshot, ProgressTracker};
pub use session::{
    Effect, FocusSession, Input, LiveSession, LiveSessionHandle, SessionDriver, SessionParams,
    SessionSnapshot,
};
pub use signals::{HeartbeatChannel, HeartbeatKind, HeartbeatMessage};
pub use storage::{Config, MemoryStore, SessionStore, SqliteStore};
pub use timeline::{Command, Counter, GapReason, Segment, SessionClock, TimelineBuilder};
