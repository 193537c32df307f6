//! Segment timeline and session clock.
//!
//! This module provides:
//! - Focus/gap segments positioned on the counted session axis
//! - The three-counter session clock and its priority rule
//! - The builder that turns signals and commands into segment boundaries

mod builder;
mod clock;
mod segment;

pub use builder::{Command, Directive, TimelineBuilder, TimelineSignal};
pub use clock::{Counter, SessionClock};
pub use segment::{GapReason, Segment, SegmentKind};
