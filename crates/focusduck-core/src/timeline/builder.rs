//! Segment timeline builder.
//!
//! Owns the single answer to "why is the user not progressing right now".
//! Signals and commands close the open segment and open the next one; the
//! builder answers with [`Directive`]s for the duck, the progress tracker and
//! the event log instead of touching them directly.
//!
//! ## Recovery from a fall
//!
//! When the user comes back while the duck is lying down, the duck climbs
//! and celebrates for several seconds. The gap stays open during that
//! sequence and only closes when the duck reports the end of the return
//! celebration, so the new focus segment starts where walking resumes.

use serde::{Deserialize, Serialize};

use super::clock::Counter;
use super::segment::{GapReason, Segment};
use crate::duck::{AnimationState, Sequence};
use crate::events::SessionEventKind;
use crate::progress::Milestone;

/// Edge-triggered inputs after veto filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimelineSignal {
    Warning,
    Idle,
    Active,
    Hidden,
    Visible,
    /// A click anywhere on the page.
    PageClick,
}

/// Explicit user intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    StartBreak,
    EndBreak,
    ToggleBreak,
    StartReading,
    EndReading,
    ToggleReading,
}

/// What the builder asks the rest of the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Animate(AnimationState),
    FreezeProgress,
    /// Return the idle detector to active without an edge.
    ResetIdleDetector,
    Record {
        kind: SessionEventKind,
        gap_duration_seconds: Option<u64>,
    },
}

#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    closed: Vec<Segment>,
    open: Segment,
    last_sequence: u32,
    /// A detected gap is waiting for the return celebration to finish.
    pending_recovery: bool,
    /// Goal reached but the duck has not celebrated it yet.
    pending_celebration: bool,
    hidden: bool,
    idle: bool,
}

impl TimelineBuilder {
    /// Start with an open focus segment at `start_offset`.
    pub fn new(start_offset: u64) -> Self {
        Self {
            closed: Vec::new(),
            open: Segment::focus(1, start_offset),
            last_sequence: 1,
            pending_recovery: false,
            pending_celebration: false,
            hidden: false,
            idle: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn closed_segments(&self) -> &[Segment] {
        &self.closed
    }

    pub fn open_segment(&self) -> &Segment {
        &self.open
    }

    pub fn is_on_break(&self) -> bool {
        self.open.gap_reason() == Some(GapReason::Break)
    }

    pub fn is_reading(&self) -> bool {
        self.open.gap_reason() == Some(GapReason::Reading)
    }

    pub fn override_active(&self) -> bool {
        self.open.gap_reason().is_some_and(GapReason::is_override)
    }

    pub fn is_recovering(&self) -> bool {
        self.pending_recovery
    }

    pub fn is_celebration_pending(&self) -> bool {
        self.pending_celebration
    }

    /// Counter charged by the next tick.
    pub fn tick_counter(&self) -> Counter {
        Counter::select(self.override_active(), self.hidden, self.idle)
    }

    // ── Inputs ───────────────────────────────────────────────────────

    pub fn signal(
        &mut self,
        signal: TimelineSignal,
        at: u64,
        duck: AnimationState,
    ) -> Vec<Directive> {
        match signal {
            TimelineSignal::Warning => self.on_warning(),
            TimelineSignal::Idle => {
                self.idle = true;
                self.on_idle(at)
            }
            TimelineSignal::Hidden => {
                self.hidden = true;
                self.on_hidden(at)
            }
            TimelineSignal::Active => {
                self.idle = false;
                self.on_return(at, duck, signal)
            }
            TimelineSignal::Visible => {
                self.hidden = false;
                self.on_return(at, duck, signal)
            }
            TimelineSignal::PageClick if duck.is_down() => {
                self.idle = false;
                self.on_return(at, duck, signal)
            }
            TimelineSignal::PageClick => Vec::new(),
        }
    }

    pub fn command(&mut self, command: Command, at: u64, duck: AnimationState) -> Vec<Directive> {
        match command {
            Command::StartBreak => self.start_override(GapReason::Break, at, duck),
            Command::EndBreak => self.end_override(GapReason::Break, at),
            Command::ToggleBreak if self.is_on_break() => self.end_override(GapReason::Break, at),
            Command::ToggleBreak => self.start_override(GapReason::Break, at, duck),
            Command::StartReading => self.start_override(GapReason::Reading, at, duck),
            Command::EndReading => self.end_override(GapReason::Reading, at),
            Command::ToggleReading if self.is_reading() => {
                self.end_override(GapReason::Reading, at)
            }
            Command::ToggleReading => self.start_override(GapReason::Reading, at, duck),
        }
    }

    /// The duck finished a sequence. `duck` is its state afterwards.
    pub fn sequence_complete(
        &mut self,
        sequence: Sequence,
        at: u64,
        duck: AnimationState,
    ) -> Vec<Directive> {
        match sequence {
            Sequence::Climb { recovering: true } => {
                let gap = self
                    .pending_recovery
                    .then(|| self.open.duration_secs(at));
                return vec![Directive::Record {
                    kind: SessionEventKind::JoyfulReturn,
                    gap_duration_seconds: gap,
                }];
            }
            Sequence::ReturnCelebration if self.pending_recovery => {
                self.pending_recovery = false;
                if self.hidden || self.idle {
                    // The user left again during the celebration.
                    let reason = if self.hidden {
                        GapReason::Away
                    } else {
                        GapReason::Idle
                    };
                    if self.open.gap_reason() != Some(reason) {
                        self.close_and_open(Segment::gap(reason, at), at);
                    }
                } else {
                    self.start_focus(at);
                }
            }
            Sequence::Celebration => self.pending_celebration = false,
            _ => {}
        }
        self.resync(duck).into_iter().collect()
    }

    /// Milestones that just fired. The goal celebration is held until the
    /// duck is walking outside an override.
    pub fn milestones(&mut self, fired: &[Milestone], duck: AnimationState) -> Vec<Directive> {
        if fired.contains(&Milestone::Complete) {
            self.pending_celebration = true;
        }
        self.celebration(duck).into_iter().collect()
    }

    // ── Transitions ──────────────────────────────────────────────────

    fn on_warning(&self) -> Vec<Directive> {
        if !self.open.is_focus() {
            return Vec::new();
        }
        vec![Directive::Animate(AnimationState::Jumping)]
    }

    fn on_idle(&mut self, at: u64) -> Vec<Directive> {
        if !self.open.is_focus() {
            tracing::debug!(open = ?self.open.kind, "idle while not in focus, timeline unchanged");
            return Vec::new();
        }
        self.close_and_open(Segment::gap(GapReason::Idle, at), at);
        vec![
            Directive::Animate(AnimationState::Falling),
            Directive::Record {
                kind: SessionEventKind::WentIdle,
                gap_duration_seconds: None,
            },
        ]
    }

    fn on_hidden(&mut self, at: u64) -> Vec<Directive> {
        let blur = Directive::Record {
            kind: SessionEventKind::WindowBlur,
            gap_duration_seconds: None,
        };
        match self.open.gap_reason() {
            Some(reason) if reason.is_override() => Vec::new(),
            Some(GapReason::Idle)
                if !self.pending_recovery && self.open.start_offset_secs == at =>
            {
                // Idle and hidden in the same tick: away wins.
                self.open = Segment::gap(GapReason::Away, at);
                vec![blur]
            }
            Some(GapReason::Idle) if self.pending_recovery => {
                // Left again during the return sequence: away starts here.
                self.close_and_open(Segment::gap(GapReason::Away, at), at);
                vec![blur]
            }
            Some(_) => vec![blur],
            None => {
                self.close_and_open(Segment::gap(GapReason::Away, at), at);
                vec![Directive::Animate(AnimationState::Falling), blur]
            }
        }
    }

    fn on_return(&mut self, at: u64, duck: AnimationState, via: TimelineSignal) -> Vec<Directive> {
        let reason = match self.open.gap_reason() {
            None => {
                return match via {
                    TimelineSignal::Active if duck == AnimationState::Jumping => {
                        let mut directives = vec![Directive::Animate(AnimationState::Walking)];
                        directives.extend(self.celebration(AnimationState::Walking));
                        directives
                    }
                    TimelineSignal::Visible => vec![Directive::Record {
                        kind: SessionEventKind::WindowFocus,
                        gap_duration_seconds: None,
                    }],
                    _ => Vec::new(),
                };
            }
            Some(reason) => reason,
        };

        if reason.is_override() {
            return if duck.is_down() {
                vec![
                    Directive::FreezeProgress,
                    Directive::Animate(AnimationState::Climbing),
                ]
            } else {
                Vec::new()
            };
        }

        if self.pending_recovery || self.hidden {
            return Vec::new();
        }

        let mut directives = Vec::new();
        if via != TimelineSignal::Active {
            self.idle = false;
            directives.push(Directive::ResetIdleDetector);
        }
        let record = Directive::Record {
            kind: match reason {
                GapReason::Away => SessionEventKind::WindowFocus,
                _ => SessionEventKind::ResumedActivity,
            },
            gap_duration_seconds: Some(self.open.duration_secs(at)),
        };

        if duck.is_down() {
            self.pending_recovery = true;
            tracing::info!(at, ?reason, "recovery started, gap held open until celebration ends");
            directives.push(Directive::FreezeProgress);
        } else {
            self.start_focus(at);
        }
        directives.push(Directive::Animate(AnimationState::Climbing));
        directives.push(record);
        directives
    }

    fn start_override(&mut self, reason: GapReason, at: u64, duck: AnimationState) -> Vec<Directive> {
        let current = self.open.gap_reason();
        if current == Some(reason) {
            return Vec::new();
        }
        if let Some(previous) = current.filter(|r| r.is_override()) {
            tracing::info!(?previous, next = ?reason, "override replaced");
        }
        self.pending_recovery = false;
        self.close_and_open(Segment::gap(reason, at), at);

        if duck.is_down() {
            vec![
                Directive::FreezeProgress,
                Directive::Animate(AnimationState::Climbing),
            ]
        } else {
            vec![Directive::Animate(AnimationState::Idle)]
        }
    }

    fn end_override(&mut self, reason: GapReason, at: u64) -> Vec<Directive> {
        if self.open.gap_reason() != Some(reason) {
            return Vec::new();
        }
        self.start_focus(at);
        let mut directives = vec![Directive::Animate(AnimationState::Walking)];
        directives.extend(self.celebration(AnimationState::Walking));
        directives
    }

    /// Steady-state animation implied by the open segment.
    fn resync(&self, duck: AnimationState) -> Option<Directive> {
        use AnimationState::*;

        let desired = match self.open.gap_reason() {
            Some(reason) if reason.is_override() => Idle,
            Some(_) if !self.pending_recovery => Falling,
            Some(_) => return None,
            None => return self.celebration(duck),
        };
        let settled = match desired {
            Falling => matches!(duck, Falling | Fallen | GhostlyJumping),
            other => duck == other,
        };
        (!settled).then_some(Directive::Animate(desired))
    }

    /// Owed goal celebration, once the duck walks outside an override.
    fn celebration(&self, duck: AnimationState) -> Option<Directive> {
        (self.pending_celebration && duck == AnimationState::Walking && !self.override_active())
            .then_some(Directive::Animate(AnimationState::Celebrating))
    }

    fn start_focus(&mut self, at: u64) {
        self.last_sequence += 1;
        self.close_and_open(Segment::focus(self.last_sequence, at), at);
    }

    /// Close the open segment at `at` and open `next`. Empty segments are
    /// dropped rather than kept as closed entries.
    fn close_and_open(&mut self, next: Segment, at: u64) {
        let mut finished = std::mem::replace(&mut self.open, next);
        if finished.start_offset_secs < at {
            finished.end_offset_secs = Some(at);
            tracing::info!(
                kind = ?finished.kind,
                start = finished.start_offset_secs,
                end = at,
                "segment closed"
            );
            self.closed.push(finished);
        }
        tracing::debug!(kind = ?self.open.kind, start = at, "segment opened");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::segment::SegmentKind;

    const WALKING: AnimationState = AnimationState::Walking;

    fn assert_contiguous(builder: &TimelineBuilder, start: u64) {
        let mut cursor = start;
        for seg in builder.closed_segments() {
            assert_eq!(seg.start_offset_secs, cursor);
            let end = seg.end_offset_secs.unwrap();
            assert!(end > seg.start_offset_secs);
            cursor = end;
        }
        assert_eq!(builder.open_segment().start_offset_secs, cursor);
    }

    #[test]
    fn idle_opens_gap_and_requests_fall() {
        let mut builder = TimelineBuilder::new(0);
        let directives = builder.signal(TimelineSignal::Idle, 60, WALKING);
        assert_eq!(
            directives,
            vec![
                Directive::Animate(AnimationState::Falling),
                Directive::Record {
                    kind: SessionEventKind::WentIdle,
                    gap_duration_seconds: None
                },
            ]
        );
        assert_eq!(builder.open_segment().gap_reason(), Some(GapReason::Idle));
        assert_eq!(builder.closed_segments().len(), 1);
        assert_eq!(builder.tick_counter(), Counter::Idle);

        // Duplicate idle is a no-op.
        assert!(builder.signal(TimelineSignal::Idle, 61, AnimationState::Falling).is_empty());
        assert_contiguous(&builder, 0);
    }

    #[test]
    fn simple_return_closes_gap_immediately() {
        let mut builder = TimelineBuilder::new(0);
        builder.signal(TimelineSignal::Idle, 60, WALKING);
        let directives = builder.signal(TimelineSignal::Active, 70, AnimationState::Falling);
        assert!(directives.contains(&Directive::Animate(AnimationState::Climbing)));
        assert!(directives.contains(&Directive::Record {
            kind: SessionEventKind::ResumedActivity,
            gap_duration_seconds: Some(10)
        }));
        assert_eq!(builder.open_segment().sequence(), Some(2));
        assert_eq!(builder.open_segment().start_offset_secs, 70);
        assert!(!builder.is_recovering());
    }

    #[test]
    fn recovery_from_fallen_defers_focus_until_celebration_ends() {
        let mut builder = TimelineBuilder::new(0);
        builder.signal(TimelineSignal::Idle, 60, WALKING);
        let directives = builder.signal(TimelineSignal::PageClick, 75, AnimationState::GhostlyJumping);
        assert_eq!(directives[0], Directive::ResetIdleDetector);
        assert!(directives.contains(&Directive::FreezeProgress));
        assert!(builder.is_recovering());
        assert_eq!(builder.open_segment().gap_reason(), Some(GapReason::Idle));
        assert_eq!(builder.tick_counter(), Counter::Active);

        let directives = builder.sequence_complete(
            Sequence::Climb { recovering: true },
            77,
            AnimationState::CelebratingReturn,
        );
        assert_eq!(
            directives,
            vec![Directive::Record {
                kind: SessionEventKind::JoyfulReturn,
                gap_duration_seconds: Some(17)
            }]
        );

        let directives = builder.sequence_complete(Sequence::ReturnCelebration, 80, WALKING);
        assert!(directives.is_empty());
        assert!(!builder.is_recovering());
        assert_eq!(builder.open_segment().start_offset_secs, 80);
        assert_eq!(builder.open_segment().sequence(), Some(2));
        assert_contiguous(&builder, 0);
    }

    #[test]
    fn hidden_in_same_tick_as_idle_becomes_away() {
        let mut builder = TimelineBuilder::new(0);
        builder.signal(TimelineSignal::Idle, 60, WALKING);
        builder.signal(TimelineSignal::Hidden, 60, AnimationState::Falling);
        assert_eq!(builder.open_segment().gap_reason(), Some(GapReason::Away));
        assert_eq!(builder.tick_counter(), Counter::Away);
    }

    #[test]
    fn hidden_after_idle_gap_keeps_idle_reason() {
        let mut builder = TimelineBuilder::new(0);
        builder.signal(TimelineSignal::Idle, 60, WALKING);
        let directives = builder.signal(TimelineSignal::Hidden, 65, AnimationState::Fallen);
        assert_eq!(
            directives,
            vec![Directive::Record {
                kind: SessionEventKind::WindowBlur,
                gap_duration_seconds: None
            }]
        );
        assert_eq!(builder.open_segment().gap_reason(), Some(GapReason::Idle));
    }

    #[test]
    fn activity_while_hidden_does_not_recover_away_gap() {
        let mut builder = TimelineBuilder::new(0);
        builder.signal(TimelineSignal::Hidden, 10, WALKING);
        assert!(builder.signal(TimelineSignal::Active, 12, AnimationState::Falling).is_empty());
        let directives = builder.signal(TimelineSignal::Visible, 20, AnimationState::Fallen);
        assert!(directives.contains(&Directive::Record {
            kind: SessionEventKind::WindowFocus,
            gap_duration_seconds: Some(10)
        }));
    }

    #[test]
    fn overrides_suppress_detection() {
        let mut builder = TimelineBuilder::new(0);
        let directives = builder.command(Command::StartBreak, 10, WALKING);
        assert_eq!(directives, vec![Directive::Animate(AnimationState::Idle)]);
        assert!(builder.is_on_break());

        assert!(builder.signal(TimelineSignal::Idle, 80, AnimationState::Idle).is_empty());
        assert!(builder.signal(TimelineSignal::Hidden, 90, AnimationState::Idle).is_empty());
        assert_eq!(builder.tick_counter(), Counter::Active);
        assert!(builder.is_on_break());
    }

    #[test]
    fn break_commands_are_idempotent_and_toggle() {
        let mut builder = TimelineBuilder::new(0);
        builder.command(Command::StartBreak, 10, WALKING);
        assert!(builder.command(Command::StartBreak, 12, AnimationState::Idle).is_empty());
        assert_eq!(builder.closed_segments().len(), 1);

        let directives = builder.command(Command::ToggleBreak, 20, AnimationState::Idle);
        assert_eq!(directives, vec![Directive::Animate(AnimationState::Walking)]);
        assert!(!builder.is_on_break());
        assert_eq!(builder.open_segment().sequence(), Some(2));

        assert!(builder.command(Command::EndBreak, 25, WALKING).is_empty());
    }

    #[test]
    fn reading_then_break_ends_on_break() {
        let mut builder = TimelineBuilder::new(0);
        builder.command(Command::ToggleReading, 10, WALKING);
        builder.command(Command::ToggleBreak, 30, AnimationState::Idle);
        assert!(builder.is_on_break());
        assert!(!builder.is_reading());

        let closed = builder.closed_segments();
        assert_eq!(closed.len(), 2);
        assert_eq!(
            closed[1].kind,
            SegmentKind::Gap {
                reason: GapReason::Reading
            }
        );
        assert_eq!(closed[1].end_offset_secs, Some(30));
        assert_eq!(builder.open_segment().start_offset_secs, 30);
        assert_contiguous(&builder, 0);
    }

    #[test]
    fn break_while_duck_is_down_rescues_it() {
        let mut builder = TimelineBuilder::new(0);
        builder.signal(TimelineSignal::Idle, 60, WALKING);
        let directives = builder.command(Command::StartBreak, 80, AnimationState::Fallen);
        assert_eq!(
            directives,
            vec![
                Directive::FreezeProgress,
                Directive::Animate(AnimationState::Climbing)
            ]
        );
        assert!(builder.is_on_break());

        // After the return celebration the duck settles into idle.
        let directives = builder.sequence_complete(Sequence::ReturnCelebration, 85, WALKING);
        assert_eq!(directives, vec![Directive::Animate(AnimationState::Idle)]);
    }

    #[test]
    fn ignored_fall_is_reissued_after_climb() {
        let mut builder = TimelineBuilder::new(0);
        builder.signal(TimelineSignal::Idle, 60, WALKING);
        builder.signal(TimelineSignal::Active, 62, AnimationState::Falling);
        // Idle again while the duck is still climbing.
        builder.signal(TimelineSignal::Idle, 63, AnimationState::Climbing);
        let directives =
            builder.sequence_complete(Sequence::Climb { recovering: false }, 64, WALKING);
        assert_eq!(directives, vec![Directive::Animate(AnimationState::Falling)]);
    }

    #[test]
    fn leaving_during_return_celebration_reopens_detected_gap() {
        let mut builder = TimelineBuilder::new(0);
        builder.signal(TimelineSignal::Idle, 60, WALKING);
        builder.signal(TimelineSignal::PageClick, 75, AnimationState::Fallen);
        builder.signal(TimelineSignal::Hidden, 78, AnimationState::CelebratingReturn);
        let directives = builder.sequence_complete(Sequence::ReturnCelebration, 80, WALKING);
        assert_eq!(builder.open_segment().gap_reason(), Some(GapReason::Away));
        assert_eq!(directives, vec![Directive::Animate(AnimationState::Falling)]);
    }

    #[test]
    fn warning_only_in_focus_and_active_clears_jump() {
        let mut builder = TimelineBuilder::new(0);
        assert_eq!(
            builder.signal(TimelineSignal::Warning, 30, WALKING),
            vec![Directive::Animate(AnimationState::Jumping)]
        );
        assert_eq!(
            builder.signal(TimelineSignal::Active, 31, AnimationState::Jumping),
            vec![Directive::Animate(AnimationState::Walking)]
        );
        builder.command(Command::StartReading, 40, WALKING);
        assert!(builder.signal(TimelineSignal::Warning, 70, AnimationState::Idle).is_empty());
    }

    #[test]
    fn click_when_duck_is_up_does_nothing() {
        let mut builder = TimelineBuilder::new(0);
        assert!(builder.signal(TimelineSignal::PageClick, 5, WALKING).is_empty());
        assert_eq!(builder.closed_segments().len(), 0);
    }

    #[test]
    fn milestone_100_requests_celebration() {
        let mut builder = TimelineBuilder::new(0);
        assert!(builder.milestones(&[Milestone::Half], WALKING).is_empty());
        assert_eq!(
            builder.milestones(&[Milestone::ThreeQuarters, Milestone::Complete], WALKING),
            vec![Directive::Animate(AnimationState::Celebrating)]
        );
        assert!(builder.is_celebration_pending());
        builder.sequence_complete(Sequence::Celebration, 10, WALKING);
        assert!(!builder.is_celebration_pending());
    }

    #[test]
    fn goal_reached_on_break_celebrates_when_break_ends() {
        let mut builder = TimelineBuilder::new(0);
        builder.command(Command::StartBreak, 10, WALKING);
        let idle = AnimationState::Idle;
        assert!(builder.milestones(&[Milestone::Complete], idle).is_empty());
        assert!(builder.is_celebration_pending());

        assert_eq!(
            builder.command(Command::EndBreak, 35, idle),
            vec![
                Directive::Animate(AnimationState::Walking),
                Directive::Animate(AnimationState::Celebrating),
            ]
        );
    }

    #[test]
    fn goal_reached_mid_climb_celebrates_after_resync() {
        let mut builder = TimelineBuilder::new(0);
        let climbing = AnimationState::Climbing;
        assert!(builder.milestones(&[Milestone::Complete], climbing).is_empty());
        assert_eq!(
            builder.sequence_complete(Sequence::Climb { recovering: false }, 12, WALKING),
            vec![Directive::Animate(AnimationState::Celebrating)]
        );
    }

    #[test]
    fn hiding_during_return_sequence_splits_the_gap() {
        let mut builder = TimelineBuilder::new(0);
        builder.signal(TimelineSignal::Idle, 60, WALKING);
        builder.signal(TimelineSignal::Active, 75, AnimationState::GhostlyJumping);
        assert!(builder.is_recovering());

        builder.signal(TimelineSignal::Hidden, 78, AnimationState::CelebratingReturn);
        let idle_gap = builder.closed_segments().last().unwrap();
        assert_eq!(idle_gap.gap_reason(), Some(GapReason::Idle));
        assert_eq!(idle_gap.end_offset_secs, Some(78));
        assert_eq!(builder.open_segment().gap_reason(), Some(GapReason::Away));
        assert_eq!(builder.open_segment().start_offset_secs, 78);

        let directives = builder.sequence_complete(Sequence::ReturnCelebration, 79, WALKING);
        assert_eq!(directives, vec![Directive::Animate(AnimationState::Falling)]);
        assert_eq!(builder.open_segment().start_offset_secs, 78);
        assert_contiguous(&builder, 0);
    }

    #[test]
    fn zero_length_segments_are_not_kept() {
        let mut builder = TimelineBuilder::new(0);
        builder.command(Command::StartBreak, 0, WALKING);
        assert!(builder.closed_segments().is_empty());
        assert!(builder.is_on_break());
    }
}
