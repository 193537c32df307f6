//! Focus session engine.
//!
//! One explicitly constructed instance per session view. It owns every
//! component and exposes a single synchronous transition,
//! [`FocusSession::handle`], which takes an input plus the current session
//! time and returns the effects a scheduler must carry out: timers to
//! (un)schedule and writes for the persistence layer.
//!
//! The engine has no threads, no globals and no clock of its own; all time
//! comes in through `now_ms` (milliseconds since the session started).

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::duck::{AnimationState, DuckEffect, DuckMachine, DuckTimer};
use crate::events::{PersistOp, SessionEventKind, SessionEventRecord};
use crate::progress::{Milestone, ProgressSnapshot, ProgressTracker};
use crate::signals::{
    HeartbeatMessage, HeartbeatTracker, IdleDetector, IdleSignal, VisibilityDetector,
    VisibilitySignal,
};
use crate::storage::Config;
use crate::timeline::{
    Command, Counter, Directive, Segment, SessionClock, TimelineBuilder, TimelineSignal,
};

/// Everything the session view hands over at mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
    pub session_id: String,
    pub goal_seconds: u64,
    pub started_at: DateTime<Utc>,
    /// Counters persisted by an earlier run of the same session.
    #[serde(default)]
    pub initial: SessionClock,
}

impl SessionParams {
    pub fn new(session_id: impl Into<String>, goal_seconds: u64, started_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            goal_seconds,
            started_at,
            initial: SessionClock::default(),
        }
    }

    /// Fresh session with a random v4 id.
    pub fn generate(goal_seconds: u64, started_at: DateTime<Utc>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), goal_seconds, started_at)
    }

    pub fn with_initial(mut self, initial: SessionClock) -> Self {
        self.initial = initial;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "kebab-case")]
pub enum Input {
    /// One counted second.
    Tick,
    /// Pointer, keyboard or scroll input.
    Activity,
    Visibility { visible: bool },
    Heartbeat(HeartbeatMessage),
    PageClick,
    Command { command: Command },
    Timer { timer: DuckTimer },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Schedule { timer: DuckTimer, after_ms: u64 },
    Cancel(DuckTimer),
    Persist(PersistOp),
}

/// Outbound view for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub elapsed_ms: u64,
    pub goal_seconds: u64,
    pub animation: AnimationState,
    pub progress: ProgressSnapshot,
    pub clock: SessionClock,
    pub segments: Vec<Segment>,
    pub open_segment: Segment,
    pub milestones: Vec<Milestone>,
    pub is_on_break: bool,
    pub is_reading: bool,
    pub learning_elsewhere: bool,
}

enum Step {
    Directive(Directive),
    Duck(DuckEffect),
}

pub struct FocusSession {
    params: SessionParams,
    clock: SessionClock,
    timeline: TimelineBuilder,
    duck: DuckMachine,
    progress: ProgressTracker,
    idle: IdleDetector,
    visibility: VisibilityDetector,
    heartbeats: HeartbeatTracker,
    now_ms: u64,
}

impl FocusSession {
    pub fn new(params: SessionParams, config: &Config) -> Self {
        let clock = params.initial;
        let detection = &config.detection;
        Self {
            timeline: TimelineBuilder::new(clock.elapsed_secs()),
            duck: DuckMachine::new(config.animation.clone()),
            progress: ProgressTracker::new(params.goal_seconds, clock.active_seconds),
            idle: IdleDetector::new(detection.warning_secs, detection.idle_secs, 0),
            visibility: VisibilityDetector::new(detection.visibility_debounce_ms),
            heartbeats: HeartbeatTracker::new(
                params.session_id.clone(),
                detection.heartbeat_grace_secs,
            ),
            clock,
            params,
            now_ms: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session_id(&self) -> &str {
        &self.params.session_id
    }

    pub fn clock(&self) -> SessionClock {
        self.clock
    }

    pub fn animation(&self) -> AnimationState {
        self.duck.state()
    }

    pub fn timeline(&self) -> &TimelineBuilder {
        &self.timeline
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn is_on_break(&self) -> bool {
        self.timeline.is_on_break()
    }

    pub fn is_reading(&self) -> bool {
        self.timeline.is_reading()
    }

    pub fn is_learning_elsewhere(&self) -> bool {
        self.heartbeats.is_learning_elsewhere(self.epoch_ms())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.params.session_id.clone(),
            elapsed_ms: self.now_ms,
            goal_seconds: self.progress.goal_seconds(),
            animation: self.duck.state(),
            progress: self.progress.snapshot(),
            clock: self.clock,
            segments: self.timeline.closed_segments().to_vec(),
            open_segment: self.timeline.open_segment().clone(),
            milestones: self.progress.fired().iter().copied().collect(),
            is_on_break: self.is_on_break(),
            is_reading: self.is_reading(),
            learning_elsewhere: self.is_learning_elsewhere(),
        }
    }

    // ── Transition ───────────────────────────────────────────────────

    /// Apply one input at `now_ms` and return the effects to carry out.
    pub fn handle(&mut self, input: Input, now_ms: u64) -> Vec<Effect> {
        self.now_ms = self.now_ms.max(now_ms);
        let mut out = Vec::new();
        match input {
            Input::Tick => self.tick(&mut out),
            Input::Activity => self.activity(&mut out),
            Input::Visibility { visible } => {
                if let Some(signal) = self.visibility.report(visible, self.now_ms) {
                    self.visibility_signal(signal, &mut out);
                }
            }
            Input::Heartbeat(message) => {
                if !self.heartbeats.observe(&message) {
                    tracing::debug!(session = %message.session_id, "heartbeat for another session ignored");
                }
            }
            Input::PageClick => {
                self.activity(&mut out);
                self.apply_signal(TimelineSignal::PageClick, &mut out);
            }
            Input::Command { command } => {
                self.activity(&mut out);
                let directives =
                    self.timeline
                        .command(command, self.offset(), self.duck.state());
                self.run(directives, &mut out);
            }
            Input::Timer { timer } => {
                let effects = self.duck.fire(timer);
                self.run_steps(effects.into_iter().map(Step::Duck).collect(), &mut out);
            }
        }
        out
    }

    fn tick(&mut self, out: &mut Vec<Effect>) {
        let counter = self.timeline.tick_counter();
        self.clock.increment(counter);
        out.push(Effect::Persist(PersistOp::IncrementCounter { counter }));

        if counter == Counter::Active {
            let fired = self.progress.update(self.clock.active_seconds);
            let directives = self.timeline.milestones(&fired, self.duck.state());
            self.run(directives, out);
        }

        for signal in self.idle.poll(self.now_ms) {
            self.idle_signal(signal, out);
        }
        if let Some(signal) = self.visibility.poll(self.now_ms) {
            self.visibility_signal(signal, out);
        }
    }

    fn activity(&mut self, out: &mut Vec<Effect>) {
        if let Some(signal) = self.idle.record_activity(self.now_ms) {
            self.idle_signal(signal, out);
        }
    }

    fn idle_signal(&mut self, signal: IdleSignal, out: &mut Vec<Effect>) {
        let mapped = match signal {
            IdleSignal::Warning => TimelineSignal::Warning,
            IdleSignal::Idle => TimelineSignal::Idle,
            IdleSignal::Active => TimelineSignal::Active,
        };
        if mapped != TimelineSignal::Active && self.is_learning_elsewhere() {
            // Restart the inactivity clock so detection resumes once the
            // companion window goes quiet.
            self.idle.reset(self.now_ms);
            tracing::debug!(?signal, "learning in another window, idle signal vetoed");
            return;
        }
        self.apply_signal(mapped, out);
    }

    fn visibility_signal(&mut self, signal: VisibilitySignal, out: &mut Vec<Effect>) {
        let mapped = match signal {
            VisibilitySignal::Hidden => TimelineSignal::Hidden,
            VisibilitySignal::Visible => TimelineSignal::Visible,
        };
        self.apply_signal(mapped, out);
    }

    fn apply_signal(&mut self, signal: TimelineSignal, out: &mut Vec<Effect>) {
        let directives = self.timeline.signal(signal, self.offset(), self.duck.state());
        self.run(directives, out);
    }

    fn run(&mut self, directives: Vec<Directive>, out: &mut Vec<Effect>) {
        self.run_steps(directives.into_iter().map(Step::Directive).collect(), out);
    }

    /// Drain directives and duck effects in FIFO order until both settle.
    fn run_steps(&mut self, steps: VecDeque<Step>, out: &mut Vec<Effect>) {
        let mut queue = steps;
        while let Some(step) = queue.pop_front() {
            match step {
                Step::Directive(Directive::Animate(target)) => {
                    queue.extend(self.duck.request(target).into_iter().map(Step::Duck));
                }
                Step::Directive(Directive::FreezeProgress) => {
                    self.progress.freeze(self.clock.active_seconds);
                }
                Step::Directive(Directive::ResetIdleDetector) => {
                    self.idle.reset(self.now_ms);
                }
                Step::Directive(Directive::Record {
                    kind,
                    gap_duration_seconds,
                }) => {
                    out.push(Effect::Persist(PersistOp::RecordEvent(
                        self.record(kind, gap_duration_seconds),
                    )));
                }
                Step::Duck(DuckEffect::Schedule { timer, after_ms }) => {
                    out.push(Effect::Schedule { timer, after_ms });
                }
                Step::Duck(DuckEffect::Cancel(timer)) => out.push(Effect::Cancel(timer)),
                Step::Duck(DuckEffect::SequenceComplete(sequence)) => {
                    let directives =
                        self.timeline
                            .sequence_complete(sequence, self.offset(), self.duck.state());
                    queue.extend(directives.into_iter().map(Step::Directive));
                }
                Step::Duck(DuckEffect::UnfreezeProgress) => {
                    let fired = self.progress.unfreeze(self.clock.active_seconds);
                    let directives = self.timeline.milestones(&fired, self.duck.state());
                    queue.extend(directives.into_iter().map(Step::Directive));
                }
            }
        }
    }

    fn record(&self, kind: SessionEventKind, gap_duration_seconds: Option<u64>) -> SessionEventRecord {
        SessionEventRecord {
            session_id: self.params.session_id.clone(),
            kind,
            timestamp: self.params.started_at + Duration::milliseconds(self.now_ms as i64),
            gap_duration_seconds,
        }
    }

    /// Current position on the session axis.
    fn offset(&self) -> u64 {
        self.clock.elapsed_secs()
    }

    fn epoch_ms(&self) -> u64 {
        (self.params.started_at.timestamp_millis().max(0) as u64).saturating_add(self.now_ms)
    }
}
