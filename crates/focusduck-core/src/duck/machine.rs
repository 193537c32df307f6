//! Duck animation state machine.
//!
//! The machine owns presentation timing. Callers request a target state;
//! the machine may accept it, ignore it, or finish a running sequence first.
//! Staged transitions (falling -> fallen -> ghostly, climbing -> celebrating
//! return -> walking) are driven by timers the caller schedules from the
//! returned effects and feeds back as [`DuckEvent::Timer`].
//!
//! ## Protected states
//!
//! While in `fallen`, `ghostly-jumping` or `celebrating-return`, the only
//! accepted request is the recovery `climbing` out of `fallen` or
//! `ghostly-jumping`. Everything else is dropped.
//!
//! ```text
//! walking -> falling -(1.5s)-> fallen -(10s)-> ghostly-jumping
//!                                 \               /
//!                                  +-- climbing --+ -(1.8s)-> celebrating-return -(3s)-> walking
//! ```

use serde::{Deserialize, Serialize};

use crate::storage::AnimationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationState {
    Walking,
    Jumping,
    Falling,
    Fallen,
    GhostlyJumping,
    Climbing,
    Celebrating,
    CelebratingReturn,
    Idle,
}

impl AnimationState {
    /// States that drop external requests mid-sequence.
    pub fn is_protected(self) -> bool {
        matches!(
            self,
            AnimationState::Fallen | AnimationState::GhostlyJumping | AnimationState::CelebratingReturn
        )
    }

    /// The duck is lying down and can be rescued by a click.
    pub fn is_down(self) -> bool {
        matches!(self, AnimationState::Fallen | AnimationState::GhostlyJumping)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnimationState::Walking => "walking",
            AnimationState::Jumping => "jumping",
            AnimationState::Falling => "falling",
            AnimationState::Fallen => "fallen",
            AnimationState::GhostlyJumping => "ghostly-jumping",
            AnimationState::Climbing => "climbing",
            AnimationState::Celebrating => "celebrating",
            AnimationState::CelebratingReturn => "celebrating-return",
            AnimationState::Idle => "idle",
        }
    }
}

impl std::fmt::Display for AnimationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staged timers owned by the duck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuckTimer {
    /// falling -> fallen
    FallLanded,
    /// fallen -> ghostly-jumping
    GhostRise,
    /// climbing finished
    ClimbDone,
    /// milestone celebration finished
    CelebrationDone,
    /// return celebration finished
    ReturnCelebrationDone,
}

/// Sequences whose completion is reported back to the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sequence {
    Climb { recovering: bool },
    Celebration,
    ReturnCelebration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuckEvent {
    Request(AnimationState),
    Timer(DuckTimer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuckEffect {
    Schedule { timer: DuckTimer, after_ms: u64 },
    Cancel(DuckTimer),
    SequenceComplete(Sequence),
    UnfreezeProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuckState {
    pub animation: AnimationState,
    /// Set while a climb out of `fallen`/`ghostly-jumping` is in progress.
    pub recovering: bool,
}

impl Default for DuckState {
    fn default() -> Self {
        Self {
            animation: AnimationState::Walking,
            recovering: false,
        }
    }
}

/// Pure transition function.
pub fn transition(
    state: DuckState,
    event: DuckEvent,
    timings: &AnimationConfig,
) -> (DuckState, Vec<DuckEffect>) {
    match event {
        DuckEvent::Request(target) => request(state, target, timings),
        DuckEvent::Timer(timer) => fire(state, timer, timings),
    }
}

fn request(
    state: DuckState,
    target: AnimationState,
    timings: &AnimationConfig,
) -> (DuckState, Vec<DuckEffect>) {
    use AnimationState::*;

    let from = state.animation;
    if from == target {
        return (state, Vec::new());
    }

    if from.is_protected() {
        if target == Climbing && from.is_down() {
            let mut effects = exit_effects(from);
            effects.push(DuckEffect::Schedule {
                timer: DuckTimer::ClimbDone,
                after_ms: timings.climbing_ms,
            });
            let next = DuckState {
                animation: Climbing,
                recovering: true,
            };
            return (next, effects);
        }
        tracing::debug!(from = %from, requested = %target, "duck is mid-sequence, request ignored");
        return (state, Vec::new());
    }

    let accepted = match target {
        Falling => matches!(from, Walking | Jumping | Idle | Celebrating),
        Climbing => matches!(from, Walking | Jumping | Falling),
        Celebrating | Jumping => from == Walking,
        Walking => matches!(from, Jumping | Idle),
        Idle => matches!(from, Walking | Jumping | Falling | Celebrating),
        Fallen | GhostlyJumping | CelebratingReturn => false,
    };
    if !accepted {
        tracing::debug!(from = %from, requested = %target, "duck transition not allowed");
        return (state, Vec::new());
    }

    let mut effects = exit_effects(from);
    match target {
        Falling => effects.push(DuckEffect::Schedule {
            timer: DuckTimer::FallLanded,
            after_ms: timings.falling_ms,
        }),
        Climbing => effects.push(DuckEffect::Schedule {
            timer: DuckTimer::ClimbDone,
            after_ms: timings.climbing_ms,
        }),
        Celebrating => effects.push(DuckEffect::Schedule {
            timer: DuckTimer::CelebrationDone,
            after_ms: timings.celebrating_ms,
        }),
        _ => {}
    }
    let next = DuckState {
        animation: target,
        recovering: false,
    };
    (next, effects)
}

fn fire(
    state: DuckState,
    timer: DuckTimer,
    timings: &AnimationConfig,
) -> (DuckState, Vec<DuckEffect>) {
    use AnimationState::*;

    let walking = DuckState::default();
    match (state.animation, timer) {
        (Falling, DuckTimer::FallLanded) => (
            DuckState {
                animation: Fallen,
                recovering: false,
            },
            vec![DuckEffect::Schedule {
                timer: DuckTimer::GhostRise,
                after_ms: timings.ghost_after_ms,
            }],
        ),
        (Fallen, DuckTimer::GhostRise) => (
            DuckState {
                animation: GhostlyJumping,
                recovering: false,
            },
            Vec::new(),
        ),
        (Climbing, DuckTimer::ClimbDone) if state.recovering => (
            DuckState {
                animation: CelebratingReturn,
                recovering: true,
            },
            vec![
                DuckEffect::Schedule {
                    timer: DuckTimer::ReturnCelebrationDone,
                    after_ms: timings.celebrating_return_ms,
                },
                DuckEffect::SequenceComplete(Sequence::Climb { recovering: true }),
            ],
        ),
        (Climbing, DuckTimer::ClimbDone) => (
            walking,
            vec![DuckEffect::SequenceComplete(Sequence::Climb { recovering: false })],
        ),
        (CelebratingReturn, DuckTimer::ReturnCelebrationDone) => (
            walking,
            vec![
                DuckEffect::UnfreezeProgress,
                DuckEffect::SequenceComplete(Sequence::ReturnCelebration),
            ],
        ),
        (Celebrating, DuckTimer::CelebrationDone) => (
            walking,
            vec![DuckEffect::SequenceComplete(Sequence::Celebration)],
        ),
        (animation, timer) => {
            tracing::debug!(state = %animation, ?timer, "stale duck timer ignored");
            (state, Vec::new())
        }
    }
}

/// Cancel whatever staged timer the state being left still has pending.
fn exit_effects(from: AnimationState) -> Vec<DuckEffect> {
    let pending = match from {
        AnimationState::Falling => Some(DuckTimer::FallLanded),
        AnimationState::Fallen => Some(DuckTimer::GhostRise),
        AnimationState::Climbing => Some(DuckTimer::ClimbDone),
        AnimationState::Celebrating => Some(DuckTimer::CelebrationDone),
        AnimationState::CelebratingReturn => Some(DuckTimer::ReturnCelebrationDone),
        _ => None,
    };
    pending.map(DuckEffect::Cancel).into_iter().collect()
}

/// Stateful wrapper around [`transition`].
#[derive(Debug, Clone)]
pub struct DuckMachine {
    state: DuckState,
    timings: AnimationConfig,
}

impl DuckMachine {
    pub fn new(timings: AnimationConfig) -> Self {
        Self {
            state: DuckState::default(),
            timings,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state.animation
    }

    pub fn is_recovering(&self) -> bool {
        self.state.recovering
    }

    pub fn request(&mut self, target: AnimationState) -> Vec<DuckEffect> {
        self.apply(DuckEvent::Request(target))
    }

    pub fn fire(&mut self, timer: DuckTimer) -> Vec<DuckEffect> {
        self.apply(DuckEvent::Timer(timer))
    }

    pub fn apply(&mut self, event: DuckEvent) -> Vec<DuckEffect> {
        let before = self.state.animation;
        let (next, effects) = transition(self.state, event, &self.timings);
        if next.animation != before {
            tracing::debug!(from = %before, to = %next.animation, "duck transition");
        }
        self.state = next;
        effects
    }
}
