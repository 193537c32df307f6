//! Goal progress with freeze support and one-shot milestones.
//!
//! The displayed percent can be pinned while the duck plays its return
//! celebration, so the bar does not jump ahead of the animation even though
//! active seconds keep accruing underneath.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Fixed percent thresholds, each fired at most once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Milestone {
    Quarter,
    Half,
    ThreeQuarters,
    Complete,
}

impl Milestone {
    pub const ALL: [Milestone; 4] = [
        Milestone::Quarter,
        Milestone::Half,
        Milestone::ThreeQuarters,
        Milestone::Complete,
    ];

    pub fn percent(self) -> u8 {
        match self {
            Milestone::Quarter => 25,
            Milestone::Half => 50,
            Milestone::ThreeQuarters => 75,
            Milestone::Complete => 100,
        }
    }
}

impl From<Milestone> for u8 {
    fn from(m: Milestone) -> Self {
        m.percent()
    }
}

impl TryFrom<u8> for Milestone {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Milestone::ALL
            .into_iter()
            .find(|m| m.percent() == value)
            .ok_or_else(|| format!("{value} is not a milestone"))
    }
}

/// What the UI renders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub percent: f64,
    pub frozen: bool,
    pub frozen_at_active_seconds: Option<u64>,
}

/// `percent = min(active / goal * 100, 100)`, 0 when the goal is 0.
pub fn percent_of(active_seconds: u64, goal_seconds: u64) -> f64 {
    if goal_seconds == 0 {
        return 0.0;
    }
    (active_seconds as f64 / goal_seconds as f64 * 100.0).min(100.0)
}

#[derive(Debug, Clone)]
pub struct ProgressTracker {
    goal_seconds: u64,
    displayed: f64,
    frozen_at: Option<u64>,
    fired: BTreeSet<Milestone>,
}

impl ProgressTracker {
    /// Start tracking. Milestones already behind `initial_active_seconds`
    /// count as passed and will not fire.
    pub fn new(goal_seconds: u64, initial_active_seconds: u64) -> Self {
        if goal_seconds == 0 {
            tracing::warn!("session goal is zero; progress will stay at 0%");
        }
        Self {
            goal_seconds,
            displayed: percent_of(initial_active_seconds, goal_seconds),
            frozen_at: None,
            fired: BTreeSet::new(),
        }
    }

    pub fn goal_seconds(&self) -> u64 {
        self.goal_seconds
    }

    pub fn percent(&self) -> f64 {
        self.displayed
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_at.is_some()
    }

    pub fn fired(&self) -> &BTreeSet<Milestone> {
        &self.fired
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            percent: self.displayed,
            frozen: self.is_frozen(),
            frozen_at_active_seconds: self.frozen_at,
        }
    }

    /// Recompute the displayed percent. Returns milestones crossed from below.
    /// A frozen tracker ignores updates.
    pub fn update(&mut self, active_seconds: u64) -> Vec<Milestone> {
        if self.is_frozen() {
            return Vec::new();
        }
        let next = percent_of(active_seconds, self.goal_seconds);
        if next <= self.displayed {
            return Vec::new();
        }
        let previous = std::mem::replace(&mut self.displayed, next);

        let mut crossed = Vec::new();
        for milestone in Milestone::ALL {
            let threshold = f64::from(milestone.percent());
            if previous < threshold && next >= threshold && self.fired.insert(milestone) {
                tracing::info!(milestone = milestone.percent(), active_seconds, "milestone reached");
                crossed.push(milestone);
            }
        }
        crossed
    }

    /// Pin the displayed percent. Repeated freezes keep the first pin.
    pub fn freeze(&mut self, active_seconds: u64) {
        if self.frozen_at.is_none() {
            self.frozen_at = Some(active_seconds);
        }
    }

    /// Release the pin and catch up with the current active seconds.
    pub fn unfreeze(&mut self, active_seconds: u64) -> Vec<Milestone> {
        if self.frozen_at.take().is_none() {
            return Vec::new();
        }
        self.update(active_seconds)
    }
}
