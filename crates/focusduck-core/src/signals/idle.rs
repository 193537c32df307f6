//! Inactivity detection with a warning and an idle threshold.
//!
//! Edge-triggered: each threshold fires once per idle episode and `Active`
//! fires once when input resumes after either of them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleSignal {
    Warning,
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Active,
    Warned,
    Idle,
}

#[derive(Debug, Clone)]
pub struct IdleDetector {
    warning_ms: u64,
    idle_ms: u64,
    last_activity_ms: u64,
    level: Level,
}

impl IdleDetector {
    pub fn new(warning_secs: u64, idle_secs: u64, now_ms: u64) -> Self {
        Self {
            warning_ms: warning_secs * 1_000,
            idle_ms: idle_secs * 1_000,
            last_activity_ms: now_ms,
            level: Level::Active,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.level == Level::Idle
    }

    pub fn is_warned(&self) -> bool {
        self.level == Level::Warned
    }

    /// Pointer, keyboard or scroll input.
    pub fn record_activity(&mut self, now_ms: u64) -> Option<IdleSignal> {
        self.last_activity_ms = now_ms;
        let was = std::mem::replace(&mut self.level, Level::Active);
        match was {
            Level::Active => None,
            Level::Warned | Level::Idle => Some(IdleSignal::Active),
        }
    }

    /// Thresholds crossed since the last poll, in order.
    pub fn poll(&mut self, now_ms: u64) -> Vec<IdleSignal> {
        let quiet_for = now_ms.saturating_sub(self.last_activity_ms);
        let mut signals = Vec::new();
        if self.level == Level::Active && quiet_for >= self.warning_ms {
            self.level = Level::Warned;
            signals.push(IdleSignal::Warning);
        }
        if self.level == Level::Warned && quiet_for >= self.idle_ms {
            self.level = Level::Idle;
            signals.push(IdleSignal::Idle);
        }
        signals
    }

    /// Back to active without emitting an edge.
    pub fn reset(&mut self, now_ms: u64) {
        self.last_activity_ms = now_ms;
        self.level = Level::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_warning_then_idle_once() {
        let mut detector = IdleDetector::new(30, 60, 0);
        assert!(detector.poll(29_000).is_empty());
        assert_eq!(detector.poll(30_000), vec![IdleSignal::Warning]);
        assert!(detector.poll(45_000).is_empty());
        assert_eq!(detector.poll(60_000), vec![IdleSignal::Idle]);
        assert!(detector.poll(120_000).is_empty());
        assert!(detector.is_idle());
    }

    #[test]
    fn one_poll_can_cross_both_thresholds() {
        let mut detector = IdleDetector::new(30, 60, 0);
        assert_eq!(
            detector.poll(90_000),
            vec![IdleSignal::Warning, IdleSignal::Idle]
        );
    }

    #[test]
    fn activity_resets_and_reports_active_once() {
        let mut detector = IdleDetector::new(30, 60, 0);
        assert_eq!(detector.record_activity(10_000), None);
        assert!(detector.poll(39_000).is_empty());
        assert_eq!(detector.poll(40_000), vec![IdleSignal::Warning]);
        assert_eq!(detector.record_activity(41_000), Some(IdleSignal::Active));
        assert_eq!(detector.record_activity(42_000), None);
        assert!(!detector.is_warned());
    }

    #[test]
    fn reset_is_silent() {
        let mut detector = IdleDetector::new(30, 60, 0);
        detector.poll(60_000);
        detector.reset(61_000);
        assert!(!detector.is_idle());
        assert_eq!(detector.record_activity(62_000), None);
    }
}
