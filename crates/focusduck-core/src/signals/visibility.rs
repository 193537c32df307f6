//! Document visibility with optional debouncing.
//!
//! With a zero debounce window every change is emitted immediately. With a
//! non-zero window a change must hold for the whole window before it is
//! emitted from [`VisibilityDetector::poll`]; flipping back first cancels it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilitySignal {
    Hidden,
    Visible,
}

#[derive(Debug, Clone)]
pub struct VisibilityDetector {
    debounce_ms: u64,
    visible: bool,
    pending: Option<(bool, u64)>,
}

impl VisibilityDetector {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            visible: true,
            pending: None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        !self.visible
    }

    pub fn report(&mut self, visible: bool, now_ms: u64) -> Option<VisibilitySignal> {
        if self.debounce_ms == 0 {
            return self.commit(visible);
        }
        if visible == self.visible {
            self.pending = None;
            return None;
        }
        match self.pending {
            Some((pending, _)) if pending == visible => {}
            _ => self.pending = Some((visible, now_ms)),
        }
        None
    }

    /// Emit a debounced change once it has held long enough.
    pub fn poll(&mut self, now_ms: u64) -> Option<VisibilitySignal> {
        let (visible, since) = self.pending?;
        if now_ms.saturating_sub(since) < self.debounce_ms {
            return None;
        }
        self.pending = None;
        self.commit(visible)
    }

    fn commit(&mut self, visible: bool) -> Option<VisibilitySignal> {
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        Some(if visible {
            VisibilitySignal::Visible
        } else {
            VisibilitySignal::Hidden
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_mode_is_edge_triggered() {
        let mut detector = VisibilityDetector::new(0);
        assert_eq!(detector.report(true, 0), None);
        assert_eq!(detector.report(false, 10), Some(VisibilitySignal::Hidden));
        assert_eq!(detector.report(false, 20), None);
        assert!(detector.is_hidden());
        assert_eq!(detector.report(true, 30), Some(VisibilitySignal::Visible));
    }

    #[test]
    fn debounced_change_waits_for_window() {
        let mut detector = VisibilityDetector::new(500);
        assert_eq!(detector.report(false, 1_000), None);
        assert_eq!(detector.poll(1_400), None);
        assert_eq!(detector.poll(1_500), Some(VisibilitySignal::Hidden));
        assert!(detector.is_hidden());
    }

    #[test]
    fn rapid_toggle_is_swallowed() {
        let mut detector = VisibilityDetector::new(500);
        detector.report(false, 1_000);
        detector.report(true, 1_200);
        assert_eq!(detector.poll(2_000), None);
        assert!(!detector.is_hidden());
    }
}
