//! Focus and gap segments on the session axis.
//!
//! Offsets are counted seconds (`active + idle + away`), not wall clock.

use serde::{Deserialize, Serialize};

/// Why the user is not progressing during a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapReason {
    Idle,
    Away,
    Break,
    Reading,
}

impl GapReason {
    /// Break and reading are declared by the user and never penalized.
    pub fn is_override(self) -> bool {
        matches!(self, GapReason::Break | GapReason::Reading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SegmentKind {
    Focus { sequence: u32 },
    Gap { reason: GapReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(flatten)]
    pub kind: SegmentKind,
    pub start_offset_secs: u64,
    pub end_offset_secs: Option<u64>,
}

impl Segment {
    pub fn focus(sequence: u32, start: u64) -> Self {
        Self {
            kind: SegmentKind::Focus { sequence },
            start_offset_secs: start,
            end_offset_secs: None,
        }
    }

    pub fn gap(reason: GapReason, start: u64) -> Self {
        Self {
            kind: SegmentKind::Gap { reason },
            start_offset_secs: start,
            end_offset_secs: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_offset_secs.is_none()
    }

    pub fn is_focus(&self) -> bool {
        matches!(self.kind, SegmentKind::Focus { .. })
    }

    pub fn gap_reason(&self) -> Option<GapReason> {
        match self.kind {
            SegmentKind::Gap { reason } => Some(reason),
            SegmentKind::Focus { .. } => None,
        }
    }

    pub fn sequence(&self) -> Option<u32> {
        match self.kind {
            SegmentKind::Focus { sequence } => Some(sequence),
            SegmentKind::Gap { .. } => None,
        }
    }

    /// Length in seconds. Open segments are measured up to `now_offset`.
    pub fn duration_secs(&self, now_offset: u64) -> u64 {
        self.end_offset_secs
            .unwrap_or(now_offset)
            .saturating_sub(self.start_offset_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_segment_measures_against_now() {
        let seg = Segment::gap(GapReason::Idle, 40);
        assert!(seg.is_open());
        assert_eq!(seg.duration_secs(65), 25);
        assert_eq!(seg.gap_reason(), Some(GapReason::Idle));
        assert_eq!(seg.sequence(), None);
    }

    #[test]
    fn closed_segment_ignores_now() {
        let mut seg = Segment::focus(2, 10);
        seg.end_offset_secs = Some(30);
        assert_eq!(seg.duration_secs(500), 20);
        assert_eq!(seg.sequence(), Some(2));
    }

    #[test]
    fn override_reasons() {
        assert!(GapReason::Break.is_override());
        assert!(GapReason::Reading.is_override());
        assert!(!GapReason::Idle.is_override());
        assert!(!GapReason::Away.is_override());
    }

    #[test]
    fn serializes_flat_kind() {
        let seg = Segment::gap(GapReason::Reading, 5);
        let json = serde_json::to_value(&seg).unwrap();
        assert_eq!(json["kind"], "gap");
        assert_eq!(json["reason"], "reading");
        assert_eq!(json["startOffsetSecs"], 5);
    }
}
