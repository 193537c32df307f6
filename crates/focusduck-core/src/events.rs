use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timeline::Counter;

/// Discrete session events recorded as rows by the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    WentIdle,
    ResumedActivity,
    WindowBlur,
    WindowFocus,
    /// The duck climbed back out of a fall and started its return celebration.
    JoyfulReturn,
}

impl SessionEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionEventKind::WentIdle => "went_idle",
            SessionEventKind::ResumedActivity => "resumed_activity",
            SessionEventKind::WindowBlur => "window_blur",
            SessionEventKind::WindowFocus => "window_focus",
            SessionEventKind::JoyfulReturn => "joyful_return",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "went_idle" => Some(SessionEventKind::WentIdle),
            "resumed_activity" => Some(SessionEventKind::ResumedActivity),
            "window_blur" => Some(SessionEventKind::WindowBlur),
            "window_focus" => Some(SessionEventKind::WindowFocus),
            "joyful_return" => Some(SessionEventKind::JoyfulReturn),
            _ => None,
        }
    }
}

/// One row for the session event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEventRecord {
    pub session_id: String,
    pub kind: SessionEventKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_duration_seconds: Option<u64>,
}

/// Fire-and-forget writes the session hands to the store adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PersistOp {
    /// One second was counted against `counter`.
    IncrementCounter { counter: Counter },
    RecordEvent(SessionEventRecord),
}
