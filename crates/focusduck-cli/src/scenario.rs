//! Scripted session files for `simulate`.
//!
//! ```toml
//! goal_seconds = 1500
//! until_ms = 90000
//!
//! [[steps]]
//! at_ms = 75000
//! input = "click"
//!
//! [[steps]]
//! at_ms = 1000
//! input = "heartbeat"
//! kind = "learning-window-opened"
//! url = "/lesson/3"
//! ```

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use focusduck_core::error::{CoreError, ValidationError};
use focusduck_core::timeline::Command;
use focusduck_core::{Config, HeartbeatKind, HeartbeatMessage, Input, SessionParams};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub session_id: Option<String>,
    pub goal_seconds: Option<u64>,
    /// RFC 3339; defaults to now.
    pub started_at: Option<String>,
    pub until_ms: Option<u64>,
    pub config: Option<Config>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    pub input: StepInput,
    pub kind: Option<HeartbeatKind>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepInput {
    Activity,
    Hide,
    Show,
    Click,
    StartBreak,
    EndBreak,
    ToggleBreak,
    StartReading,
    EndReading,
    ToggleReading,
    Heartbeat,
}

impl StepInput {
    pub fn as_str(self) -> &'static str {
        match self {
            StepInput::Activity => "activity",
            StepInput::Hide => "hide",
            StepInput::Show => "show",
            StepInput::Click => "click",
            StepInput::StartBreak => "start-break",
            StepInput::EndBreak => "end-break",
            StepInput::ToggleBreak => "toggle-break",
            StepInput::StartReading => "start-reading",
            StepInput::EndReading => "end-reading",
            StepInput::ToggleReading => "toggle-reading",
            StepInput::Heartbeat => "heartbeat",
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, CoreError> {
        let scenario: Scenario = toml::from_str(content)?;
        let mut previous = 0;
        for (index, step) in scenario.steps.iter().enumerate() {
            if step.at_ms < previous {
                return Err(ValidationError::UnorderedStep {
                    index,
                    at_ms: step.at_ms,
                    previous_ms: previous,
                }
                .into());
            }
            previous = step.at_ms;
        }
        Ok(scenario)
    }

    pub fn started_at(&self) -> Result<DateTime<Utc>, ValidationError> {
        match &self.started_at {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| ValidationError::InvalidValue {
                    field: "started_at".into(),
                    message: e.to_string(),
                }),
            None => Ok(Utc::now()),
        }
    }

    pub fn params(&self, config: &Config, started_at: DateTime<Utc>) -> SessionParams {
        let goal = self
            .goal_seconds
            .unwrap_or(config.session.default_goal_secs);
        match &self.session_id {
            Some(id) => SessionParams::new(id.clone(), goal, started_at),
            None => SessionParams::generate(goal, started_at),
        }
    }

    /// Last instant to simulate: `until_ms`, else the final step.
    pub fn end_ms(&self) -> u64 {
        self.until_ms
            .unwrap_or_else(|| self.steps.last().map_or(0, |s| s.at_ms))
    }
}

impl Step {
    pub fn to_input(&self, session_id: &str, started_at: DateTime<Utc>) -> Result<Input, ValidationError> {
        Ok(match self.input {
            StepInput::Activity => Input::Activity,
            StepInput::Hide => Input::Visibility { visible: false },
            StepInput::Show => Input::Visibility { visible: true },
            StepInput::Click => Input::PageClick,
            StepInput::StartBreak => command(Command::StartBreak),
            StepInput::EndBreak => command(Command::EndBreak),
            StepInput::ToggleBreak => command(Command::ToggleBreak),
            StepInput::StartReading => command(Command::StartReading),
            StepInput::EndReading => command(Command::EndReading),
            StepInput::ToggleReading => command(Command::ToggleReading),
            StepInput::Heartbeat => {
                let kind = self.kind.ok_or_else(|| ValidationError::InvalidValue {
                    field: "kind".into(),
                    message: format!("heartbeat step at {}ms needs a kind", self.at_ms),
                })?;
                let at = started_at + Duration::milliseconds(self.at_ms as i64);
                Input::Heartbeat(HeartbeatMessage {
                    kind,
                    session_id: session_id.to_string(),
                    url: self.url.clone().unwrap_or_default(),
                    timestamp: at.timestamp_millis().max(0) as u64,
                })
            }
        })
    }
}

fn command(command: Command) -> Input {
    Input::Command { command }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps_and_overrides() {
        let scenario = Scenario::parse(
            r#"
            session_id = "abc"
            until_ms = 5000

            [config.detection]
            warning_secs = 2
            idle_secs = 4

            [[steps]]
            at_ms = 100
            input = "start-reading"

            [[steps]]
            at_ms = 200
            input = "heartbeat"
            kind = "learning-window-activity"
            url = "/a"
            "#,
        )
        .unwrap();
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.steps[0].input, StepInput::StartReading);
        assert_eq!(scenario.end_ms(), 5_000);
        let config = scenario.config.clone().unwrap();
        assert_eq!(config.detection.idle_secs, 4);
        assert_eq!(config.animation.falling_ms, 1_500);
    }

    #[test]
    fn rejects_steps_out_of_order() {
        let err = Scenario::parse(
            r#"
            [[steps]]
            at_ms = 500
            input = "hide"

            [[steps]]
            at_ms = 100
            input = "show"
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::UnorderedStep { index: 1, .. })
        ));
    }

    #[test]
    fn heartbeat_step_needs_kind() {
        let scenario = Scenario::parse(
            r#"
            [[steps]]
            at_ms = 0
            input = "heartbeat"
            "#,
        )
        .unwrap();
        let err = scenario.steps[0].to_input("s", Utc::now()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    }

    #[test]
    fn missing_session_id_gets_a_uuid() {
        let scenario = Scenario::parse("goal_seconds = 60").unwrap();
        let params = scenario.params(&Config::default(), Utc::now());
        assert_eq!(params.goal_seconds, 60);
        assert_eq!(params.session_id.len(), 36);
    }
}
