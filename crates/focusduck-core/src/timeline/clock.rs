use serde::{Deserialize, Serialize};

/// The three mutually exclusive session counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Counter {
    Active,
    Idle,
    Away,
}

impl Counter {
    pub fn as_str(self) -> &'static str {
        match self {
            Counter::Active => "active",
            Counter::Idle => "idle",
            Counter::Away => "away",
        }
    }

    /// Which counter one tick charges.
    ///
    /// Overrides win over everything, then hidden, then idle.
    pub fn select(override_active: bool, hidden: bool, idle: bool) -> Self {
        if override_active {
            Counter::Active
        } else if hidden {
            Counter::Away
        } else if idle {
            Counter::Idle
        } else {
            Counter::Active
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClock {
    pub active_seconds: u64,
    pub idle_seconds: u64,
    pub away_seconds: u64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, counter: Counter) {
        match counter {
            Counter::Active => self.active_seconds += 1,
            Counter::Idle => self.idle_seconds += 1,
            Counter::Away => self.away_seconds += 1,
        }
    }

    /// Position on the session axis.
    pub fn elapsed_secs(&self) -> u64 {
        self.active_seconds + self.idle_seconds + self.away_seconds
    }
}
