//! Cross-context "still learning" heartbeats.
//!
//! Companion windows publish `opened` / `activity` / `closed` messages on a
//! broadcast channel named after the session. The session subscribes and
//! folds them into a single boolean: is a companion window open and recently
//! used? That boolean vetoes idle warnings; it is never a state of its own.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeartbeatKind {
    LearningWindowOpened,
    LearningWindowActivity,
    LearningWindowClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatMessage {
    #[serde(rename = "type")]
    pub kind: HeartbeatKind,
    pub session_id: String,
    pub url: String,
    /// Epoch milliseconds.
    pub timestamp: u64,
}

/// Broadcast bus shared by every context of one session.
#[derive(Debug, Clone)]
pub struct HeartbeatChannel {
    name: String,
    session_id: String,
    sender: broadcast::Sender<HeartbeatMessage>,
}

impl HeartbeatChannel {
    pub fn open(session_id: &str) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            name: format!("learning-session-{session_id}"),
            session_id: session_id.to_string(),
            sender,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns how many subscribers received the message.
    pub fn publish(&self, message: HeartbeatMessage) -> usize {
        match self.sender.send(message) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!(channel = %self.name, "heartbeat published with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> HeartbeatSubscription {
        HeartbeatSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn publisher(&self, url: impl Into<String>) -> LearningWindowPublisher {
        LearningWindowPublisher {
            channel: self.clone(),
            url: url.into(),
        }
    }
}

/// Non-blocking receiving end. Dropping it unsubscribes.
#[derive(Debug)]
pub struct HeartbeatSubscription {
    receiver: broadcast::Receiver<HeartbeatMessage>,
}

impl HeartbeatSubscription {
    pub fn drain(&mut self) -> Vec<HeartbeatMessage> {
        use broadcast::error::TryRecvError;

        let mut messages = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(message) => messages.push(message),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "heartbeat subscriber lagged, skipping ahead");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        messages
    }
}

/// Publishing side used by a companion learning window.
#[derive(Debug, Clone)]
pub struct LearningWindowPublisher {
    channel: HeartbeatChannel,
    url: String,
}

impl LearningWindowPublisher {
    pub fn opened(&self, timestamp: u64) -> usize {
        self.send(HeartbeatKind::LearningWindowOpened, timestamp)
    }

    pub fn activity(&self, timestamp: u64) -> usize {
        self.send(HeartbeatKind::LearningWindowActivity, timestamp)
    }

    pub fn closed(&self, timestamp: u64) -> usize {
        self.send(HeartbeatKind::LearningWindowClosed, timestamp)
    }

    fn send(&self, kind: HeartbeatKind, timestamp: u64) -> usize {
        self.channel.publish(HeartbeatMessage {
            kind,
            session_id: self.channel.session_id.clone(),
            url: self.url.clone(),
            timestamp,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct CompanionContext {
    open: bool,
    last_seen_ms: u64,
}

/// Aggregates heartbeats into the "learning elsewhere" veto.
#[derive(Debug, Clone)]
pub struct HeartbeatTracker {
    session_id: String,
    grace_ms: u64,
    contexts: HashMap<String, CompanionContext>,
}

impl HeartbeatTracker {
    pub fn new(session_id: impl Into<String>, grace_secs: u64) -> Self {
        Self {
            session_id: session_id.into(),
            grace_ms: grace_secs * 1_000,
            contexts: HashMap::new(),
        }
    }

    /// Fold one message in. Returns false for messages of other sessions.
    pub fn observe(&mut self, message: &HeartbeatMessage) -> bool {
        if message.session_id != self.session_id {
            return false;
        }
        match message.kind {
            HeartbeatKind::LearningWindowOpened => {
                let ctx = self
                    .contexts
                    .entry(message.url.clone())
                    .or_insert(CompanionContext {
                        open: true,
                        last_seen_ms: message.timestamp,
                    });
                ctx.open = true;
                ctx.last_seen_ms = ctx.last_seen_ms.max(message.timestamp);
            }
            HeartbeatKind::LearningWindowActivity => {
                if let Some(ctx) = self.contexts.get_mut(&message.url) {
                    ctx.last_seen_ms = ctx.last_seen_ms.max(message.timestamp);
                }
            }
            HeartbeatKind::LearningWindowClosed => {
                if let Some(ctx) = self.contexts.get_mut(&message.url) {
                    ctx.open = false;
                }
            }
        }
        true
    }

    pub fn is_learning_elsewhere(&self, now_epoch_ms: u64) -> bool {
        self.contexts
            .values()
            .any(|ctx| ctx.open && now_epoch_ms.saturating_sub(ctx.last_seen_ms) <= self.grace_ms)
    }
}
