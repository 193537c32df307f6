//! Deterministic driver around a [`FocusSession`].
//!
//! Owns the virtual clock, the pending duck timers, the optional heartbeat
//! subscription and the persistence sink. Ordering within one instant:
//! due duck timers, then the tick, then the external input.

use crate::duck::DuckTimer;
use crate::signals::HeartbeatSubscription;
use crate::storage::SessionStore;

use super::engine::{Effect, FocusSession, Input, SessionSnapshot};
use super::scheduler::TimerQueue;

pub struct SessionDriver<S> {
    session: FocusSession,
    store: S,
    timers: TimerQueue<DuckTimer>,
    heartbeat: Option<HeartbeatSubscription>,
    tick_ms: u64,
    now_ms: u64,
    next_tick_ms: u64,
    disposed: bool,
    persist_failures: u64,
}

impl<S: SessionStore> SessionDriver<S> {
    pub fn new(session: FocusSession, store: S, tick_ms: u64) -> Self {
        let tick_ms = tick_ms.max(1);
        Self {
            session,
            store,
            timers: TimerQueue::new(),
            heartbeat: None,
            tick_ms,
            now_ms: 0,
            next_tick_ms: tick_ms,
            disposed: false,
            persist_failures: 0,
        }
    }

    pub fn with_heartbeat(mut self, subscription: HeartbeatSubscription) -> Self {
        self.heartbeat = Some(subscription);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn session(&self) -> &FocusSession {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_scheduled(&self, timer: DuckTimer) -> bool {
        self.timers.contains(timer)
    }

    pub fn persist_failures(&self) -> u64 {
        self.persist_failures
    }

    /// Next instant at which the driver has work, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        if self.disposed {
            return None;
        }
        Some(match self.timers.next_due() {
            Some(due) => due.min(self.next_tick_ms),
            None => self.next_tick_ms,
        })
    }

    // ── Driving ──────────────────────────────────────────────────────

    /// Run every timer and tick due at or before `target_ms`.
    pub fn advance_to(&mut self, target_ms: u64) {
        if self.disposed {
            return;
        }
        loop {
            let horizon = target_ms.min(self.next_tick_ms);
            if let Some((due, timer)) = self.timers.pop_due(horizon) {
                self.now_ms = self.now_ms.max(due);
                self.handle(Input::Timer { timer });
            } else if self.next_tick_ms <= target_ms {
                self.now_ms = self.next_tick_ms;
                self.next_tick_ms += self.tick_ms;
                self.pump_heartbeats();
                self.handle(Input::Tick);
            } else {
                break;
            }
        }
        self.now_ms = self.now_ms.max(target_ms);
    }

    /// Deliver an input at the current instant. Returns false once disposed.
    pub fn dispatch(&mut self, input: Input) -> bool {
        if self.disposed {
            tracing::warn!(?input, "input after dispose ignored");
            return false;
        }
        self.advance_to(self.now_ms);
        self.pump_heartbeats();
        self.handle(input);
        true
    }

    pub fn dispatch_at(&mut self, at_ms: u64, input: Input) -> bool {
        self.advance_to(at_ms);
        self.dispatch(input)
    }

    /// Cancel every pending timer and drop the heartbeat subscription.
    pub fn dispose(&mut self) -> SessionSnapshot {
        if !self.disposed {
            self.disposed = true;
            self.timers.clear();
            self.heartbeat = None;
            tracing::info!(
                session = self.session.session_id(),
                at_ms = self.now_ms,
                "session disposed"
            );
        }
        self.session.snapshot()
    }

    fn pump_heartbeats(&mut self) {
        let messages = match self.heartbeat.as_mut() {
            Some(subscription) => subscription.drain(),
            None => return,
        };
        for message in messages {
            self.handle(Input::Heartbeat(message));
        }
    }

    fn handle(&mut self, input: Input) {
        for effect in self.session.handle(input, self.now_ms) {
            match effect {
                Effect::Schedule { timer, after_ms } => {
                    self.timers.schedule(self.now_ms + after_ms, timer);
                }
                Effect::Cancel(timer) => {
                    self.timers.cancel(timer);
                }
                Effect::Persist(op) => {
                    if let Err(e) = self.store.apply(self.session.session_id(), &op) {
                        self.persist_failures += 1;
                        tracing::warn!(error = %e, ?op, "persisting session data failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duck::AnimationState;
    use crate::session::SessionParams;
    use crate::storage::{Config, MemoryStore};
    use chrono::Utc;

    fn driver() -> SessionDriver<MemoryStore> {
        let config = Config::default();
        let session = FocusSession::new(SessionParams::new("s-1", 1_500, Utc::now()), &config);
        SessionDriver::new(session, MemoryStore::new(), config.session.tick_ms)
    }

    #[test]
    fn ticks_are_mirrored_into_the_store() {
        let mut d = driver();
        d.advance_to(10_000);
        assert_eq!(d.store().counters("s-1").active_seconds, 10);
        assert_eq!(d.session().clock().active_seconds, 10);
    }

    #[test]
    fn landing_timer_fires_on_schedule() {
        let mut d = driver();
        d.advance_to(60_000);
        assert_eq!(d.session().animation(), AnimationState::Falling);
        assert!(d.is_scheduled(DuckTimer::FallLanded));
        d.advance_to(61_499);
        assert_eq!(d.session().animation(), AnimationState::Falling);
        d.advance_to(61_500);
        assert_eq!(d.session().animation(), AnimationState::Fallen);
        assert!(d.is_scheduled(DuckTimer::GhostRise));
    }

    #[test]
    fn store_failures_are_counted_not_fatal() {
        let mut d = driver();
        d.store.set_failing(true);
        d.advance_to(3_000);
        assert_eq!(d.persist_failures(), 3);
        assert_eq!(d.session().clock().active_seconds, 3);
    }

    #[test]
    fn dispose_clears_timers_and_rejects_input() {
        let mut d = driver();
        d.advance_to(62_000);
        assert!(d.pending_timers() > 0);
        d.dispose();
        assert_eq!(d.pending_timers(), 0);
        assert_eq!(d.next_deadline(), None);
        assert!(!d.dispatch(Input::Activity));
        d.advance_to(120_000);
        assert_eq!(d.session().animation(), AnimationState::Fallen);
    }
}
