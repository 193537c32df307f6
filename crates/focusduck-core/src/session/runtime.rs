//! Wall-clock host for a [`SessionDriver`] on the tokio runtime.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::storage::SessionStore;

use super::driver::SessionDriver;
use super::engine::{Input, SessionSnapshot};

enum Request {
    Input(Input),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

/// Cloneable handle to a running [`LiveSession`]. Dropping every handle
/// disposes the session.
#[derive(Debug, Clone)]
pub struct LiveSessionHandle {
    tx: mpsc::UnboundedSender<Request>,
}

impl LiveSessionHandle {
    /// Returns false if the session has already stopped.
    pub fn send(&self, input: Input) -> bool {
        self.tx.send(Request::Input(input)).is_ok()
    }

    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Request::Snapshot(reply)).ok()?;
        rx.await.ok()
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Request::Shutdown);
    }
}

pub struct LiveSession;

impl LiveSession {
    /// Spawn the session loop. Must be called from within a tokio runtime.
    /// The join handle resolves to the final snapshot after dispose.
    pub fn spawn<S>(driver: SessionDriver<S>) -> (LiveSessionHandle, JoinHandle<SessionSnapshot>)
    where
        S: SessionStore + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(Self::run(driver, rx));
        (LiveSessionHandle { tx }, task)
    }

    async fn run<S: SessionStore>(
        mut driver: SessionDriver<S>,
        mut rx: mpsc::UnboundedReceiver<Request>,
    ) -> SessionSnapshot {
        let origin = Instant::now()
            .checked_sub(Duration::from_millis(driver.now_ms()))
            .unwrap_or_else(Instant::now);
        let elapsed = |origin: Instant| origin.elapsed().as_millis() as u64;

        while let Some(deadline) = driver.next_deadline() {
            let wake = origin + Duration::from_millis(deadline);
            tokio::select! {
                biased;
                request = rx.recv() => match request {
                    Some(Request::Input(input)) => {
                        driver.advance_to(elapsed(origin));
                        driver.dispatch(input);
                    }
                    Some(Request::Snapshot(reply)) => {
                        driver.advance_to(elapsed(origin));
                        let _ = reply.send(driver.snapshot());
                    }
                    Some(Request::Shutdown) | None => break,
                },
                _ = tokio::time::sleep_until(wake) => driver.advance_to(deadline),
            }
        }
        driver.dispose()
    }
}
