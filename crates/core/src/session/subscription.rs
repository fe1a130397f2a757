use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::errors::CoreError;

/// Read side of the session's shutdown flag.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub(crate) fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the session shuts down (or its context is dropped).
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|down| *down).await;
    }
}

/// Handle on a state stream: latest value plus change notifications.
///
/// Dropping the handle unsubscribes. After session shutdown every wait
/// returns `None`.
pub struct StateSubscription<T> {
    rx: watch::Receiver<T>,
    shutdown: ShutdownSignal,
}

impl<T: Clone> StateSubscription<T> {
    pub(crate) fn new(rx: watch::Receiver<T>, shutdown: ShutdownSignal) -> Self {
        Self { rx, shutdown }
    }

    /// The latest published value.
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait for the next published value.
    pub async fn changed(&mut self) -> Option<T> {
        if self.shutdown.is_shutdown() {
            return None;
        }
        let alive = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => false,
            res = self.rx.changed() => res.is_ok(),
        };
        if !alive {
            return None;
        }
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the published value satisfies `pred`, checking the
    /// current value first.
    pub async fn wait_for(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        if self.shutdown.is_shutdown() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            res = self.rx.wait_for(|v| pred(v)) => res.ok().map(|v| (*v).clone()),
        }
    }

    /// Explicitly end this subscription.
    pub fn unsubscribe(self) {}
}

/// Handle on an event stream (quotes, errors).
pub struct EventSubscription<T> {
    rx: broadcast::Receiver<T>,
    shutdown: ShutdownSignal,
    missed: u64,
}

impl<T: Clone> EventSubscription<T> {
    pub(crate) fn new(rx: broadcast::Receiver<T>, shutdown: ShutdownSignal) -> Self {
        Self {
            rx,
            shutdown,
            missed: 0,
        }
    }

    /// Next event in publication order. `None` once the session is shut down.
    ///
    /// A subscriber that falls more than the buffer size behind skips the
    /// oldest events; the count is kept in [`Self::missed`].
    pub async fn next(&mut self) -> Option<T> {
        loop {
            if self.shutdown.is_shutdown() {
                return None;
            }
            let res = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return None,
                res = self.rx.recv() => res,
            };
            match res {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "subscriber lagged behind event stream");
                    self.missed += n;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-published event, without waiting.
    pub fn try_next(&mut self) -> Option<T> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => self.missed += n,
                Err(_) => return None,
            }
        }
    }

    /// Total events skipped because this subscriber lagged.
    pub fn missed(&self) -> u64 {
        self.missed
    }

    pub fn unsubscribe(self) {}
}

/// Completion handle of an asynchronous session command.
///
/// The command runs whether or not the handle is awaited. Its effects
/// (state changes, errors) are published on the session streams before
/// [`CommandHandle::wait`] resolves.
#[must_use = "the command runs regardless; await `wait()` to observe its outcome"]
pub enum CommandHandle<T> {
    Running(JoinHandle<Result<T, CoreError>>),
    /// The session was already shut down; the command never ran.
    Rejected,
}

impl<T> CommandHandle<T> {
    pub async fn wait(self) -> Result<T, CoreError> {
        match self {
            CommandHandle::Running(handle) => match handle.await {
                Ok(result) => result,
                Err(_) => Err(CoreError::SessionClosed),
            },
            CommandHandle::Rejected => Err(CoreError::SessionClosed),
        }
    }

    /// Detach from the command, letting it finish in the background.
    pub fn detach(self) {}
}
