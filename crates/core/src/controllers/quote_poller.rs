use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::adapters::QuoteAdapter;
use crate::errors::CoreError;
use crate::models::notice::ErrorOrigin;
use crate::models::quote::{Quote, QuoteUpdate};
use crate::providers::traits::QuoteSource;
use crate::session::SessionContext;

/// Observable state of the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling { symbol: String },
}

struct ActivePoll {
    symbol: String,
    task: JoinHandle<()>,
}

/// Generation token plus the running loop, behind one lock.
///
/// A loop publishes only while holding this lock and only if its epoch is
/// still current; `start`/`stop` bump the epoch under the same lock, so
/// nothing from an old loop can be published once they return.
struct Gate {
    epoch: u64,
    active: Option<ActivePoll>,
}

/// Polls one symbol at a fixed interval until stopped.
///
/// The first fetch happens immediately on `start`, then once per interval.
/// A failed tick publishes an error and the loop keeps going.
pub struct QuotePoller {
    source: QuoteAdapter,
    ctx: Arc<SessionContext>,
    interval: Duration,
    gate: Arc<Mutex<Gate>>,
}

impl QuotePoller {
    pub fn new(source: Arc<dyn QuoteSource>, ctx: Arc<SessionContext>, interval: Duration) -> Self {
        Self {
            source: QuoteAdapter::new(source),
            ctx,
            interval,
            gate: Arc::new(Mutex::new(Gate {
                epoch: 0,
                active: None,
            })),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling `symbol`, replacing any symbol currently polled.
    pub fn start(&self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            let e = CoreError::QuoteNotAvailable(String::new());
            warn!(error = %e, "refusing to poll an empty symbol");
            self.ctx.publish_error(ErrorOrigin::Quote, &e);
            return;
        }
        if self.ctx.is_shut_down() {
            warn!(%symbol, "session is shut down, not polling");
            return;
        }

        let mut gate = lock(&self.gate);
        if let Some(previous) = gate.active.take() {
            previous.task.abort();
            debug!(symbol = %previous.symbol, "quote polling replaced");
        }
        gate.epoch += 1;

        let task = self.ctx.spawn(run_loop(
            self.source.clone(),
            Arc::clone(&self.ctx),
            Arc::clone(&self.gate),
            symbol.clone(),
            gate.epoch,
            self.interval,
        ));
        info!(%symbol, interval_ms = self.interval.as_millis() as u64, "quote polling started");
        gate.active = Some(ActivePoll { symbol, task });
    }

    /// Stop polling. No-op when idle.
    pub fn stop(&self) {
        let mut gate = lock(&self.gate);
        gate.epoch += 1;
        if let Some(previous) = gate.active.take() {
            previous.task.abort();
            info!(symbol = %previous.symbol, "quote polling stopped");
        }
    }

    pub fn state(&self) -> PollerState {
        match &lock(&self.gate).active {
            Some(active) => PollerState::Polling {
                symbol: active.symbol.clone(),
            },
            None => PollerState::Idle,
        }
    }
}

async fn run_loop(
    source: QuoteAdapter,
    ctx: Arc<SessionContext>,
    gate: Arc<Mutex<Gate>>,
    symbol: String,
    epoch: u64,
    period: Duration,
) {
    let shutdown = ctx.shutdown_signal();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let ticked = tokio::select! {
            biased;
            _ = shutdown.cancelled() => false,
            _ = ticker.tick() => true,
        };
        if !ticked {
            break;
        }

        let result = source.fetch(&symbol).await;
        if !publish_tick(&gate, &ctx, epoch, &symbol, result) {
            break;
        }
    }
    debug!(%symbol, epoch, "quote loop exited");
}

/// Publish one tick's outcome if `epoch` is still current.
/// Returns `false` when the loop has been superseded.
fn publish_tick(
    gate: &Mutex<Gate>,
    ctx: &SessionContext,
    epoch: u64,
    symbol: &str,
    result: Result<Quote, CoreError>,
) -> bool {
    let gate = lock(gate);
    if gate.epoch != epoch {
        return false;
    }

    match result {
        Ok(quote) => ctx.publish_quote(QuoteUpdate::new(symbol, quote)),
        Err(e) => {
            warn!(%symbol, error = %e, "quote fetch failed, polling continues");
            ctx.publish_error(ErrorOrigin::Quote, &e);
        }
    }
    true
}

fn lock(gate: &Mutex<Gate>) -> MutexGuard<'_, Gate> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}
