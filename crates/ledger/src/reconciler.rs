//! Periodic reconciliation loop around [`Engine::sweep_unreleased`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{Engine, ResultLedger, SweepReport};

/// Sweep interval used when the app does not configure one.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Point-in-time view of the reconciler, suitable for a status endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerStatus {
    pub running: bool,
    pub runs: u64,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_report: Option<SweepReport>,
}

#[derive(Debug, Default)]
struct ReconcilerState {
    runs: u64,
    last_run_at: Option<DateTime<Utc>>,
    last_report: Option<SweepReport>,
}

/// Owns the background sweep task and its run history.
///
/// All state lives here rather than in globals, so independent reconcilers
/// (say, one per test) never observe each other.
#[derive(Debug)]
pub struct Reconciler {
    engine: Arc<Engine>,
    interval: Duration,
    state: Arc<RwLock<ReconcilerState>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Reconciler {
    pub fn new(engine: Arc<Engine>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            state: Arc::new(RwLock::new(ReconcilerState::default())),
            handle: Mutex::new(None),
        }
    }

    /// Spawns the sweep loop; the first sweep runs immediately.
    ///
    /// A no-op when the loop is already running.
    pub async fn start(&self) {
        let mut handle = self.handle.lock().await;
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let engine = Arc::clone(&self.engine);
        let state = Arc::clone(&self.state);
        let interval = self.interval;
        *handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = run_sweep(&engine, &state).await {
                    tracing::error!(error = %err, "scheduled reconciliation sweep failed");
                }
            }
        }));
    }

    /// Stops the loop. Safe at any point: every sweep write happens in its
    /// own transaction, so an aborted run leaves no partial state behind.
    pub async fn stop(&self) {
        let mut handle = self.handle.lock().await;
        if let Some(handle) = handle.take() {
            handle.abort();
        }
    }

    /// Sweeps once, independent of the timer. Works while the loop is
    /// stopped; the run still counts toward [`status`](Reconciler::status).
    pub async fn run_once(&self) -> ResultLedger<SweepReport> {
        run_sweep(&self.engine, &self.state).await
    }

    pub async fn status(&self) -> ReconcilerStatus {
        let running = self
            .handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished());
        let state = self.state.read().await;
        ReconcilerStatus {
            running,
            runs: state.runs,
            last_run_at: state.last_run_at,
            last_report: state.last_report.clone(),
        }
    }
}

async fn run_sweep(engine: &Engine, state: &RwLock<ReconcilerState>) -> ResultLedger<SweepReport> {
    let result = engine.sweep_unreleased().await;
    let mut state = state.write().await;
    state.runs += 1;
    state.last_run_at = Some(Utc::now());
    if let Ok(report) = &result {
        state.last_report = Some(report.clone());
    }
    result
}
