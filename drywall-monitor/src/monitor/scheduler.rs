//! Runs refresh cycles on a fixed interval and on demand.
//!
//! # Lifecycle
//!
//! ```text
//!            start()                    stop() / drop
//!  Stopped ──────────► Running ─────────────────────► Stopped
//!                       │   ▲
//!                       │   │ tick every `period`, refresh_now()
//!                       └───┘
//! ```
//!
//! `start()` spawns a driver task that owns the only writer of the
//! [`PollState`]. The driver begins a cycle immediately, then on every
//! tick of an interval anchored at start. Manual refreshes start extra
//! cycles without moving that grid.
//!
//! Each cycle's fetches run in their own task and report back to the
//! driver. Cycles may overlap; every cycle gets a sequence number and only
//! the completion of the most recently started cycle is applied, so a slow
//! old cycle can never overwrite a newer result. Stopping cancels the
//! driver (and with it the timer) but not cycles already in flight; their
//! results arrive at a closed channel and are dropped.

use std::sync::Arc;
use std::time::Duration;

use strum::Display;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::state::PollState;
use crate::aggregator::{ErrorDetail, StatusSource};
use crate::config::POLL_INTERVAL;
use crate::error::{Error, Result};
use crate::snapshot::StatusSnapshot;
use crate::tracing::prelude::*;

/// What started a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CycleTrigger {
    Periodic,
    Manual,
}

enum SchedulerCommand {
    RefreshNow,
}

struct CycleOutcome {
    seq: u64,
    result: std::result::Result<StatusSnapshot, ErrorDetail>,
}

/// Handle to a running driver task.
struct Running {
    cancel: CancellationToken,
    command_tx: mpsc::UnboundedSender<SchedulerCommand>,
    task: JoinHandle<()>,
}

/// Polls a [`StatusSource`] and publishes the result as a [`PollState`].
///
/// The scheduler is the sole owner of the poll state. Readers get a
/// [`watch::Receiver`] from [`subscribe`](Self::subscribe). Dropping the
/// scheduler stops it.
pub struct PollScheduler<S> {
    source: Arc<S>,
    period: Duration,
    state_tx: Arc<watch::Sender<PollState>>,
    running: Option<Running>,
}

impl<S: StatusSource> PollScheduler<S> {
    /// Scheduler with the standard 30 s period.
    pub fn new(source: S) -> Self {
        Self::with_period(source, POLL_INTERVAL)
    }

    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn with_period(source: S, period: Duration) -> Self {
        assert!(!period.is_zero(), "poll period must be non-zero");
        let (state_tx, _) = watch::channel(PollState::Idle);
        Self {
            source: Arc::new(source),
            period,
            state_tx: Arc::new(state_tx),
            running: None,
        }
    }

    /// Receiver for poll state changes.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_tx.subscribe()
    }

    /// Current poll state.
    pub fn state(&self) -> PollState {
        self.state_tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start polling: one cycle now, then one every period.
    ///
    /// Does nothing if already running. Must be called within a tokio
    /// runtime.
    pub fn start(&mut self) {
        if self.running.is_some() {
            debug!("Poll scheduler already running");
            return;
        }

        let cancel = CancellationToken::new();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            source: Arc::clone(&self.source),
            state_tx: Arc::clone(&self.state_tx),
            cancel: cancel.clone(),
            command_rx,
            outcome_tx,
            outcome_rx,
            latest_seq: 0,
        };
        let task = tokio::spawn(driver.run(self.period));

        info!(period = ?self.period, "Poll scheduler started");
        self.running = Some(Running {
            cancel,
            command_tx,
            task,
        });
    }

    /// Stop polling.
    ///
    /// Cancels the periodic timer and waits for the driver to exit. Cycles
    /// still in flight finish on their own but their results are
    /// discarded: once this returns the poll state no longer changes.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        running.cancel.cancel();
        if let Err(e) = running.task.await {
            error!(error = %e, "Poll driver task failed");
        }
        info!("Poll scheduler stopped");
    }

    /// Start a cycle now, outside the periodic schedule.
    ///
    /// The next periodic tick still fires on the existing grid.
    pub fn refresh_now(&self) -> Result<()> {
        let running = self.running.as_ref().ok_or(Error::NotRunning)?;
        running
            .command_tx
            .send(SchedulerCommand::RefreshNow)
            .map_err(|_| Error::NotRunning)
    }
}

impl<S> Drop for PollScheduler<S> {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
        }
    }
}

struct Driver<S> {
    source: Arc<S>,
    state_tx: Arc<watch::Sender<PollState>>,
    cancel: CancellationToken,
    command_rx: mpsc::UnboundedReceiver<SchedulerCommand>,
    outcome_tx: mpsc::UnboundedSender<CycleOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<CycleOutcome>,
    /// Sequence number of the most recently started cycle.
    latest_seq: u64,
}

impl<S: StatusSource> Driver<S> {
    async fn run(mut self, period: Duration) {
        trace!("Poll driver started.");

        // The first tick completes immediately.
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    break;
                }
                Some(outcome) = self.outcome_rx.recv() => {
                    self.complete(outcome);
                }
                _ = interval.tick() => {
                    self.begin(CycleTrigger::Periodic);
                }
                Some(command) = self.command_rx.recv() => {
                    match command {
                        SchedulerCommand::RefreshNow => self.begin(CycleTrigger::Manual),
                    }
                }
            }
        }

        trace!("Poll driver stopped.");
    }

    fn begin(&mut self, trigger: CycleTrigger) {
        self.latest_seq += 1;
        let seq = self.latest_seq;
        debug!(seq, %trigger, "Refresh cycle started");

        self.state_tx.send_replace(PollState::Loading);

        let source = Arc::clone(&self.source);
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = source.refresh().await;
            // Fails only once the driver has exited.
            let _ = outcome_tx.send(CycleOutcome { seq, result });
        });
    }

    fn complete(&mut self, outcome: CycleOutcome) {
        if self.cancel.is_cancelled() {
            return;
        }

        if outcome.seq != self.latest_seq {
            debug!(
                seq = outcome.seq,
                latest_seq = self.latest_seq,
                "Discarding superseded refresh result"
            );
            return;
        }

        let state = match outcome.result {
            Ok(snapshot) => {
                debug!(seq = outcome.seq, "Refresh cycle succeeded");
                PollState::Ready(Arc::new(snapshot))
            }
            Err(detail) => {
                warn!(seq = outcome.seq, error = %detail, "Refresh cycle failed");
                PollState::Failed(detail)
            }
        };
        self.state_tx.send_replace(state);
    }
}
