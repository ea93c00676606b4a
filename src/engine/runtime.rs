// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::reconcile::{ReconciliationReport, Reconciler};
use crate::errors::Result;

/// Events flowing into the reconciliation runtime from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// Run a pass now, independent of the timer.
    RunNow,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Time between timer-driven passes. The first pass runs immediately.
    pub interval: Duration,
    /// Stop after the first pass (used for `--once`).
    pub exit_after_first_pass: bool,
}

/// What the runtime did before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeSummary {
    pub passes: u64,
    pub last_report: Option<ReconciliationReport>,
}

/// Timer-driven shell around [`Reconciler::reconcile_all`].
///
/// All semantics live in the reconciler; this only decides when a pass runs.
pub struct ReconcileRuntime {
    reconciler: Reconciler,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    options: RuntimeOptions,
}

impl fmt::Debug for ReconcileRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconcileRuntime")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ReconcileRuntime {
    pub fn new(
        reconciler: Reconciler,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            reconciler,
            event_rx,
            options,
        }
    }

    /// Main loop.
    ///
    /// - Runs a pass on every timer tick and on `RunNow`.
    /// - Stops on `ShutdownRequested`, when the event channel closes, or
    ///   after the first pass if so configured.
    pub async fn run(mut self) -> Result<RuntimeSummary> {
        info!(
            interval_secs = self.options.interval.as_secs(),
            "reconcile runtime started"
        );

        let mut summary = RuntimeSummary::default();
        let mut ticker = tokio::time::interval(self.options.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = ticker.tick() => {
                    debug!("reconcile timer fired");
                    self.pass(&mut summary);
                    if self.options.exit_after_first_pass {
                        break;
                    }
                }
                event = self.event_rx.recv() => {
                    match event {
                        Some(RuntimeEvent::RunNow) => {
                            debug!("reconcile requested by host");
                            self.pass(&mut summary);
                            if self.options.exit_after_first_pass {
                                break;
                            }
                        }
                        Some(RuntimeEvent::ShutdownRequested) => {
                            info!("shutdown requested; stopping reconcile runtime");
                            break;
                        }
                        None => {
                            info!("runtime event channel closed; exiting");
                            break;
                        }
                    }
                }
            }
        }

        info!(passes = summary.passes, "reconcile runtime exiting");
        Ok(summary)
    }

    fn pass(&self, summary: &mut RuntimeSummary) {
        summary.passes += 1;
        match self.reconciler.reconcile_all() {
            Ok(report) => summary.last_report = Some(report),
            Err(e) => warn!(error = %e, "reconciliation pass could not enumerate open items"),
        }
    }
}
