// src/dispatch/queued.rs

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::Dispatcher;
use crate::errors::Result;
use crate::graph::rollup_progress;
use crate::model::WorkItemId;
use crate::store::WorkItemStore;

/// Message consumed by the roll-up worker.
#[derive(Debug)]
pub enum RollupRequest {
    /// Recompute this parent (and its ancestors).
    Rollup { parent: WorkItemId },
    /// Reply once every request queued before this one has been handled.
    Flush(oneshot::Sender<()>),
}

/// Queues roll-ups for a background worker.
///
/// Enqueueing never blocks: when the queue is full or the worker has gone
/// away, the roll-up is computed inline instead.
#[derive(Debug, Clone)]
pub struct QueuedDispatcher {
    tx: mpsc::Sender<RollupRequest>,
    store: Arc<dyn WorkItemStore>,
}

impl QueuedDispatcher {
    /// Spawn the worker on the current Tokio runtime and return a dispatcher
    /// wired to it.
    pub fn spawn(store: Arc<dyn WorkItemStore>, queue_length: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel::<RollupRequest>(queue_length.max(1));
        let handle = tokio::spawn(run_worker(Arc::clone(&store), rx));
        (Self { tx, store }, handle)
    }

    /// Build a dispatcher around an existing channel. The caller owns the
    /// receiving side.
    pub fn with_sender(tx: mpsc::Sender<RollupRequest>, store: Arc<dyn WorkItemStore>) -> Self {
        Self { tx, store }
    }

    /// Wait until the worker has drained everything queued so far.
    ///
    /// Returns immediately if the worker is gone.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(RollupRequest::Flush(done_tx)).await.is_err() {
            return;
        }
        let _ = done_rx.await;
    }
}

impl Dispatcher for QueuedDispatcher {
    fn dispatch_rollup(&self, parent_id: &str) -> Result<()> {
        let request = RollupRequest::Rollup {
            parent: parent_id.to_string(),
        };

        match self.tx.try_send(request) {
            Ok(()) => {
                debug!(parent = %parent_id, "roll-up queued");
                Ok(())
            }
            Err(e) => {
                warn!(
                    parent = %parent_id,
                    error = %e,
                    "roll-up queue unavailable; computing inline"
                );
                rollup_progress(self.store.as_ref(), parent_id).map(|_| ())
            }
        }
    }
}

async fn run_worker(store: Arc<dyn WorkItemStore>, mut rx: mpsc::Receiver<RollupRequest>) {
    info!("roll-up worker started");

    while let Some(request) = rx.recv().await {
        match request {
            RollupRequest::Rollup { parent } => {
                if let Err(e) = rollup_progress(store.as_ref(), &parent) {
                    warn!(parent = %parent, error = %e, "queued roll-up failed");
                }
            }
            RollupRequest::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    info!("roll-up worker finished (channel closed)");
}
