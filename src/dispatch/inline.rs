// src/dispatch/inline.rs

use std::sync::Arc;

use super::Dispatcher;
use crate::errors::Result;
use crate::graph::rollup_progress;
use crate::store::WorkItemStore;

/// Runs the roll-up synchronously in the caller.
#[derive(Debug, Clone)]
pub struct InlineDispatcher {
    store: Arc<dyn WorkItemStore>,
}

impl InlineDispatcher {
    pub fn new(store: Arc<dyn WorkItemStore>) -> Self {
        Self { store }
    }
}

impl Dispatcher for InlineDispatcher {
    fn dispatch_rollup(&self, parent_id: &str) -> Result<()> {
        rollup_progress(self.store.as_ref(), parent_id).map(|_| ())
    }
}
