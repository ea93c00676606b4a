// src/dispatch/mod.rs

//! Pluggable dispatch of parent roll-up work.
//!
//! The work item service talks to a [`Dispatcher`] instead of calling the
//! roll-up directly. Which implementation is used is a host decision taken
//! from `[config].dispatch_mode`:
//!
//! - [`InlineDispatcher`] recomputes the parent inside the triggering call.
//! - [`QueuedDispatcher`] hands the recompute to a background Tokio worker
//!   and computes inline whenever the queue cannot take the request.

use std::fmt::Debug;

use crate::errors::Result;

pub mod inline;
pub mod queued;

pub use inline::InlineDispatcher;
pub use queued::{QueuedDispatcher, RollupRequest};

pub trait Dispatcher: Send + Sync + Debug {
    /// Arrange for `parent_id`'s progress to be recomputed from its children.
    ///
    /// Implementations must not drop the request: if deferred execution is
    /// not possible the roll-up runs immediately.
    fn dispatch_rollup(&self, parent_id: &str) -> Result<()>;
}
