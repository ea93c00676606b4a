// src/engine/mod.rs

//! Orchestration engine for shopsched.
//!
//! This module ties together:
//! - the mutation pipeline for work items ([`service`])
//! - the batch snapshot refresh ([`reconcile`])
//! - the timer-driven runtime that runs reconciliation periodically
//!   ([`runtime`])
//!
//! The semantics live in [`service`] and [`reconcile`]; [`runtime`] is the
//! async shell around them.

pub mod reconcile;
pub mod runtime;
pub mod service;

pub use reconcile::{ReconciliationReport, Reconciler};
pub use runtime::{ReconcileRuntime, RuntimeEvent, RuntimeOptions, RuntimeSummary};
pub use service::WorkItemService;
