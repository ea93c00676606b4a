// src/graph/mod.rs

//! Dependency Graph Engine.
//!
//! - [`dependency`] holds the predecessor relation and reference validation.
//! - [`transition`] gates status changes on predecessors and applies the
//!   status-derived side effects.
//! - [`rollup`] recomputes a parent's progress from its children.

pub mod dependency;
pub mod rollup;
pub mod transition;

pub use dependency::{validate_references, DependencyGraph};
pub use rollup::{mean_progress, rollup_progress, round2, RollupUpdate};
pub use transition::{
    apply_transition, check_transition_legal, gate, unsatisfied_predecessors, validate_item,
    MAX_EFFORT_MINUTES,
};
