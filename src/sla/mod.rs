// src/sla/mod.rs

//! SLA Policy Engine.
//!
//! - [`model`]: policies, rules and the job context used for lookup.
//! - [`validate`]: save-time validation of policies and rules.
//! - [`resolve`]: picks the rule that governs a job.
//! - [`registry`]: persistence through a `PolicyStore`, including the
//!   single-default rule.
//! - [`assess`]: classifies elapsed time against a rule's target.

pub mod assess;
pub mod model;
pub mod registry;
pub mod resolve;
pub mod validate;

pub use assess::{assess, SlaAssessment};
pub use model::{JobContext, SlaPolicy, SlaPolicyRule};
pub use registry::PolicyRegistry;
pub use resolve::{resolve_rule, ResolvedRule};
pub use validate::{rule_key, validate_policy, validate_rule, validate_single_default};
