// src/sla/registry.rs

use std::sync::Arc;

use tracing::info;

use crate::errors::{Result, SchedError};
use crate::model::Actor;
use crate::sla::model::{JobContext, SlaPolicy};
use crate::sla::resolve::{resolve_rule, ResolvedRule};
use crate::sla::validate::validate_policy;
use crate::store::PolicyStore;

/// Saves and looks up SLA policies through a [`PolicyStore`].
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    store: Arc<dyn PolicyStore>,
}

impl PolicyRegistry {
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a policy. When it is saved enabled and default,
    /// every other policy loses its default flag afterwards.
    pub fn save_policy(&self, mut policy: SlaPolicy, actor: &Actor) -> Result<SlaPolicy> {
        validate_policy(&policy)?;

        policy.modified_by = Some(actor.name().to_string());
        self.store.save_policy(&policy)?;
        info!(policy = %policy.name, actor = actor.name(), "SLA policy saved");

        if policy.claims_default() {
            self.enforce_single_default(&policy)?;
        }

        Ok(policy)
    }

    /// Clear the default flag on every policy except `policy`.
    ///
    /// Last writer wins: two concurrent saves that both claim default leave
    /// whichever ran this step last as the sole default.
    pub fn enforce_single_default(&self, policy: &SlaPolicy) -> Result<Vec<String>> {
        let cleared = self.store.clear_other_defaults(&policy.name)?;
        if !cleared.is_empty() {
            info!(
                policy = %policy.name,
                ?cleared,
                "cleared default flag on other policies"
            );
        }
        Ok(cleared)
    }

    pub fn get_policy(&self, name: &str) -> Result<SlaPolicy> {
        self.store
            .get_policy(name)?
            .ok_or_else(|| SchedError::policy_not_found(name))
    }

    pub fn list_policies(&self) -> Result<Vec<SlaPolicy>> {
        self.store.list_policies()
    }

    /// Resolve the rule governing `ctx` among the stored policies.
    pub fn resolve_rule(&self, ctx: &JobContext) -> Result<Option<ResolvedRule>> {
        let policies = self.store.list_policies()?;
        Ok(resolve_rule(ctx, &policies))
    }
}
