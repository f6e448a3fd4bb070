//! Composite policy.

use std::sync::Arc;
use std::time::Instant;

use crate::domain::{Decision, PolicyError, StorageStatus};
use crate::ports::UploadDecisionPolicy;

/// Uploads when any child policy says so.
///
/// Every child is evaluated on every call, even after one has already said
/// `Upload`, so each child keeps its own timer in step with the driver.
pub struct AnyOfPolicy {
    policies: Vec<Arc<dyn UploadDecisionPolicy>>,
}

impl AnyOfPolicy {
    pub fn new(policies: Vec<Arc<dyn UploadDecisionPolicy>>) -> Result<Self, PolicyError> {
        if policies.is_empty() {
            return Err(PolicyError::invalid("any_of needs at least one policy"));
        }
        Ok(Self { policies })
    }
}

impl UploadDecisionPolicy for AnyOfPolicy {
    fn name(&self) -> &'static str {
        "any_of"
    }

    fn evaluate(&self, status: &StorageStatus, now: Instant) -> Decision {
        self.policies
            .iter()
            .map(|policy| policy.evaluate(status, now))
            .fold(Decision::Noop, |acc, decision| {
                if decision.is_upload() { decision } else { acc }
            })
    }

    fn reset(&self) {
        for policy in &self.policies {
            policy.reset();
        }
    }
}
