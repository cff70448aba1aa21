//! Completion verification, delegating to the planning collaborator.

use std::sync::Arc;

use tracing::debug;

use crate::error::AgentError;
use crate::planner::PlanningService;
use crate::types::{ActionRecord, PerceptionSnapshot, Task, VerificationResult};

/// Thin pass-through to the planner's verification call.
///
/// The confidence threshold comparison is deliberately applied by the
/// caller, so the same verifier serves both the mid-loop check (which may
/// short-circuit the loop) and the mandatory final check (which only
/// informs the task result).
pub struct CompletionVerifier {
    planner: Arc<dyn PlanningService>,
}

impl CompletionVerifier {
    pub fn new(planner: Arc<dyn PlanningService>) -> Self {
        Self { planner }
    }

    pub async fn verify(
        &self,
        task: &Task,
        snapshot: &PerceptionSnapshot,
        history: &[ActionRecord],
    ) -> Result<VerificationResult, AgentError> {
        let verification = self.planner.verify_completion(task, snapshot, history).await?;
        debug!(
            completed = verification.completed,
            confidence = verification.confidence,
            "completion verification"
        );
        Ok(verification)
    }
}
