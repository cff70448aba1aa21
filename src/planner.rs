//! Planning service trait seam.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::types::{
    Action, ActionRecord, PerceptionSnapshot, Task, TaskBreakdown, VerificationResult,
    VisionAnalysis,
};

/// The planning/language-model collaborator: proposes actions and judges
/// completion. The loop consumes this trait only; prompting and response
/// parsing live in the adapter.
#[async_trait]
pub trait PlanningService: Send + Sync {
    /// Break a raw task description into a structured summary. Called
    /// once before the loop; the result is informational.
    async fn understand_task(&self, input: &str) -> Result<TaskBreakdown, AgentError>;

    /// Propose the next action given the task, the current snapshot and
    /// everything done so far.
    async fn plan_next_action(
        &self,
        task: &Task,
        snapshot: &PerceptionSnapshot,
        history: &[ActionRecord],
    ) -> Result<Action, AgentError>;

    /// Judge whether the task is complete. The caller applies the
    /// confidence threshold.
    async fn verify_completion(
        &self,
        task: &Task,
        snapshot: &PerceptionSnapshot,
        history: &[ActionRecord],
    ) -> Result<VerificationResult, AgentError>;

    /// Auxiliary visual analysis of a screenshot. Informational only.
    async fn analyze_with_vision(
        &self,
        screenshot_b64: &str,
        task: &Task,
    ) -> Result<VisionAnalysis, AgentError>;
}
