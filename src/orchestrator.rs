//! Task orchestration: the bounded observe-plan-act-verify loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::driver::BrowserDriver;
use crate::error::AgentError;
use crate::executor::ActionExecutor;
use crate::history::ActionHistory;
use crate::perception::PerceptionService;
use crate::planner::PlanningService;
use crate::types::{Task, TaskResult};
use crate::validator;
use crate::verifier::CompletionVerifier;

/// Delay between consecutive steps.
const STEP_DELAY: Duration = Duration::from_secs(1);

/// Classification of one step of the loop.
///
/// `Ok` and `ExecutionFailed` both leave a history record; a failed
/// execution is contained inside the recorded result and the loop
/// continues. `ValidationFailed` consumes budget without a record. The
/// unexpected class (a collaborator error mid-step) is not a variant: it
/// surfaces as `Err(AgentError)` from the step and is swallowed by the
/// loop at step granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Action dispatched successfully and recorded.
    Ok,
    /// Action dispatched, recorded, but reported failure.
    ExecutionFailed,
    /// Planner proposed an action missing required parameters; skipped.
    ValidationFailed,
    /// The task finished this step, via a `complete` action or an
    /// accepted mid-loop verification.
    Completed,
}

/// Drives one task to completion or step-budget exhaustion.
///
/// The browser session behind `driver` is owned by the caller and must
/// outlive the loop; the orchestrator never closes it.
pub struct TaskOrchestrator {
    config: AgentConfig,
    driver: Arc<dyn BrowserDriver>,
    perception: Arc<dyn PerceptionService>,
    planner: Arc<dyn PlanningService>,
    executor: ActionExecutor,
    verifier: CompletionVerifier,
}

impl TaskOrchestrator {
    pub fn new(
        config: AgentConfig,
        driver: Arc<dyn BrowserDriver>,
        perception: Arc<dyn PerceptionService>,
        planner: Arc<dyn PlanningService>,
    ) -> Self {
        let executor = ActionExecutor::new(driver.clone(), perception.clone());
        let verifier = CompletionVerifier::new(planner.clone());
        Self {
            config,
            driver,
            perception,
            planner,
            executor,
            verifier,
        }
    }

    /// Execute one task and produce its result.
    ///
    /// Errors before the loop starts (task breakdown) and during the
    /// mandatory final verification propagate; errors inside a step are
    /// contained at step granularity.
    pub async fn run(&self, task: Task) -> Result<TaskResult, AgentError> {
        info!(goal = %task.goal, "starting task");

        let breakdown = self.planner.understand_task(&task.goal).await?;
        info!(goal = %breakdown.goal, steps = breakdown.steps.len(), "task breakdown");

        let mut history = ActionHistory::new();
        let mut loop_completed = false;
        let mut steps_taken = 0;

        for step in 1..=self.config.max_steps {
            steps_taken = step;
            debug!(step, max_steps = self.config.max_steps, "step");

            match self.run_step(step, &task, &mut history).await {
                Ok(StepOutcome::Completed) => {
                    loop_completed = true;
                    break;
                }
                Ok(StepOutcome::ValidationFailed) => {
                    // Budget consumed, nothing recorded, no delay.
                }
                Ok(_) => sleep(STEP_DELAY).await,
                Err(err) => {
                    warn!(step, error = %err, "step failed unexpectedly");
                    if self.config.screenshot_on_error {
                        self.capture_error_screenshot(step).await;
                    }
                }
            }
        }

        // Final verification runs whether the loop completed or exhausted
        // its budget.
        let final_snapshot = self.perception.page_state().await?;
        let verification = self
            .verifier
            .verify(&task, &final_snapshot, history.records())
            .await?;
        let final_url = self.driver.url().await?;

        let completed = loop_completed || verification.completed;
        info!(completed, steps_taken, "task execution finished");

        Ok(TaskResult {
            task,
            completed,
            steps_taken,
            actions: history.into_records(),
            final_url,
            verification,
        })
    }

    /// One full step: observe, optionally sample vision, plan, validate,
    /// execute, record, check completion.
    async fn run_step(
        &self,
        step: u32,
        task: &Task,
        history: &mut ActionHistory,
    ) -> Result<StepOutcome, AgentError> {
        let snapshot = self.perception.page_state().await?;

        if self.config.use_vision
            && self.config.vision_interval > 0
            && step % self.config.vision_interval == 0
        {
            let screenshot = self.driver.screenshot_base64().await?;
            let analysis = self.planner.analyze_with_vision(&screenshot, task).await?;
            info!(step, analysis = %truncated(&analysis.analysis, 200), "vision analysis");
        }

        let action = self
            .planner
            .plan_next_action(task, &snapshot, history.records())
            .await?;

        if !validator::validate(&action) {
            warn!(step, kind = ?action.kind, "skipping invalid action");
            return Ok(StepOutcome::ValidationFailed);
        }

        let result = self.executor.execute(&action).await;
        let success = result.success;
        let complete = result.complete;
        history.record(step, action, result);

        if complete {
            info!(step, "task marked complete by action");
            return Ok(StepOutcome::Completed);
        }

        if self.config.verification_interval > 0
            && step % self.config.verification_interval == 0
        {
            let verification = self
                .verifier
                .verify(task, &snapshot, history.records())
                .await?;
            if verification.completed && verification.confidence > self.config.confidence_threshold
            {
                info!(
                    step,
                    confidence = verification.confidence,
                    "task verified complete"
                );
                return Ok(StepOutcome::Completed);
            }
        }

        Ok(if success {
            StepOutcome::Ok
        } else {
            StepOutcome::ExecutionFailed
        })
    }

    /// Best-effort diagnostic capture; its own failure must not escape.
    async fn capture_error_screenshot(&self, step: u32) {
        match self.driver.screenshot_base64().await {
            Ok(_) => debug!(step, "captured error screenshot"),
            Err(err) => debug!(step, error = %err, "error screenshot failed"),
        }
    }
}

fn truncated(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
