use thiserror::Error;

/// Errors surfaced by collaborators and the orchestrator.
///
/// Executor-level failures never reach this type: the executor converts
/// them into `ActionResult { success: false, .. }`. An `AgentError`
/// escaping a step is the "unexpected" class and is contained by the
/// orchestrator at step granularity; one escaping before the loop starts
/// is fatal.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A browser driver call failed.
    #[error("browser driver error: {0}")]
    Driver(String),

    /// Page-state extraction failed.
    #[error("perception error: {0}")]
    Perception(String),

    /// The planning service failed or returned an unusable response.
    #[error("planner error: {0}")]
    Planner(String),

    /// Collaborator construction failed (missing credential, browser
    /// launch failure). Always fatal.
    #[error("initialization failed: {0}")]
    Init(String),
}

impl AgentError {
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver(message.into())
    }

    pub fn perception(message: impl Into<String>) -> Self {
        Self::Perception(message.into())
    }

    pub fn planner(message: impl Into<String>) -> Self {
        Self::Planner(message.into())
    }

    pub fn init(message: impl Into<String>) -> Self {
        Self::Init(message.into())
    }
}
