//! AI browser automation agent.
//!
//! The agent accomplishes a natural-language task in a real browser by
//! looping: observe the page, ask the planner for the next action,
//! validate and execute it, and periodically verify completion, all
//! under a fixed step budget.
//!
//! The loop ([`TaskOrchestrator`]) only speaks to trait seams:
//! [`BrowserDriver`], [`PerceptionService`] and [`PlanningService`].
//! Concrete adapters live in [`chrome`], [`page`] and [`llm`].

pub mod chrome;
pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod history;
pub mod llm;
#[cfg(test)]
pub(crate) mod mock;
pub mod orchestrator;
pub mod page;
pub mod perception;
pub mod planner;
pub mod types;
pub mod validator;
pub mod verifier;

pub use config::AgentConfig;
pub use driver::BrowserDriver;
pub use error::AgentError;
pub use orchestrator::TaskOrchestrator;
pub use perception::PerceptionService;
pub use planner::PlanningService;
pub use types::{Action, ActionKind, ActionResult, Task, TaskResult};
