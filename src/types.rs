//! Core data model shared by the orchestrator, executor and collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A task the agent should accomplish, expressed in natural language.
/// Immutable once the step loop starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub goal: String,
}

impl Task {
    pub fn new(goal: impl Into<String>) -> Self {
        Self { goal: goal.into() }
    }
}

/// Structured breakdown of a task produced by the planner before the loop.
/// Informational: it is logged, not consumed by the loop itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskBreakdown {
    pub goal: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub data_to_extract: Vec<String>,
}

/// A single action proposed by the planner.
///
/// The kind is a closed enum; parameters are a typed record of optional
/// fields so that a malformed proposal (e.g. `navigate` without a `url`)
/// is representable and rejected by the validator instead of blowing up
/// during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "action")]
    pub kind: ActionKind,
    #[serde(default)]
    pub params: ActionParams,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            params: ActionParams::default(),
        }
    }

    /// The safe fallback the planner adapter emits when model output
    /// cannot be parsed into a real action.
    pub fn complete_with(result: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Complete,
            params: ActionParams {
                result: Some(result.into()),
                ..Default::default()
            },
        }
    }
}

/// The six action kinds the planner may propose, plus `complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Navigate,
    Click,
    Type,
    Scroll,
    Wait,
    Extract,
    Complete,
}

/// Optional parameters attached to an action. Which fields are required
/// depends on the kind; see the validator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Scroll direction; anything other than "down" scrolls up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    /// Scroll amount in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Wait timeout in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Extraction target: text, title, url, forms or anything else for
    /// the full snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Completion summary for the `complete` action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// Uniform outcome of dispatching one action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Set only by the `complete` action; the sole in-loop signal that
    /// ends the task successfully.
    #[serde(default)]
    pub complete: bool,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            complete: false,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            complete: false,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// One dispatched action and its result, as stored in the history.
/// Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Loop step index (1-based) at which the action was dispatched.
    pub step: u32,
    pub action: Action,
    pub result: ActionResult,
    pub timestamp: DateTime<Utc>,
}

/// Structured summary of the current page, re-fetched every step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptionSnapshot {
    pub url: String,
    pub title: String,
    pub page_type: PageType,
    pub visible_text: String,
    pub interactive_elements: Vec<ElementDescriptor>,
}

/// Coarse page classification from keyword heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Login,
    Search,
    Checkout,
    Form,
    General,
}

/// Simplified interactive element as reported by the driver and filtered
/// by perception.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub tag: String,
    #[serde(default, rename = "type")]
    pub elem_type: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "class")]
    pub css_class: String,
    #[serde(default)]
    pub visible: bool,
}

impl ElementDescriptor {
    /// Human-readable one-line summary for planner prompts.
    pub fn summary(&self) -> String {
        let mut parts = vec![self.tag.clone()];
        if !self.id.is_empty() {
            parts.push(format!("#{}", self.id));
        }
        let text = self.text.chars().take(30).collect::<String>();
        let text = text.trim();
        if !text.is_empty() {
            parts.push(format!("\"{text}\""));
        }
        if !self.placeholder.is_empty() {
            let ph = self.placeholder.chars().take(30).collect::<String>();
            parts.push(format!("placeholder=\"{ph}\""));
        }
        parts.join(" ")
    }
}

/// A single form field extracted from the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub tag: String,
    #[serde(default, rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value: String,
}

/// The planner's judgment on whether the task is done.
/// `confidence` is nominally in [0, 1] but is used as-is, unclamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub completed: bool,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

/// Output of the auxiliary vision-analysis call. Logged, never fed back
/// into the same step's action choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisionAnalysis {
    pub analysis: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Final outcome of one task execution, produced once at loop exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task: Task,
    pub completed: bool,
    pub steps_taken: u32,
    pub actions: Vec<ActionRecord>,
    pub final_url: String,
    pub verification: VerificationResult,
}
