//! Scripted collaborator doubles for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{BrowserDriver, ScrollDirection};
use crate::error::AgentError;
use crate::perception::PerceptionService;
use crate::planner::PlanningService;
use crate::types::{
    Action, ActionKind, ActionRecord, ElementDescriptor, FieldDescriptor, PageType,
    PerceptionSnapshot, Task, TaskBreakdown, VerificationResult, VisionAnalysis,
};

/// Driver double that records every interaction as a `kind:args` string.
pub(crate) struct MockDriver {
    calls: Mutex<Vec<String>>,
    current_url: Mutex<String>,
    elements: Vec<ElementDescriptor>,
    error_on_click: bool,
    fail_screenshots: bool,
    screenshot_calls: AtomicU32,
}

impl MockDriver {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            current_url: Mutex::new("about:blank".to_string()),
            elements: Vec::new(),
            error_on_click: false,
            fail_screenshots: false,
            screenshot_calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn with_elements(mut self, elements: Vec<ElementDescriptor>) -> Self {
        self.elements = elements;
        self
    }

    /// Make every click return a driver error instead of a bool.
    pub(crate) fn erroring_clicks(mut self) -> Self {
        self.error_on_click = true;
        self
    }

    pub(crate) fn failing_screenshots(mut self) -> Self {
        self.fail_screenshots = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn screenshot_calls(&self) -> u32 {
        self.screenshot_calls.load(Ordering::SeqCst)
    }

    fn push(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate(&self, url: &str) -> Result<bool, AgentError> {
        self.push(format!("navigate:{url}"));
        *self.current_url.lock().unwrap() = url.to_string();
        Ok(true)
    }

    async fn click(&self, selector: &str) -> Result<bool, AgentError> {
        if self.error_on_click {
            return Err(AgentError::driver("click exploded"));
        }
        self.push(format!("click:{selector}"));
        Ok(true)
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<bool, AgentError> {
        self.push(format!("type:{selector}:{text}"));
        Ok(true)
    }

    async fn scroll(&self, direction: ScrollDirection, amount: i64) -> Result<bool, AgentError> {
        let dir = match direction {
            ScrollDirection::Down => "down",
            ScrollDirection::Up => "up",
        };
        self.push(format!("scroll:{dir}:{amount}"));
        Ok(true)
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<bool, AgentError> {
        self.push(format!("wait:{selector}:{timeout_ms}"));
        Ok(true)
    }

    async fn page_text(&self) -> Result<String, AgentError> {
        Ok("Mock page text".to_string())
    }

    async fn title(&self) -> Result<String, AgentError> {
        Ok("Mock Page".to_string())
    }

    async fn url(&self) -> Result<String, AgentError> {
        Ok(self.current_url.lock().unwrap().clone())
    }

    async fn screenshot_base64(&self) -> Result<String, AgentError> {
        self.screenshot_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_screenshots {
            return Err(AgentError::driver("screenshot failed"));
        }
        Ok("c2NyZWVuc2hvdA==".to_string())
    }

    async fn execute_script(&self, _code: &str) -> Result<Value, AgentError> {
        Ok(Value::Null)
    }

    async fn interactive_elements(&self) -> Result<Vec<ElementDescriptor>, AgentError> {
        Ok(self.elements.clone())
    }
}

/// Perception double returning a fixed snapshot, optionally failing on a
/// chosen call number (1-based) to simulate a step exception.
pub(crate) struct MockPerception {
    snapshot: PerceptionSnapshot,
    text_lookup: Option<String>,
    fail_at_call: Option<u32>,
    page_state_calls: AtomicU32,
}

impl MockPerception {
    pub(crate) fn new() -> Self {
        Self {
            snapshot: PerceptionSnapshot {
                url: "https://example.com".to_string(),
                title: "Mock Page".to_string(),
                page_type: PageType::General,
                visible_text: "Mock page text".to_string(),
                interactive_elements: Vec::new(),
            },
            text_lookup: None,
            fail_at_call: None,
            page_state_calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn with_text_lookup(mut self, selector: &str) -> Self {
        self.text_lookup = Some(selector.to_string());
        self
    }

    pub(crate) fn failing_page_state_at(mut self, call: u32) -> Self {
        self.fail_at_call = Some(call);
        self
    }
}

#[async_trait]
impl PerceptionService for MockPerception {
    async fn page_state(&self) -> Result<PerceptionSnapshot, AgentError> {
        let call = self.page_state_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_at_call == Some(call) {
            return Err(AgentError::perception("snapshot failed"));
        }
        Ok(self.snapshot.clone())
    }

    async fn find_element_by_text(&self, _text: &str) -> Result<Option<String>, AgentError> {
        Ok(self.text_lookup.clone())
    }

    async fn form_fields(&self) -> Result<Vec<FieldDescriptor>, AgentError> {
        Ok(vec![FieldDescriptor {
            tag: "input".to_string(),
            field_type: "text".to_string(),
            name: "q".to_string(),
            ..Default::default()
        }])
    }
}

/// Planner double driven by queues of scripted responses. When a queue
/// runs dry the configured default is repeated.
pub(crate) struct ScriptedPlanner {
    actions: Mutex<VecDeque<Action>>,
    default_action: Action,
    verifications: Mutex<VecDeque<VerificationResult>>,
    default_verification: VerificationResult,
    plan_calls: AtomicU32,
    verify_calls: AtomicU32,
    vision_calls: AtomicU32,
}

impl ScriptedPlanner {
    pub(crate) fn new() -> Self {
        Self {
            actions: Mutex::new(VecDeque::new()),
            default_action: Action::new(ActionKind::Wait),
            verifications: Mutex::new(VecDeque::new()),
            default_verification: VerificationResult {
                completed: false,
                confidence: 0.0,
                reasoning: "not done".to_string(),
            },
            plan_calls: AtomicU32::new(0),
            verify_calls: AtomicU32::new(0),
            vision_calls: AtomicU32::new(0),
        }
    }

    /// Queue actions returned in order by `plan_next_action`.
    pub(crate) fn with_actions(self, actions: Vec<Action>) -> Self {
        *self.actions.lock().unwrap() = actions.into();
        self
    }

    /// Action repeated once the queue is empty (default: `wait`).
    pub(crate) fn with_default_action(mut self, action: Action) -> Self {
        self.default_action = action;
        self
    }

    /// Queue verification results returned in order.
    pub(crate) fn with_verifications(self, verifications: Vec<VerificationResult>) -> Self {
        *self.verifications.lock().unwrap() = verifications.into();
        self
    }

    pub(crate) fn with_default_verification(mut self, verification: VerificationResult) -> Self {
        self.default_verification = verification;
        self
    }

    pub(crate) fn plan_calls(&self) -> u32 {
        self.plan_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn verify_calls(&self) -> u32 {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn vision_calls(&self) -> u32 {
        self.vision_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanningService for ScriptedPlanner {
    async fn understand_task(&self, input: &str) -> Result<TaskBreakdown, AgentError> {
        Ok(TaskBreakdown {
            goal: input.to_string(),
            ..Default::default()
        })
    }

    async fn plan_next_action(
        &self,
        _task: &Task,
        _snapshot: &PerceptionSnapshot,
        _history: &[ActionRecord],
    ) -> Result<Action, AgentError> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.actions.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.default_action.clone()))
    }

    async fn verify_completion(
        &self,
        _task: &Task,
        _snapshot: &PerceptionSnapshot,
        _history: &[ActionRecord],
    ) -> Result<VerificationResult, AgentError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.verifications.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.default_verification.clone()))
    }

    async fn analyze_with_vision(
        &self,
        _screenshot_b64: &str,
        _task: &Task,
    ) -> Result<VisionAnalysis, AgentError> {
        self.vision_calls.fetch_add(1, Ordering::SeqCst);
        Ok(VisionAnalysis {
            analysis: "mock vision analysis".to_string(),
            suggestions: Vec::new(),
        })
    }
}
