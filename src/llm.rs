//! Planning service backed by an OpenAI-compatible chat completions API.
//!
//! Model output is free text; every parse here follows the
//! parse-with-fallback contract: malformed output degrades to a safe
//! default instead of an error, so a confused model can never crash the
//! loop.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::planner::PlanningService;
use crate::types::{
    Action, ActionRecord, PerceptionSnapshot, Task, TaskBreakdown, VerificationResult,
    VisionAnalysis,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const PLAN_PROMPT: &str = r#"You are a browser automation agent. Based on the current page state and task, decide the next action to take.

Available actions:
- navigate: Go to a URL (params: url)
- click: Click an element (params: selector or text)
- type: Type text into a field (params: selector, text)
- scroll: Scroll the page (params: direction, amount)
- wait: Wait for an element (params: selector, timeout)
- extract: Extract data from page (params: data_type)
- complete: Task is complete (params: result)

Respond with ONLY a JSON object with keys: action, params, reasoning"#;

/// LLM-backed planner.
pub struct LlmPlanner {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl LlmPlanner {
    /// Build from environment: `OPENAI_API_KEY` (required),
    /// `OPENAI_BASE_URL` and `OPENAI_MODEL` (optional).
    pub fn from_env() -> Result<Self, AgentError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AgentError::init("OPENAI_API_KEY not set in environment"))?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url,
            model,
        })
    }

    async fn chat(&self, messages: Vec<Value>) -> Result<String, AgentError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "temperature": 0.2,
            }))
            .send()
            .await
            .map_err(|e| AgentError::planner(format!("request failed: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::planner(format!("bad response body: {e}")))?;

        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown error");
            return Err(AgentError::planner(format!("API error ({status}): {message}")));
        }

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| AgentError::planner("no content in model response"))
    }
}

#[async_trait]
impl PlanningService for LlmPlanner {
    async fn understand_task(&self, input: &str) -> Result<TaskBreakdown, AgentError> {
        let prompt = format!(
            "You are an AI assistant that helps break down browser automation tasks.\n\
             Given a user's request, extract the main goal, the target website (if \
             mentioned), key steps needed, and any data to extract.\n\n\
             User request: {input}\n\n\
             Respond with ONLY a JSON object with keys: goal, website, steps (array), \
             data_to_extract (array)."
        );
        let content = self
            .chat(vec![json!({"role": "user", "content": prompt})])
            .await?;
        Ok(parse_breakdown(&content, input))
    }

    async fn plan_next_action(
        &self,
        task: &Task,
        snapshot: &PerceptionSnapshot,
        history: &[ActionRecord],
    ) -> Result<Action, AgentError> {
        let context = build_context(task, snapshot, history);
        let content = self
            .chat(vec![json!({
                "role": "user",
                "content": format!("{PLAN_PROMPT}\n\n{context}"),
            })])
            .await?;
        debug!(response = %content, "planner response");
        Ok(parse_action(&content))
    }

    async fn verify_completion(
        &self,
        task: &Task,
        snapshot: &PerceptionSnapshot,
        history: &[ActionRecord],
    ) -> Result<VerificationResult, AgentError> {
        let visible: String = snapshot.visible_text.chars().take(300).collect();
        let prompt = format!(
            "Task: {}\n\nCurrent Page:\n- URL: {}\n- Title: {}\n- Visible Text: {}\n\n\
             Actions Taken: {} actions\n\n\
             Has the task been completed successfully? Respond with ONLY a JSON object \
             with keys: completed (boolean), confidence (0-1), reasoning",
            task.goal,
            snapshot.url,
            snapshot.title,
            visible,
            history.len(),
        );
        let content = self
            .chat(vec![json!({"role": "user", "content": prompt})])
            .await?;
        Ok(parse_verification(&content))
    }

    async fn analyze_with_vision(
        &self,
        screenshot_b64: &str,
        task: &Task,
    ) -> Result<VisionAnalysis, AgentError> {
        let prompt = format!(
            "I'm trying to: {}\n\nWhat do you see on this page? What elements are \
             visible? What should I interact with next?",
            task.goal
        );
        let analysis = self
            .chat(vec![json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": prompt},
                    {"type": "image_url", "image_url": {
                        "url": format!("data:image/png;base64,{screenshot_b64}"),
                    }},
                ],
            })])
            .await?;

        let suggestions = extract_suggestions(&analysis);
        Ok(VisionAnalysis {
            analysis,
            suggestions,
        })
    }
}

/// Strip markdown code fences the model may wrap JSON in.
fn strip_code_fences(content: &str) -> &str {
    content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn parse_action(content: &str) -> Action {
    let cleaned = strip_code_fences(content);
    match serde_json::from_str(cleaned) {
        Ok(action) => action,
        Err(err) => {
            warn!(error = %err, response = %cleaned, "could not parse planner action");
            Action::complete_with("Unable to parse action")
        }
    }
}

fn parse_breakdown(content: &str, input: &str) -> TaskBreakdown {
    let cleaned = strip_code_fences(content);
    serde_json::from_str(cleaned).unwrap_or_else(|err| {
        warn!(error = %err, "could not parse task breakdown");
        TaskBreakdown {
            goal: input.to_string(),
            website: None,
            steps: vec![input.to_string()],
            data_to_extract: Vec::new(),
        }
    })
}

fn parse_verification(content: &str) -> VerificationResult {
    let cleaned = strip_code_fences(content);
    serde_json::from_str(cleaned).unwrap_or_else(|err| {
        warn!(error = %err, "could not parse verification");
        VerificationResult {
            completed: false,
            confidence: 0.5,
            reasoning: "Unable to verify completion".to_string(),
        }
    })
}

/// Context block shared by planning prompts: page summary, top elements
/// and the most recent actions.
fn build_context(task: &Task, snapshot: &PerceptionSnapshot, history: &[ActionRecord]) -> String {
    let mut out = format!(
        "Task: {}\n\nCurrent URL: {}\nPage Title: {}\nPage Type: {:?}",
        task.goal, snapshot.url, snapshot.title, snapshot.page_type
    );

    if !snapshot.visible_text.is_empty() {
        let visible: String = snapshot.visible_text.chars().take(500).collect();
        out.push_str(&format!("\n\nVisible Text (summary): {visible}"));
    }

    if !snapshot.interactive_elements.is_empty() {
        out.push_str("\n\nInteractive Elements:\n");
        for (idx, elem) in snapshot.interactive_elements.iter().take(20).enumerate() {
            out.push_str(&format!("- [{idx}] {}\n", elem.summary()));
        }
    }

    if !history.is_empty() {
        out.push_str("\n\nPrevious Actions:\n");
        let start = history.len().saturating_sub(5);
        for (i, record) in history[start..].iter().enumerate() {
            out.push_str(&format!(
                "{}. {:?} - {} ({})\n",
                i + 1,
                record.action.kind,
                record.result.message,
                if record.result.success { "ok" } else { "failed" },
            ));
        }
    }

    out
}

fn extract_suggestions(analysis: &str) -> Vec<String> {
    let lower = analysis.to_lowercase();
    let mut suggestions = Vec::new();
    if lower.contains("click") {
        suggestions.push("click".to_string());
    }
    if lower.contains("type") || lower.contains("enter") {
        suggestions.push("type".to_string());
    }
    if lower.contains("scroll") {
        suggestions.push("scroll".to_string());
    }
    suggestions
}
