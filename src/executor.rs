//! Action execution: maps a validated action to a collaborator call and
//! returns a uniform result.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::driver::{BrowserDriver, ScrollDirection};
use crate::error::AgentError;
use crate::perception::PerceptionService;
use crate::types::{Action, ActionKind, ActionParams, ActionResult};

/// Settle delay after navigation, letting the page stabilize.
const NAVIGATE_SETTLE: Duration = Duration::from_secs(2);
/// Settle delay after a click or scroll.
const INTERACT_SETTLE: Duration = Duration::from_secs(1);
/// Default fixed wait when the `wait` action has no selector, in ms.
const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;
/// Default scroll amount in pixels.
const DEFAULT_SCROLL_AMOUNT: i64 = 500;

/// Executes actions against the browser. Never returns an error: any
/// collaborator failure is converted into a failed `ActionResult`.
pub struct ActionExecutor {
    driver: Arc<dyn BrowserDriver>,
    perception: Arc<dyn PerceptionService>,
}

impl ActionExecutor {
    pub fn new(driver: Arc<dyn BrowserDriver>, perception: Arc<dyn PerceptionService>) -> Self {
        Self { driver, perception }
    }

    /// Dispatch one action and report its outcome.
    pub async fn execute(&self, action: &Action) -> ActionResult {
        debug!(kind = ?action.kind, "executing action");

        match self.try_execute(action).await {
            Ok(result) => result,
            Err(err) => {
                warn!(kind = ?action.kind, error = %err, "action execution failed");
                ActionResult::fail(format!("Execution error: {err}"))
            }
        }
    }

    async fn try_execute(&self, action: &Action) -> Result<ActionResult, AgentError> {
        let params = &action.params;
        match action.kind {
            ActionKind::Navigate => self.navigate(params).await,
            ActionKind::Click => self.click(params).await,
            ActionKind::Type => self.type_text(params).await,
            ActionKind::Scroll => self.scroll(params).await,
            ActionKind::Wait => self.wait(params).await,
            ActionKind::Extract => self.extract(params).await,
            ActionKind::Complete => Ok(complete(params)),
        }
    }

    async fn navigate(&self, params: &ActionParams) -> Result<ActionResult, AgentError> {
        let url = match params.url.as_deref() {
            Some(url) if !url.is_empty() => normalize_url(url),
            _ => return Ok(ActionResult::fail("No URL provided")),
        };

        let success = self.driver.navigate(&url).await?;
        sleep(NAVIGATE_SETTLE).await;

        // Report where the browser actually ended up, to capture redirects.
        let landed = self.driver.url().await?;
        let message = if success {
            format!("Navigated to {url}")
        } else {
            "Navigation failed".to_string()
        };
        Ok(ActionResult {
            success,
            message,
            data: Some(json!({ "url": landed })),
            complete: false,
        })
    }

    async fn click(&self, params: &ActionParams) -> Result<ActionResult, AgentError> {
        // Empty strings count as absent.
        let explicit = params.selector.as_deref().filter(|s| !s.is_empty());
        let text = params.text.as_deref().filter(|t| !t.is_empty());
        let selector = match (explicit, text) {
            (Some(selector), _) => selector.to_string(),
            (None, Some(text)) => match self.perception.find_element_by_text(text).await? {
                Some(selector) => selector,
                None => {
                    return Ok(ActionResult::fail(format!(
                        "Could not find element with text: {text}"
                    )));
                }
            },
            (None, None) => return Ok(ActionResult::fail("No selector or text provided")),
        };

        let success = self.driver.click(&selector).await?;
        sleep(INTERACT_SETTLE).await;

        Ok(if success {
            ActionResult::ok(format!("Clicked {selector}"))
        } else {
            ActionResult::fail("Click failed")
        })
    }

    async fn type_text(&self, params: &ActionParams) -> Result<ActionResult, AgentError> {
        // An empty selector is as useless as a missing one; empty text is
        // a valid value (clears the field).
        let (selector, text) = match (params.selector.as_deref(), params.text.as_deref()) {
            (Some(selector), Some(text)) if !selector.is_empty() => (selector, text),
            _ => return Ok(ActionResult::fail("Selector and text required")),
        };

        let success = self.driver.type_text(selector, text).await?;
        Ok(if success {
            ActionResult::ok(format!("Typed into {selector}"))
        } else {
            ActionResult::fail("Typing failed")
        })
    }

    async fn scroll(&self, params: &ActionParams) -> Result<ActionResult, AgentError> {
        let direction = params.direction.as_deref().unwrap_or("down");
        let amount = params.amount.unwrap_or(DEFAULT_SCROLL_AMOUNT);
        let dir = if direction == "down" {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        };

        let success = self.driver.scroll(dir, amount).await?;
        sleep(INTERACT_SETTLE).await;

        Ok(if success {
            ActionResult::ok(format!("Scrolled {direction}"))
        } else {
            ActionResult::fail("Scroll failed")
        })
    }

    async fn wait(&self, params: &ActionParams) -> Result<ActionResult, AgentError> {
        let timeout = params.timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT_MS);

        let Some(selector) = params.selector.as_deref() else {
            sleep(Duration::from_millis(timeout)).await;
            return Ok(ActionResult::ok(format!("Waited {timeout}ms")));
        };

        let success = self.driver.wait_for_selector(selector, timeout).await?;
        Ok(if success {
            ActionResult::ok(format!("Element appeared: {selector}"))
        } else {
            ActionResult::fail("Wait timeout")
        })
    }

    /// Extraction is informational, not task-mutating, so it always
    /// reports success.
    async fn extract(&self, params: &ActionParams) -> Result<ActionResult, AgentError> {
        let data_type = params.data_type.as_deref().unwrap_or("text");

        let data = match data_type {
            "text" => json!(self.driver.page_text().await?),
            "title" => json!(self.driver.title().await?),
            "url" => json!(self.driver.url().await?),
            "forms" => json!(self.perception.form_fields().await?),
            _ => json!(self.perception.page_state().await?),
        };

        Ok(ActionResult::ok(format!("Extracted {data_type}")).with_data(data))
    }
}

fn complete(params: &ActionParams) -> ActionResult {
    let result = params.result.as_deref().unwrap_or("Task completed");
    ActionResult {
        success: true,
        message: "Task marked as complete".to_string(),
        data: Some(json!({ "result": result })),
        complete: true,
    }
}

/// Prepend `https://` to scheme-less URLs.
fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}
