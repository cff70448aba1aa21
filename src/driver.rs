//! Browser driver trait seam.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentError;
use crate::types::ElementDescriptor;

/// Scroll direction as understood by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Abstraction over the browser so the loop never depends on a concrete
/// automation backend.
///
/// Interaction methods (`navigate`, `click`, `type_text`, `scroll`,
/// `wait_for_selector`) report failure as `Ok(false)`; an `Err` from them
/// means the driver itself broke, not that the page refused the
/// interaction. Read methods return `Err` when the page state cannot be
/// obtained.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<bool, AgentError>;

    async fn click(&self, selector: &str) -> Result<bool, AgentError>;

    async fn type_text(&self, selector: &str, text: &str) -> Result<bool, AgentError>;

    async fn scroll(&self, direction: ScrollDirection, amount: i64) -> Result<bool, AgentError>;

    /// Wait for `selector` to appear, up to `timeout_ms`.
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<bool, AgentError>;

    /// All visible text on the page.
    async fn page_text(&self) -> Result<String, AgentError>;

    async fn title(&self) -> Result<String, AgentError>;

    async fn url(&self) -> Result<String, AgentError>;

    /// PNG screenshot of the viewport, base64-encoded.
    async fn screenshot_base64(&self) -> Result<String, AgentError>;

    /// Evaluate JavaScript in the page and return its JSON value.
    async fn execute_script(&self, code: &str) -> Result<Value, AgentError>;

    /// Enumerate interactive elements (links, buttons, inputs, ...).
    async fn interactive_elements(&self) -> Result<Vec<ElementDescriptor>, AgentError>;
}
