//! Perception trait seam: structured page-state extraction.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::types::{FieldDescriptor, PerceptionSnapshot};

/// Turns raw page content into the structured snapshot the planner
/// consumes. Snapshots are always fresh; implementations must not cache
/// across steps.
#[async_trait]
pub trait PerceptionService: Send + Sync {
    /// Comprehensive state of the current page.
    async fn page_state(&self) -> Result<PerceptionSnapshot, AgentError>;

    /// Resolve a CSS selector for an element whose text matches, if any.
    async fn find_element_by_text(&self, text: &str) -> Result<Option<String>, AgentError>;

    /// All form fields on the current page.
    async fn form_fields(&self) -> Result<Vec<FieldDescriptor>, AgentError>;
}
