//! Page-state perception over the browser driver: text summary, element
//! simplification, page-type heuristics and form scraping.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::driver::BrowserDriver;
use crate::error::AgentError;
use crate::perception::PerceptionService;
use crate::types::{ElementDescriptor, FieldDescriptor, PageType, PerceptionSnapshot};

/// Cap on the visible-text summary, to avoid overwhelming the planner.
const VISIBLE_TEXT_MAX_CHARS: usize = 2000;
/// Cap on the number of interactive elements in a snapshot.
const MAX_ELEMENTS: usize = 50;

/// JS that scrapes form fields as a JSON string.
const FORM_FIELDS_JS: &str = r#"
JSON.stringify((() => {
  const fields = [];
  document.querySelectorAll('input, textarea, select').forEach(input => {
    fields.push({
      tag: input.tagName.toLowerCase(),
      type: input.type || '',
      name: input.name || '',
      id: input.id || '',
      placeholder: input.placeholder || '',
      required: input.required || false,
      value: input.value || ''
    });
  });
  return fields;
})())
"#;

/// Perception implementation reading through the driver seam.
pub struct PagePerception {
    driver: Arc<dyn BrowserDriver>,
}

impl PagePerception {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl PerceptionService for PagePerception {
    async fn page_state(&self) -> Result<PerceptionSnapshot, AgentError> {
        let url = self.driver.url().await?;
        let title = self.driver.title().await?;
        let text = self.driver.page_text().await?;
        let visible_text = summarize_text(&text, VISIBLE_TEXT_MAX_CHARS);
        let page_type = detect_page_type(&visible_text, &title);

        let interactive_elements: Vec<ElementDescriptor> = self
            .driver
            .interactive_elements()
            .await?
            .into_iter()
            .filter(|e| e.visible)
            .take(MAX_ELEMENTS)
            .collect();

        Ok(PerceptionSnapshot {
            url,
            title,
            page_type,
            visible_text,
            interactive_elements,
        })
    }

    async fn find_element_by_text(&self, text: &str) -> Result<Option<String>, AgentError> {
        let needle = text.to_lowercase();
        for elem in self.driver.interactive_elements().await? {
            if elem.text.to_lowercase().contains(&needle) {
                if elem.id.is_empty() {
                    debug!(text, tag = %elem.tag, "matched element has no id, cannot build selector");
                    continue;
                }
                return Ok(Some(format!("#{}", elem.id)));
            }
        }
        Ok(None)
    }

    async fn form_fields(&self) -> Result<Vec<FieldDescriptor>, AgentError> {
        let value = self.driver.execute_script(FORM_FIELDS_JS).await?;
        let fields = match value {
            Value::String(json) => serde_json::from_str(&json)
                .map_err(|e| AgentError::perception(format!("bad form payload: {e}")))?,
            Value::Array(_) => serde_json::from_value(value)
                .map_err(|e| AgentError::perception(format!("bad form payload: {e}")))?,
            _ => Vec::new(),
        };
        Ok(fields)
    }
}

/// Collapse whitespace and truncate with an ellipsis.
fn summarize_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() > max_chars {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}

/// Keyword heuristics over visible text and title.
fn detect_page_type(text: &str, title: &str) -> PageType {
    let content = text.to_lowercase();
    let title = title.to_lowercase();
    let head: String = content.chars().take(500).collect();

    if content.contains("login") || content.contains("sign in") || content.contains("password") {
        PageType::Login
    } else if title.contains("search") || head.contains("search") {
        PageType::Search
    } else if content.contains("checkout") || content.contains("cart") {
        PageType::Checkout
    } else if content.contains("form") || content.contains("submit") {
        PageType::Form
    } else {
        PageType::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;

    #[test]
    fn summarize_collapses_and_truncates() {
        assert_eq!(summarize_text("  a \n\n b\t c  ", 100), "a b c");

        let long = "word ".repeat(1000);
        let summary = summarize_text(&long, 20);
        assert_eq!(summary.chars().count(), 23);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn page_type_heuristics() {
        assert_eq!(
            detect_page_type("please sign in with your password", ""),
            PageType::Login
        );
        assert_eq!(detect_page_type("anything", "Search results"), PageType::Search);
        assert_eq!(detect_page_type("your cart is empty", ""), PageType::Checkout);
        assert_eq!(detect_page_type("submit your details", ""), PageType::Form);
        assert_eq!(detect_page_type("welcome to our site", ""), PageType::General);
    }

    #[tokio::test]
    async fn snapshot_filters_invisible_elements() {
        let driver = Arc::new(MockDriver::new().with_elements(vec![
            ElementDescriptor {
                tag: "button".to_string(),
                text: "Visible".to_string(),
                visible: true,
                ..Default::default()
            },
            ElementDescriptor {
                tag: "a".to_string(),
                text: "Hidden".to_string(),
                visible: false,
                ..Default::default()
            },
        ]));
        let perception = PagePerception::new(driver);

        let snapshot = perception.page_state().await.unwrap();
        assert_eq!(snapshot.interactive_elements.len(), 1);
        assert_eq!(snapshot.interactive_elements[0].text, "Visible");
    }

    #[tokio::test]
    async fn find_element_by_text_builds_id_selector() {
        let driver = Arc::new(MockDriver::new().with_elements(vec![ElementDescriptor {
            tag: "button".to_string(),
            text: "Submit order".to_string(),
            id: "submit-btn".to_string(),
            visible: true,
            ..Default::default()
        }]));
        let perception = PagePerception::new(driver);

        let selector = perception.find_element_by_text("submit").await.unwrap();
        assert_eq!(selector.as_deref(), Some("#submit-btn"));

        let missing = perception.find_element_by_text("cancel").await.unwrap();
        assert!(missing.is_none());
    }
}
