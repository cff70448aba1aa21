//! Chrome-backed browser driver using headless_chrome.
//!
//! CDP calls are blocking, so every driver method hops onto the blocking
//! thread pool with a clone of the tab handle.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use tracing::warn;

use crate::driver::{BrowserDriver, ScrollDirection};
use crate::error::AgentError;
use crate::types::ElementDescriptor;

/// JS that enumerates interactive elements as a JSON string.
const INTERACTIVE_ELEMENTS_JS: &str = r#"
JSON.stringify((() => {
  const nodes = document.querySelectorAll(
    'a, button, input, textarea, select, [onclick], [role="button"]');
  const out = [];
  nodes.forEach(el => {
    const rect = el.getBoundingClientRect();
    if (rect.width > 0 && rect.height > 0) {
      out.push({
        tag: el.tagName.toLowerCase(),
        type: el.type || '',
        text: (el.innerText || '').substring(0, 100),
        placeholder: el.placeholder || '',
        id: el.id || '',
        class: (typeof el.className === 'string' ? el.className : ''),
        visible: rect.top >= 0 && rect.top <= window.innerHeight
      });
    }
  });
  return out;
})())
"#;

/// Browser session owning the Chrome process. Created by the caller
/// before the loop; dropping it closes the browser on every exit path.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    /// Launch Chrome and open a blank tab.
    pub fn launch(headless: bool) -> Result<Self, AgentError> {
        let options = LaunchOptions {
            headless,
            args: vec![
                OsStr::new("--no-first-run"),
                OsStr::new("--no-default-browser-check"),
                OsStr::new("--disable-blink-features=AutomationControlled"),
            ],
            idle_browser_timeout: Duration::from_secs(300),
            window_size: Some((1280, 720)),
            ..Default::default()
        };

        let browser = Browser::new(options)
            .map_err(|e| AgentError::init(format!("browser launch failed: {e:#}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| AgentError::init(format!("could not open tab: {e:#}")))?;
        tab.navigate_to("about:blank")
            .map_err(|e| AgentError::init(format!("initial navigation failed: {e:#}")))?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// Driver handle borrowing this session's tab. `timeout_ms` bounds
    /// the post-navigation wait for the document body.
    pub fn driver(&self, timeout_ms: u64) -> ChromeDriver {
        ChromeDriver {
            tab: self.tab.clone(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

/// `BrowserDriver` over one Chrome tab.
#[derive(Clone)]
pub struct ChromeDriver {
    tab: Arc<Tab>,
    timeout: Duration,
}

impl ChromeDriver {
    /// Run a blocking CDP closure off the async runtime.
    async fn with_tab<T, F>(&self, f: F) -> Result<T, AgentError>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> anyhow::Result<T> + Send + 'static,
    {
        let tab = self.tab.clone();
        tokio::task::spawn_blocking(move || f(&tab))
            .await
            .map_err(|e| AgentError::driver(format!("driver task panicked: {e}")))?
            .map_err(|e| AgentError::driver(format!("{e:#}")))
    }

    /// Interactions report failure as `false` rather than an error, like
    /// the perception-facing contract requires.
    async fn interact<F>(&self, what: &str, f: F) -> Result<bool, AgentError>
    where
        F: FnOnce(&Tab) -> anyhow::Result<()> + Send + 'static,
    {
        match self.with_tab(f).await {
            Ok(()) => Ok(true),
            Err(err) => {
                warn!(what, error = %err, "browser interaction failed");
                Ok(false)
            }
        }
    }

    async fn evaluate_string(&self, expr: &'static str, fallback: &str) -> Result<String, AgentError> {
        let fallback = fallback.to_string();
        self.with_tab(move |tab| {
            let result = tab.evaluate(expr, false)?;
            Ok(result
                .value
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or(fallback))
        })
        .await
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    async fn navigate(&self, url: &str) -> Result<bool, AgentError> {
        let url = url.to_string();
        let timeout = self.timeout;
        self.interact("navigate", move |tab| {
            tab.navigate_to(&url)?;
            tab.wait_for_element_with_custom_timeout("body", timeout)?;
            Ok(())
        })
        .await
    }

    async fn click(&self, selector: &str) -> Result<bool, AgentError> {
        let selector = selector.to_string();
        self.interact("click", move |tab| {
            tab.find_element(&selector)?.click()?;
            Ok(())
        })
        .await
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<bool, AgentError> {
        let selector = selector.to_string();
        let text = text.to_string();
        self.interact("type", move |tab| {
            let element = tab.find_element(&selector)?;
            element.click()?;
            // Clear any existing value before typing.
            let escaped = selector.replace('\'', "\\'");
            tab.evaluate(
                &format!("document.querySelector('{escaped}').value = ''"),
                false,
            )?;
            tab.type_str(&text)?;
            Ok(())
        })
        .await
    }

    async fn scroll(&self, direction: ScrollDirection, amount: i64) -> Result<bool, AgentError> {
        let delta = match direction {
            ScrollDirection::Down => amount,
            ScrollDirection::Up => -amount,
        };
        self.interact("scroll", move |tab| {
            tab.evaluate(&format!("window.scrollBy(0, {delta})"), false)?;
            Ok(())
        })
        .await
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<bool, AgentError> {
        let selector = selector.to_string();
        self.interact("wait", move |tab| {
            tab.wait_for_element_with_custom_timeout(
                &selector,
                Duration::from_millis(timeout_ms),
            )?;
            Ok(())
        })
        .await
    }

    async fn page_text(&self) -> Result<String, AgentError> {
        self.evaluate_string("document.body.innerText", "").await
    }

    async fn title(&self) -> Result<String, AgentError> {
        self.evaluate_string("document.title", "untitled").await
    }

    async fn url(&self) -> Result<String, AgentError> {
        self.evaluate_string("window.location.href", "unknown").await
    }

    async fn screenshot_base64(&self) -> Result<String, AgentError> {
        let png = self
            .with_tab(|tab| {
                tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            })
            .await?;
        Ok(BASE64.encode(png))
    }

    async fn execute_script(&self, code: &str) -> Result<Value, AgentError> {
        let code = code.to_string();
        self.with_tab(move |tab| {
            let result = tab.evaluate(&code, false)?;
            Ok(result.value.unwrap_or(Value::Null))
        })
        .await
    }

    async fn interactive_elements(&self) -> Result<Vec<ElementDescriptor>, AgentError> {
        let raw = self
            .with_tab(|tab| {
                let result = tab.evaluate(INTERACTIVE_ELEMENTS_JS, false)?;
                Ok(result
                    .value
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_else(|| "[]".to_string()))
            })
            .await?;

        serde_json::from_str(&raw)
            .map_err(|e| AgentError::driver(format!("bad element payload: {e}")))
    }
}
