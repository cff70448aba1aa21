//! Immutable configuration passed to the orchestrator at construction.

use serde::{Deserialize, Serialize};

/// Tunables for one task execution. Built once, never mutated by the loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Step budget before forced termination.
    /// Default: 50
    pub max_steps: u32,

    /// Driver-level default wait timeout in milliseconds.
    /// Default: 30000
    pub timeout_ms: u64,

    /// Whether to run the auxiliary vision-analysis call.
    /// Default: false
    pub use_vision: bool,

    /// Vision sampling runs at steps that are multiples of this.
    /// 0 disables sampling. Default: 3
    pub vision_interval: u32,

    /// Mid-loop completion verification runs at steps that are multiples
    /// of this. 0 disables mid-loop verification (the final pass always
    /// runs). Default: 5
    pub verification_interval: u32,

    /// Minimum verifier confidence, strictly exceeded, to accept an early
    /// completion signal. Default: 0.8
    pub confidence_threshold: f64,

    /// Attempt a best-effort screenshot when a step fails unexpectedly.
    /// Default: true
    pub screenshot_on_error: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 50,
            timeout_ms: 30_000,
            use_vision: false,
            vision_interval: 3,
            verification_interval: 5,
            confidence_threshold: 0.8,
            screenshot_on_error: true,
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small budget, no vision, no error screenshots. Used in tests.
    pub fn minimal() -> Self {
        Self {
            max_steps: 5,
            timeout_ms: 1_000,
            use_vision: false,
            vision_interval: 3,
            verification_interval: 5,
            confidence_threshold: 0.8,
            screenshot_on_error: false,
        }
    }

    /// Builder: set the step budget.
    pub fn max_steps(mut self, steps: u32) -> Self {
        self.max_steps = steps;
        self
    }

    /// Builder: enable or disable vision sampling.
    pub fn vision(mut self, enabled: bool) -> Self {
        self.use_vision = enabled;
        self
    }

    /// Builder: set the vision sampling interval.
    pub fn vision_interval(mut self, interval: u32) -> Self {
        self.vision_interval = interval;
        self
    }

    /// Builder: set the mid-loop verification interval.
    pub fn verification_interval(mut self, interval: u32) -> Self {
        self.verification_interval = interval;
        self
    }

    /// Builder: set the confidence threshold.
    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Builder: set error screenshot capture.
    pub fn screenshot_on_error(mut self, enabled: bool) -> Self {
        self.screenshot_on_error = enabled;
        self
    }
}
