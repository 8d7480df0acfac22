/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Translates every segment with a marker
 * - `MockProvider::echo()` - Returns the source segments unchanged
 * - `MockProvider::rate_limited()` - Always fails with a rate-limit error
 * - `MockProvider::failing()` - Always fails with a server error
 * - `MockProvider::drop_last()` - Returns one segment fewer than requested
 * - `MockProvider::empty()` - Returns an empty response body
 *
 * A behavior script can front-load different outcomes for consecutive calls,
 * which is how retry sequences are exercised.
 */

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;

use crate::errors::ProviderError;
use crate::providers::Provider;

// The batch prompt quotes the delimiter in backticks, which is what the
// payload parser keys on
static DELIMITER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"`"([^`]+?)"`"#).unwrap());

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Translate every segment with the standard marker
    Working,
    /// Return the source segments unchanged
    Echo,
    /// Return one segment fewer than requested
    DropLast,
    /// Return an empty response body
    Empty,
    /// Fail with a rate-limit error
    RateLimited,
    /// Fail with a server error
    Failing,
    /// Delay, then translate
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Steady-state behavior once the script is exhausted
    behavior: MockBehavior,
    /// Behaviors consumed one per call before `behavior` takes over
    script: Arc<Mutex<VecDeque<MockBehavior>>>,
    /// Number of generate calls made
    request_count: Arc<AtomicUsize>,
    /// Prompts received, in call order
    prompts: Arc<Mutex<Vec<String>>>,
    /// Calls currently inside generate
    in_flight: Arc<AtomicUsize>,
    /// Highest concurrent call count observed
    max_in_flight: Arc<AtomicUsize>,
    /// Custom segment transform (optional)
    segment_transform: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified steady-state behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            script: Arc::new(Mutex::new(VecDeque::new())),
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            segment_transform: None,
        }
    }

    /// Create a working mock provider that always translates
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that returns the source unchanged
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock that always reports rate limiting
    pub fn rate_limited() -> Self {
        Self::new(MockBehavior::RateLimited)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that loses the last segment of every batch
    pub fn drop_last() -> Self {
        Self::new(MockBehavior::DropLast)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Front-load behaviors for the next calls; once consumed, the
    /// steady-state behavior applies
    pub fn with_script(self, script: Vec<MockBehavior>) -> Self {
        *self.script.lock() = script.into();
        self
    }

    /// Set a custom per-segment transform used by translating behaviors
    pub fn with_segment_transform(mut self, transform: fn(&str) -> String) -> Self {
        self.segment_transform = Some(transform);
        self
    }

    /// Number of generate calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Highest number of concurrent generate calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// The marker translation applied to a segment by default
    pub fn translate_segment(segment: &str) -> String {
        format!("[TRANSLATED] {}", segment)
    }

    /// Pull the delimiter and joined payload back out of a batch prompt
    ///
    /// Relies on the prompt shape: the delimiter appears in backticked
    /// quotes and the payload is the quoted block after "Source segments:".
    pub fn parse_batch_prompt(prompt: &str) -> Option<(String, String)> {
        let delimiter = DELIMITER_RE.captures(prompt)?.get(1)?.as_str().to_string();
        let after = prompt.split("Source segments:").nth(1)?;
        let start = after.find('"')? + 1;
        let end = after.rfind('"')?;
        if end < start {
            return None;
        }
        Some((delimiter, after[start..end].to_string()))
    }

    fn next_behavior(&self) -> MockBehavior {
        self.script.lock().pop_front().unwrap_or(self.behavior)
    }

    fn translate_payload(&self, prompt: &str, drop_last: bool) -> String {
        let Some((delimiter, payload)) = Self::parse_batch_prompt(prompt) else {
            // Not a batch prompt; behave like a plain text generator
            return Self::translate_segment(prompt);
        };

        let transform = self.segment_transform.unwrap_or(Self::translate_segment);
        let mut segments: Vec<String> =
            payload.split(delimiter.as_str()).map(transform).collect();
        if drop_last {
            segments.pop();
        }
        segments.join(&delimiter)
    }

    fn echo_payload(prompt: &str) -> String {
        match Self::parse_batch_prompt(prompt) {
            Some((_, payload)) => payload,
            None => prompt.to_string(),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            script: Arc::clone(&self.script),
            request_count: Arc::clone(&self.request_count),
            prompts: Arc::clone(&self.prompts),
            in_flight: Arc::clone(&self.in_flight),
            max_in_flight: Arc::clone(&self.max_in_flight),
            segment_transform: self.segment_transform,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let result = match self.next_behavior() {
            MockBehavior::Working => Ok(self.translate_payload(prompt, false)),

            MockBehavior::Echo => Ok(Self::echo_payload(prompt)),

            MockBehavior::DropLast => Ok(self.translate_payload(prompt, true)),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::RateLimited => Err(ProviderError::RateLimitExceeded(
                "Simulated rate limit (429)".to_string(),
            )),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.translate_payload(prompt, false))
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
