/*!
 * Batch translation processing.
 *
 * One batch is one provider call: fragments are joined with a delimiter,
 * glossary hints are injected into the prompt, and the response is split
 * and verified against the input count. Every failure mode degrades to
 * returning the original fragments, so the output length always equals the
 * input length and cell alignment can never be corrupted by a bad response.
 */

use std::sync::Arc;

use log::{debug, error, warn};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;

use crate::glossary::GlossaryTable;
use crate::providers::Provider;

use super::prompt::BatchPromptBuilder;
use super::retry::RetryPolicy;

// Models occasionally wrap the whole answer in a Markdown code fence
static CODE_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z0-9]*\n?(.*?)\n?```\s*$").unwrap()
});

/// Outcome counters accumulated across one translator's batches
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    /// Batches that came back translated and verified
    pub batches_translated: u64,

    /// Batches that fell back to original text
    pub batches_fallen_back: u64,

    /// Fragments covered by verified translations
    pub fragments_translated: u64,

    /// Retries spent on rate limits
    pub retries: u64,
}

impl BatchStats {
    /// Batches processed in total
    pub fn total_batches(&self) -> u64 {
        self.batches_translated + self.batches_fallen_back
    }
}

/// Batch translator: joins fragments, queries the provider, verifies counts
pub struct BatchTranslator {
    /// The backend answering translation prompts
    provider: Arc<dyn Provider>,

    /// Term table injected into prompts
    glossary: Arc<GlossaryTable>,

    /// Prompt builder for the configured language pair
    prompts: BatchPromptBuilder,

    /// Retry policy for rate-limited calls
    retry: RetryPolicy,

    /// Outcome counters
    stats: Arc<RwLock<BatchStats>>,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(
        provider: Arc<dyn Provider>,
        glossary: Arc<GlossaryTable>,
        prompts: BatchPromptBuilder,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            glossary,
            prompts,
            retry,
            stats: Arc::new(RwLock::new(BatchStats::default())),
        }
    }

    /// Generate a join delimiter that occurs in none of the fragments
    ///
    /// The response is split on this token, so a token occurring inside a
    /// fragment would corrupt the alignment. Tokens are regenerated until
    /// one is collision free.
    pub fn fresh_delimiter(fragments: &[String]) -> String {
        loop {
            let token: String = rand::rng()
                .sample_iter(Alphanumeric)
                .take(8)
                .map(char::from)
                .collect();
            let delimiter = format!("@@{}@@", token);
            if !fragments.iter().any(|f| f.contains(&delimiter)) {
                return delimiter;
            }
        }
    }

    /// Translate one batch of fragments
    ///
    /// The returned vector always has the same length as `fragments`: either
    /// every element is the verified translation, or every element is the
    /// original text. Rate limits are retried with backoff; any other
    /// provider error, an empty response, or a count mismatch falls back to
    /// the originals immediately.
    pub async fn translate_batch(&self, fragments: &[String], delimiter: &str) -> Vec<String> {
        if fragments.is_empty() {
            return Vec::new();
        }

        let payload = fragments.join(delimiter);
        let hints = self.glossary.relevant_hints(&payload);
        let prompt = self.prompts.build(&payload, delimiter, fragments.len(), &hints);

        debug!(
            "Translating batch of {} fragments ({} glossary hints) via {}",
            fragments.len(),
            hints.len(),
            self.provider.name()
        );

        let mut attempt = 1u32;
        loop {
            match self.provider.generate(&prompt).await {
                Ok(response) => {
                    return self.reconcile(fragments, delimiter, &response);
                }
                Err(e) if e.is_retryable() && self.retry.allows_retry(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Rate limited on attempt {}/{}, waiting {:?} before retrying",
                        attempt,
                        self.retry.max_attempts(),
                        delay
                    );
                    self.stats.write().retries += 1;
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Translation request failed: {}", e);
                    return self.fall_back(fragments);
                }
            }
        }
    }

    /// Split and verify a provider response against the input batch
    fn reconcile(&self, fragments: &[String], delimiter: &str, response: &str) -> Vec<String> {
        let cleaned = strip_code_fence(response).trim();
        if cleaned.is_empty() {
            warn!("Provider returned an empty result for a batch of {}", fragments.len());
            return self.fall_back(fragments);
        }

        let translated: Vec<String> =
            cleaned.split(delimiter).map(|s| s.trim().to_string()).collect();

        // A mismatched count means the response cannot be trusted at all;
        // no retry, the originals are the safe answer
        if translated.len() != fragments.len() {
            warn!(
                "Batch count mismatch: expected {} fragments, got {}",
                fragments.len(),
                translated.len()
            );
            return self.fall_back(fragments);
        }

        let mut stats = self.stats.write();
        stats.batches_translated += 1;
        stats.fragments_translated += fragments.len() as u64;
        translated
    }

    /// Substitute the original fragments for a failed batch
    fn fall_back(&self, fragments: &[String]) -> Vec<String> {
        self.stats.write().batches_fallen_back += 1;
        fragments.to_vec()
    }

    /// Snapshot of the outcome counters
    pub fn stats(&self) -> BatchStats {
        self.stats.read().clone()
    }
}

/// Strip a single Markdown code fence wrapped around the whole text
fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE_RE.captures(text) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(text),
        None => text,
    }
}
