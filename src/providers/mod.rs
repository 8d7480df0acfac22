/*!
 * Provider implementations for the translation service.
 *
 * This module contains client implementations for text generation backends:
 * - Gemini: Google Gemini REST API
 * - Mock: scripted in-process provider for dry runs and tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation backends
///
/// The trait is object safe: the batch translator holds the active backend
/// as `Arc<dyn Provider>` so every job shares one client and its connection
/// pool.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Generate text for a composed prompt
    ///
    /// # Arguments
    /// * `prompt` - The full instruction text to send
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The generated text or an error
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is usable, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short provider name used in logs
    fn name(&self) -> &str;
}

pub mod gemini;
pub mod mock;

pub use gemini::Gemini;
pub use mock::{MockBehavior, MockProvider};
