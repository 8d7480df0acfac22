/*!
 * Translation pipeline for spreadsheet documents using AI providers.
 *
 * This module contains the core functionality for translating workbook
 * cells in batches. It is split into several submodules:
 *
 * - `batch`: Batch translation with retry and fallback reconciliation
 * - `prompt`: Prompt templates and builders for batch translation
 * - `retry`: Retry policy with exponential backoff
 * - `rewriter`: Workbook scanning and bilingual cell rewriting
 */

// Re-export main types for easier usage
pub use self::batch::{BatchStats, BatchTranslator};
pub use self::prompt::{BatchPromptBuilder, PromptTemplate};
pub use self::retry::RetryPolicy;
pub use self::rewriter::{CancelToken, RewriteSummary, WorkbookRewriter, apply_translations};

// Submodules
pub mod batch;
pub mod prompt;
pub mod retry;
pub mod rewriter;
