/*!
 * Background translation jobs.
 *
 * One job is one document's full translate-and-rewrite run, tracked by an
 * observable record. The submodules:
 *
 * - `models`: job records and status transitions
 * - `registry`: the shared id-to-record map
 * - `engine`: staging, scheduling, execution and artifact handover
 */

// Re-export main types for easier usage
pub use self::engine::JobEngine;
pub use self::models::{JobRecord, JobStatus};
pub use self::registry::JobRegistry;

// Submodules
pub mod engine;
pub mod models;
pub mod registry;
