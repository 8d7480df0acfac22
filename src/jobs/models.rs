/*!
 * Job tracking records.
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle state of one translation job
///
/// The only transitions reachable after creation are
/// `Processing -> Completed` and `Processing -> Failed`. An unknown
/// identifier is a query-time miss, never a stored state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// Translation is still running
    Processing,

    /// The artifact is ready for download
    Completed {
        /// Filesystem reference to the output artifact
        download_ref: String,
        /// SHA256 digest of the artifact contents
        digest: String,
    },

    /// The pipeline failed with a captured description
    Failed {
        error: String,
    },
}

impl JobStatus {
    /// Whether the job has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

/// One tracked translation job
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    /// Unique job identifier
    pub id: Uuid,

    /// Current lifecycle state
    pub status: JobStatus,

    /// Optional recipient for the finished artifact
    pub notify_target: Option<String>,

    /// When the job was accepted
    pub created_at: DateTime<Utc>,

    /// When the status last changed
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a fresh record in the `Processing` state
    pub fn new(id: Uuid, notify_target: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Processing,
            notify_target,
            created_at: now,
            updated_at: now,
        }
    }
}
