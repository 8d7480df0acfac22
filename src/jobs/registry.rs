/*!
 * Shared job registry.
 *
 * A concurrent map from job identifier to record, injected into the engine
 * so callers own its lifetime. Discipline: after creation a record is
 * written only by the owning job's task; polling reads never mutate; the
 * two removal paths are artifact consumption and the retention sweep.
 */

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::models::{JobRecord, JobStatus};

/// Concurrent id-to-record map, cheap to clone and share across tasks
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<DashMap<Uuid, JobRecord>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly created record
    pub fn insert(&self, record: JobRecord) {
        self.jobs.insert(record.id, record);
    }

    /// Overwrite the status of an existing record, refreshing its update time
    ///
    /// Only the job's own task calls this after creation.
    pub fn update_status(&self, id: Uuid, status: JobStatus) {
        if let Some(mut record) = self.jobs.get_mut(&id) {
            record.status = status;
            record.updated_at = Utc::now();
        }
    }

    /// Snapshot of one record; clones out so callers never hold a shard lock
    pub fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.get(&id).map(|r| r.clone())
    }

    /// Atomically remove and return a record, but only if it is `Completed`
    ///
    /// The conditional remove is what makes artifact consumption
    /// exactly-once: two concurrent fetches of the same id cannot both
    /// succeed.
    pub fn consume_completed(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs
            .remove_if(&id, |_, record| {
                matches!(record.status, JobStatus::Completed { .. })
            })
            .map(|(_, record)| record)
    }

    /// Remove terminal records last updated before `retention` ago
    ///
    /// `Processing` records are never evicted regardless of age. Returns the
    /// evicted records so the caller can release their artifacts.
    pub fn evict_terminal_older_than(&self, retention: Duration) -> Vec<JobRecord> {
        let cutoff = Utc::now() - retention;

        // Collect candidates first; removing while iterating would contend
        // on the shard locks
        let expired: Vec<Uuid> = self
            .jobs
            .iter()
            .filter(|entry| entry.status.is_terminal() && entry.updated_at < cutoff)
            .map(|entry| entry.id)
            .collect();

        expired
            .into_iter()
            .filter_map(|id| {
                self.jobs
                    .remove_if(&id, |_, record| {
                        record.status.is_terminal() && record.updated_at < cutoff
                    })
                    .map(|(_, record)| record)
            })
            .collect()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
