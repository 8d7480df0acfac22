/*!
 * Tests for job records and the job registry
 */

use chrono::{Duration, Utc};
use uuid::Uuid;

use transheet::jobs::{JobRecord, JobRegistry, JobStatus};

fn completed_status(artifact: &str) -> JobStatus {
    JobStatus::Completed {
        download_ref: artifact.to_string(),
        digest: "d41d8cd9".to_string(),
    }
}

/// Test the full wire shape of each status variant
#[test]
fn test_jobStatus_serialize_shouldProduceFlatTaggedObjects() {
    let processing = serde_json::to_value(JobStatus::Processing).unwrap();
    assert_eq!(processing, serde_json::json!({"status": "processing"}));

    let completed = serde_json::to_value(completed_status("downloads/a.grid.json")).unwrap();
    assert_eq!(
        completed,
        serde_json::json!({
            "status": "completed",
            "download_ref": "downloads/a.grid.json",
            "digest": "d41d8cd9"
        })
    );

    let failed = serde_json::to_value(JobStatus::Failed { error: "boom".to_string() }).unwrap();
    assert_eq!(failed, serde_json::json!({"status": "failed", "error": "boom"}));
}

/// Test that registry lookups clone records out instead of borrowing
#[test]
fn test_jobRegistry_get_shouldReturnIndependentCopy() {
    let registry = JobRegistry::new();
    let id = Uuid::new_v4();
    registry.insert(JobRecord::new(id, None));

    let first = registry.get(id).unwrap();
    registry.update_status(id, JobStatus::Failed { error: "late".to_string() });

    // The copy taken before the update is unaffected
    assert_eq!(first.status, JobStatus::Processing);
    assert_eq!(registry.get(id).unwrap().status, JobStatus::Failed { error: "late".to_string() });
}

/// Test that an unknown identifier is a miss, not an error
#[test]
fn test_jobRegistry_getUnknownId_shouldReturnNone() {
    let registry = JobRegistry::new();
    assert!(registry.get(Uuid::new_v4()).is_none());
    assert!(registry.consume_completed(Uuid::new_v4()).is_none());
}

/// Test single-consumer download semantics
///
/// The first fetch of a completed job wins; every later fetch, from any
/// handle, comes back empty.
#[test]
fn test_jobRegistry_consumeCompleted_acrossClones_shouldReleaseOnce() {
    let registry = JobRegistry::new();
    let shared = registry.clone();
    let id = Uuid::new_v4();

    registry.insert(JobRecord::new(id, None));
    registry.update_status(id, completed_status("downloads/a.grid.json"));

    assert!(shared.consume_completed(id).is_some());
    assert!(registry.consume_completed(id).is_none());
    assert!(registry.get(id).is_none());
}

/// Test that consuming a processing job leaves it in place
#[test]
fn test_jobRegistry_consumeCompleted_whileProcessing_shouldLeaveRecord() {
    let registry = JobRegistry::new();
    let id = Uuid::new_v4();
    registry.insert(JobRecord::new(id, None));

    assert!(registry.consume_completed(id).is_none());
    assert_eq!(registry.get(id).unwrap().status, JobStatus::Processing);
}

/// Test eviction of stale terminal records
#[test]
fn test_jobRegistry_evict_shouldDropOnlyStaleTerminalRecords() {
    let registry = JobRegistry::new();

    // A completed record finished two hours ago
    let stale_done = Uuid::new_v4();
    let mut record = JobRecord::new(stale_done, None);
    record.status = completed_status("downloads/old.grid.json");
    record.updated_at = Utc::now() - Duration::hours(2);
    registry.insert(record);

    // A processing record equally old; age alone must not evict it
    let stale_running = Uuid::new_v4();
    let mut record = JobRecord::new(stale_running, None);
    record.updated_at = Utc::now() - Duration::hours(2);
    registry.insert(record);

    // A failed record updated moments ago
    let fresh_failed = Uuid::new_v4();
    registry.insert(JobRecord::new(fresh_failed, None));
    registry.update_status(fresh_failed, JobStatus::Failed { error: "boom".to_string() });

    let evicted = registry.evict_terminal_older_than(Duration::hours(1));

    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].id, stale_done);
    assert!(registry.get(stale_done).is_none());
    assert!(registry.get(stale_running).is_some());
    assert!(registry.get(fresh_failed).is_some());
    assert_eq!(registry.len(), 2);
}

/// Test that updating a status moves updated_at forward
#[test]
fn test_jobRegistry_updateStatus_shouldAdvanceTimestamp() {
    let registry = JobRegistry::new();
    let id = Uuid::new_v4();

    let mut record = JobRecord::new(id, None);
    record.updated_at = Utc::now() - Duration::minutes(5);
    let created_at = record.created_at;
    registry.insert(record);

    registry.update_status(id, completed_status("downloads/a.grid.json"));

    let updated = registry.get(id).unwrap();
    // The backdated timestamp is replaced with a current one
    assert!(updated.updated_at > Utc::now() - Duration::minutes(1));
    assert_eq!(updated.created_at, created_at);
}
