/*!
 * Asynchronous job engine.
 *
 * Wraps one document's translate-and-rewrite pipeline as a detached tokio
 * task with an observable record in the shared registry. Submission stages
 * the input under a job-owned path and returns immediately; overall
 * parallelism is capped by a semaphore sized from configuration, with the
 * permit acquired inside the spawned task so pool saturation never delays
 * the submitter.
 */

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::Duration as ChronoDuration;
use log::{debug, error, info, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::app_config::Config;
use crate::file_utils::{DOCUMENT_SUFFIX, FileManager};
use crate::glossary::GlossaryTable;
use crate::language_utils;
use crate::notify::Notifier;
use crate::providers::Provider;
use crate::sheet_processor::Workbook;
use crate::translation::batch::BatchTranslator;
use crate::translation::prompt::BatchPromptBuilder;
use crate::translation::retry::RetryPolicy;
use crate::translation::rewriter::WorkbookRewriter;

use super::models::{JobRecord, JobStatus};
use super::registry::JobRegistry;

/// Drives translation jobs in the background
///
/// The registry is injected rather than owned so an embedding layer can
/// poll it directly and control its lifetime.
#[derive(Debug, Clone)]
pub struct JobEngine {
    config: Config,
    registry: JobRegistry,
    provider: Arc<dyn Provider>,
    glossary: Arc<GlossaryTable>,
    notifier: Arc<dyn Notifier>,
    pool: Arc<Semaphore>,
    sweeper: Arc<OnceLock<JoinHandle<()>>>,
    source_name: String,
    target_name: String,
}

impl JobEngine {
    /// Create an engine over the given registry and collaborators
    ///
    /// Resolves the configured language codes to display names and makes
    /// sure the staging directories exist.
    pub fn new(
        config: Config,
        registry: JobRegistry,
        provider: Arc<dyn Provider>,
        glossary: Arc<GlossaryTable>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let source_name = language_utils::get_language_name(&config.source_language)?;
        let target_name = language_utils::get_language_name(&config.target_language)?;

        FileManager::ensure_dir(&config.jobs.upload_dir)?;
        FileManager::ensure_dir(&config.jobs.download_dir)?;

        let pool = Arc::new(Semaphore::new(config.jobs.max_concurrent_jobs.max(1)));

        Ok(Self {
            config,
            registry,
            provider,
            glossary,
            notifier,
            pool,
            sweeper: Arc::new(OnceLock::new()),
            source_name,
            target_name,
        })
    }

    /// The shared registry this engine writes to
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Accept a document for translation and return its job id immediately
    ///
    /// The input is copied to a job-owned staging path before the record is
    /// created, so no two jobs ever share a file. The caller must be inside
    /// a tokio runtime.
    pub fn submit(&self, document_path: &Path, notify_target: Option<String>) -> Result<Uuid> {
        if !FileManager::file_exists(document_path) {
            return Err(anyhow!("Input document not found: {}", document_path.display()));
        }

        let id = Uuid::new_v4();
        let staged = Path::new(&self.config.jobs.upload_dir)
            .join(format!("{}_original{}", id, DOCUMENT_SUFFIX));
        FileManager::copy_file(document_path, &staged)
            .with_context(|| format!("Failed to stage document for job {}", id))?;

        self.registry.insert(JobRecord::new(id, notify_target.clone()));
        info!("Job {} accepted for {}", id, document_path.display());

        self.ensure_retention_sweeper();

        let engine = self.clone();
        tokio::spawn(async move {
            engine.run_job(id, staged, notify_target).await;
        });

        Ok(id)
    }

    /// Current record for a job, if it is still known
    pub fn status(&self, id: Uuid) -> Option<JobRecord> {
        self.registry.get(id)
    }

    /// Consume a completed job, taking ownership of its artifact
    ///
    /// Removes the record from the registry; a second fetch of the same id
    /// returns `None`, as does fetching a job that is not `Completed`.
    pub fn fetch(&self, id: Uuid) -> Option<(PathBuf, String)> {
        let record = self.registry.consume_completed(id)?;
        match record.status {
            JobStatus::Completed { download_ref, digest } => {
                Some((PathBuf::from(download_ref), digest))
            }
            // consume_completed only releases Completed records
            _ => None,
        }
    }

    /// Abort the background eviction sweep, if it ever started
    pub fn shutdown(&self) {
        if let Some(sweeper) = self.sweeper.get() {
            sweeper.abort();
        }
    }

    /// Start the eviction sweep with the first accepted job
    ///
    /// Lazy so the engine can be constructed outside a runtime; every clone
    /// shares the cell, so exactly one sweep task runs per engine.
    fn ensure_retention_sweeper(&self) {
        self.sweeper.get_or_init(|| self.spawn_retention_sweeper());
    }

    /// Spawn the background eviction sweep and return its task handle
    ///
    /// Terminal records older than the configured retention are dropped and
    /// their artifacts removed. `Processing` records are never touched.
    fn spawn_retention_sweeper(&self) -> JoinHandle<()> {
        let registry = self.registry.clone();
        let retention = ChronoDuration::seconds(self.config.jobs.record_retention_secs as i64);
        let period = Duration::from_secs(self.config.jobs.sweep_interval_secs.max(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // interval yields its first tick immediately; consume it so the
            // first sweep happens one full period after launch
            ticker.tick().await;
            loop {
                ticker.tick().await;
                for record in registry.evict_terminal_older_than(retention) {
                    if let JobStatus::Completed { download_ref, .. } = &record.status {
                        if let Err(e) =
                            FileManager::remove_file_idempotent(Path::new(download_ref))
                        {
                            warn!("Sweep: could not remove artifact of job {}: {}", record.id, e);
                        }
                    }
                    info!("Sweep: evicted job {} after retention", record.id);
                }
            }
        })
    }

    /// Body of the spawned job task
    async fn run_job(self, id: Uuid, staged: PathBuf, notify_target: Option<String>) {
        let _permit = match self.pool.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                // Semaphore closure only happens at shutdown
                self.registry.update_status(
                    id,
                    JobStatus::Failed { error: "Worker pool closed".to_string() },
                );
                self.cleanup_staged(id, &staged);
                return;
            }
        };

        match self.execute(id, &staged).await {
            Ok((artifact, digest)) => {
                let download_ref = artifact.display().to_string();
                self.registry
                    .update_status(id, JobStatus::Completed { download_ref, digest });
                info!("Job {} completed: {}", id, artifact.display());

                if let Some(target) = notify_target {
                    self.send_notification(id, &target, &artifact).await;
                }
            }
            Err(e) => {
                error!("Job {} failed: {:#}", id, e);
                self.registry
                    .update_status(id, JobStatus::Failed { error: format!("{:#}", e) });
            }
        }

        // Runs on every path out of the pipeline, including load failures
        self.cleanup_staged(id, &staged);
    }

    /// Translate the staged document and write the artifact
    async fn execute(&self, id: Uuid, staged: &Path) -> Result<(PathBuf, String)> {
        let mut workbook = Workbook::load(staged)?;

        let translator = BatchTranslator::new(
            self.provider.clone(),
            self.glossary.clone(),
            BatchPromptBuilder::new(&self.source_name, &self.target_name),
            RetryPolicy::from_millis(
                self.config.translation.retry_count,
                self.config.translation.retry_backoff_ms,
            ),
        );
        let rewriter = WorkbookRewriter::new(translator, self.config.translation.chunk_size);

        let summary = rewriter
            .process(&mut workbook, |done, total| {
                debug!("Job {}: batch {}/{}", id, done, total);
            })
            .await?;

        if summary.has_failures() {
            warn!(
                "Job {}: {} sheet(s) kept their original text: {}",
                id,
                summary.sheets_failed.len(),
                summary.sheets_failed.join(", ")
            );
        }

        let artifact = Path::new(&self.config.jobs.download_dir)
            .join(format!("{}_translated{}", id, DOCUMENT_SUFFIX));
        workbook.save(&artifact)?;
        let digest = FileManager::sha256_digest(&artifact)?;

        let stats = rewriter.translator().stats();
        info!(
            "Job {}: {} fragments over {} batches ({} fell back, {} retries)",
            id,
            summary.fragments_total,
            stats.total_batches(),
            stats.batches_fallen_back,
            stats.retries
        );

        Ok((artifact, digest))
    }

    /// Hand the artifact to the notifier; failures are logged, never raised
    async fn send_notification(&self, id: Uuid, target: &str, artifact: &Path) {
        let filename = artifact
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let body = format!(
            "Translation job {} finished. The translated document {} is attached.",
            id, filename
        );

        match self
            .notifier
            .send(target, "Your translated document is ready", &body, artifact)
            .await
        {
            Ok(()) => info!("Job {}: notified {} via {}", id, target, self.notifier.name()),
            Err(e) => warn!("Job {}: notification to {} failed: {}", id, target, e),
        }
    }

    fn cleanup_staged(&self, id: Uuid, staged: &Path) {
        if let Err(e) = FileManager::remove_file_idempotent(staged) {
            warn!("Job {}: could not remove staged input: {}", id, e);
        }
    }
}
