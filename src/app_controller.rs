use anyhow::{Result, anyhow};
use log::{error, warn, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use indicatif::{ProgressBar, ProgressStyle, MultiProgress};
use uuid::Uuid;

use crate::app_config::{Config, TranslationProvider};
use crate::file_utils::{DOCUMENT_SUFFIX, FileManager};
use crate::glossary::GlossaryTable;
use crate::jobs::{JobEngine, JobRegistry, JobStatus};
use crate::notify::{Notifier, SendmailNotifier};
use crate::providers::{Gemini, MockProvider, Provider};

// @module: Application controller for document translation

/// How often terminal job states are polled for
const POLL_INTERVAL_MS: u64 = 100;

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Loaded glossary, shared with the engine
    glossary: Arc<GlossaryTable>,
    // @field: Translation provider, shared with the engine
    provider: Arc<dyn Provider>,
    // @field: Background job engine
    engine: JobEngine,
}

impl Controller {
    /// Create a controller for tests: mock provider, empty glossary
    ///
    /// Staging directories live under the system temp directory so the
    /// working directory stays clean.
    pub fn new_for_test() -> Result<Self> {
        let mut config = Config::default();
        config.translation.provider = TranslationProvider::Mock;
        let staging = std::env::temp_dir().join("transheet-test");
        config.jobs.upload_dir = staging.join("uploads").display().to_string();
        config.jobs.download_dir = staging.join("downloads").display().to_string();
        Self::with_parts(config, Arc::new(GlossaryTable::default()))
    }

    // @method: Create a controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let glossary = GlossaryTable::load(&config.glossary_path)?;
        Self::with_parts(config, glossary)
    }

    /// Build the provider, notifier and engine around a loaded glossary
    fn with_parts(config: Config, glossary: Arc<GlossaryTable>) -> Result<Self> {
        config.validate()?;

        let provider = Self::build_provider(&config);
        let notifier: Arc<dyn Notifier> = Arc::new(SendmailNotifier::new(&config.notify));
        let engine = JobEngine::new(
            config.clone(),
            JobRegistry::new(),
            provider.clone(),
            glossary.clone(),
            notifier,
        )?;

        Ok(Self { config, glossary, provider, engine })
    }

    fn build_provider(config: &Config) -> Arc<dyn Provider> {
        match config.translation.provider {
            TranslationProvider::Gemini => Arc::new(Gemini::new_with_config(
                config.translation.get_api_key(),
                config.translation.endpoint.clone(),
                config.translation.model.clone(),
                config.translation.temperature,
                config.translation.timeout_secs,
            )),
            TranslationProvider::Mock => Arc::new(MockProvider::working()),
        }
    }

    /// Verify configuration, glossary and provider connectivity
    pub async fn check(&self) -> Result<()> {
        info!(
            "Configuration valid: {} -> {}, provider {} ({})",
            self.config.source_language,
            self.config.target_language,
            self.config.translation.provider.display_name(),
            self.config.translation.model
        );
        info!(
            "Glossary: {} term(s) from {}",
            self.glossary.len(),
            self.config.glossary_path
        );

        self.provider
            .test_connection()
            .await
            .map_err(|e| anyhow!("Provider check failed: {}", e))?;
        info!("Provider {} is reachable", self.provider.name());

        Ok(())
    }

    /// Run the main workflow for a single document
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        notify_target: Option<String>,
        force_overwrite: bool,
    ) -> Result<()> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(input_file, output_dir, notify_target, &multi_progress, force_overwrite)
            .await
    }

    /// Submit one document as a job and follow it to its terminal state
    async fn run_with_progress(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        notify_target: Option<String>,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        FileManager::ensure_dir(&output_dir)?;

        // Check if a translation already exists
        let output_path = FileManager::generate_output_path(
            &input_file,
            &output_dir,
            &self.config.target_language,
        );
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite)");
            return Ok(());
        }

        let file_name = input_file
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let id = self.engine.submit(&input_file, notify_target)?;

        // Spin until the job is terminal; the engine logs batch progress
        let progress_bar = multi_progress.add(ProgressBar::new_spinner());
        let template_result = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress_bar.set_style(template_result);
        progress_bar.set_message(format!("Translating: {}", file_name));

        let record = loop {
            match self.engine.status(id) {
                Some(record) if record.status.is_terminal() => break record,
                Some(_) => {}
                None => return Err(anyhow!("Job {} disappeared from the registry", id)),
            }
            progress_bar.tick();
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        };
        progress_bar.finish_and_clear();

        match record.status {
            JobStatus::Completed { .. } => {
                self.finalize_artifact(id, &output_path)?;
            }
            JobStatus::Failed { error } => {
                return Err(anyhow!("Translation of {} failed: {}", file_name, error));
            }
            JobStatus::Processing => unreachable!("loop exits on terminal states only"),
        }

        info!(
            "Translation completed in {}.",
            Self::format_duration(start_time.elapsed())
        );

        Ok(())
    }

    /// Claim a completed job's artifact and move it to its final path
    ///
    /// The artifact digest is recomputed before the move, so a file damaged
    /// between completion and fetch is caught here instead of being shipped.
    fn finalize_artifact(&self, id: Uuid, output_path: &Path) -> Result<PathBuf> {
        let (artifact, digest) = self
            .engine
            .fetch(id)
            .ok_or_else(|| anyhow!("Artifact of job {} was already consumed", id))?;

        let actual = FileManager::sha256_digest(&artifact)?;
        if actual != digest {
            return Err(anyhow!(
                "Artifact digest mismatch for job {}: expected {}, found {}",
                id,
                digest,
                actual
            ));
        }

        // Copy then delete; a plain rename can fail across filesystems
        FileManager::copy_file(&artifact, output_path)?;
        FileManager::remove_file_idempotent(&artifact)?;

        info!("Success: {}", output_path.display());
        Ok(output_path.to_path_buf())
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Run the workflow in folder mode, translating every document in a
    /// directory tree
    ///
    /// Documents are submitted as independent jobs up front, so the engine's
    /// worker pool bounds how many translate in parallel. Files that already
    /// have a translation are skipped unless overwriting is forced.
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        notify_target: Option<String>,
        force_overwrite: bool,
    ) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        if !input_dir.exists() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        // Finished translations are documents too; keep them out of the
        // input set or a second run would translate its own output
        let translated_suffix =
            format!(".{}{}", self.config.target_language, DOCUMENT_SUFFIX);
        let documents: Vec<PathBuf> = FileManager::find_documents(&input_dir)?
            .into_iter()
            .filter(|p| {
                p.file_name()
                    .map(|n| !n.to_string_lossy().ends_with(&translated_suffix))
                    .unwrap_or(true)
            })
            .collect();
        if documents.is_empty() {
            return Err(anyhow!("No documents found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(documents.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        // Track success and failure counts
        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        // Submit everything first; the engine's pool limits the parallelism
        let mut pending: Vec<(Uuid, String, PathBuf)> = Vec::new();
        for document in &documents {
            let file_name = document
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            let output_dir = document
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| input_dir.clone());
            let output_path = FileManager::generate_output_path(
                document,
                &output_dir,
                &self.config.target_language,
            );
            if output_path.exists() && !force_overwrite {
                warn!("Skipping file, translation already exists (use -f to force overwrite)");
                skip_count += 1;
                folder_pb.inc(1);
                continue;
            }

            match self.engine.submit(document, notify_target.clone()) {
                Ok(id) => pending.push((id, file_name, output_path)),
                Err(e) => {
                    error!("Error submitting file {}: {}", file_name, e);
                    error_count += 1;
                    folder_pb.inc(1);
                }
            }
        }

        // Collect jobs as they reach their terminal states
        while !pending.is_empty() {
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;

            let mut still_running = Vec::new();
            for (id, file_name, output_path) in pending {
                match self.engine.status(id) {
                    Some(record) if record.status.is_terminal() => {
                        match record.status {
                            JobStatus::Completed { .. } => {
                                match self.finalize_artifact(id, &output_path) {
                                    Ok(_) => success_count += 1,
                                    Err(e) => {
                                        error!("Error processing file {}: {}", file_name, e);
                                        error_count += 1;
                                    }
                                }
                            }
                            JobStatus::Failed { error } => {
                                error!("Error processing file {}: {}", file_name, error);
                                error_count += 1;
                            }
                            JobStatus::Processing => {}
                        }
                        folder_pb.inc(1);
                    }
                    Some(_) => still_running.push((id, file_name, output_path)),
                    None => {
                        error!("Job for file {} disappeared from the registry", file_name);
                        error_count += 1;
                        folder_pb.inc(1);
                    }
                }
            }
            pending = still_running;
        }

        folder_pb.finish_with_message("Folder processing complete");

        let duration = start_time.elapsed();
        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors - Duration: {}",
            success_count,
            skip_count,
            error_count,
            Self::format_duration(duration)
        );

        Ok(())
    }
}
