/*!
 * Notification transport for finished artifacts.
 *
 * Notification is best-effort by contract: the job engine logs failures and
 * never lets them affect job status. The shipped transport pipes a composed
 * MIME message to a `sendmail`-compatible command; tests use the recording
 * transport instead.
 */

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::app_config::NotifyConfig;
use crate::errors::NotifyError;

/// Delivers a finished artifact to a target address
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Send `body` with the artifact attached to `target`
    async fn send(
        &self,
        target: &str,
        subject: &str,
        body: &str,
        attachment: &Path,
    ) -> Result<(), NotifyError>;

    /// Transport name for logging
    fn name(&self) -> &str;
}

/// Pipes messages to a local `sendmail`-compatible command
///
/// The command is run with `-t` so recipients are taken from the message
/// headers, and is killed if it does not finish within the configured
/// timeout.
#[derive(Debug, Clone)]
pub struct SendmailNotifier {
    command: String,
    from: String,
    timeout_ms: u64,
}

impl SendmailNotifier {
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            command: config.command.clone(),
            from: config.from.clone(),
            timeout_ms: config.timeout_ms,
        }
    }

    /// Compose an RFC 5322 message with the artifact as a text attachment
    ///
    /// Artifacts are UTF-8 JSON, so they travel as an 8bit text part with no
    /// further encoding.
    fn compose(
        &self,
        target: &str,
        subject: &str,
        body: &str,
        attachment: &Path,
    ) -> Result<String, NotifyError> {
        let content = std::fs::read_to_string(attachment)
            .map_err(|e| NotifyError::Attachment(format!("{}: {}", attachment.display(), e)))?;
        let filename = attachment
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());

        let token: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(24)
            .map(char::from)
            .collect();
        let boundary = format!("=_{}", token);

        let mut message = String::new();
        message.push_str(&format!("From: {}\n", self.from));
        message.push_str(&format!("To: {}\n", target));
        message.push_str(&format!("Subject: {}\n", subject));
        message.push_str("MIME-Version: 1.0\n");
        message.push_str(&format!(
            "Content-Type: multipart/mixed; boundary=\"{}\"\n\n",
            boundary
        ));

        message.push_str(&format!("--{}\n", boundary));
        message.push_str("Content-Type: text/plain; charset=utf-8\n\n");
        message.push_str(body);
        message.push_str("\n\n");

        message.push_str(&format!("--{}\n", boundary));
        message.push_str("Content-Type: application/json; charset=utf-8\n");
        message.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\n",
            filename
        ));
        message.push_str("Content-Transfer-Encoding: 8bit\n\n");
        message.push_str(&content);
        message.push_str(&format!("\n--{}--\n", boundary));

        Ok(message)
    }
}

#[async_trait]
impl Notifier for SendmailNotifier {
    async fn send(
        &self,
        target: &str,
        subject: &str,
        body: &str,
        attachment: &Path,
    ) -> Result<(), NotifyError> {
        let message = self.compose(target, subject, body, attachment)?;

        let mut child = Command::new(&self.command)
            .arg("-t")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| NotifyError::Spawn(format!("{}: {}", self.command, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(message.as_bytes())
                .await
                .map_err(|e| NotifyError::CommandFailed(format!("stdin write: {}", e)))?;
        }

        let output = tokio::select! {
            result = child.wait_with_output() => {
                result.map_err(|e| NotifyError::CommandFailed(e.to_string()))?
            },
            _ = tokio::time::sleep(Duration::from_millis(self.timeout_ms)) => {
                return Err(NotifyError::Timeout(self.timeout_ms));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotifyError::CommandFailed(stderr.trim().to_string()));
        }

        debug!("Notification for '{}' handed to {}", target, self.command);
        Ok(())
    }

    fn name(&self) -> &str {
        "Sendmail"
    }
}

/// Discards every notification
#[derive(Debug, Clone, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(
        &self,
        target: &str,
        _subject: &str,
        _body: &str,
        _attachment: &Path,
    ) -> Result<(), NotifyError> {
        debug!("Dropping notification for '{}'", target);
        Ok(())
    }

    fn name(&self) -> &str {
        "Null"
    }
}

/// One delivery captured by the recording transport
#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub target: String,
    pub subject: String,
    pub body: String,
    pub attachment: PathBuf,
}

/// Captures deliveries in memory, optionally failing each one
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every delivery fails after being recorded
    pub fn failing() -> Self {
        Self { sent: Arc::new(Mutex::new(Vec::new())), fail: true }
    }

    /// Deliveries captured so far
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl Clone for RecordingNotifier {
    // Clones observe the same deliveries
    fn clone(&self) -> Self {
        Self { sent: Arc::clone(&self.sent), fail: self.fail }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        target: &str,
        subject: &str,
        body: &str,
        attachment: &Path,
    ) -> Result<(), NotifyError> {
        self.sent.lock().push(SentNotification {
            target: target.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            attachment: attachment.to_path_buf(),
        });

        if self.fail {
            return Err(NotifyError::CommandFailed("recording transport set to fail".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Recording"
    }
}
