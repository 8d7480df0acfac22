/*!
 * Domain glossary for terminology-consistent translation.
 *
 * The glossary is loaded once at startup from a JSON file containing an array
 * of source/target term pairs. Source terms are case-folded at load time so
 * that lookups are case-insensitive. After loading, the table is immutable
 * and shared read-only across all translation calls.
 */

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde::Deserialize;

use crate::errors::ConfigError;

/// One source/target term pair as it appears in the glossary file.
#[derive(Debug, Clone, Deserialize)]
pub struct GlossaryEntry {
    /// Source-language term
    pub source: String,
    /// Target-language rendering
    pub target: String,
}

/// Immutable term table, keyed by case-folded source term.
///
/// Entry order is file order. A duplicated source term keeps its first
/// position but takes the last target seen, mirroring a keyed update.
#[derive(Debug, Default)]
pub struct GlossaryTable {
    entries: Vec<GlossaryEntry>,
}

impl GlossaryTable {
    /// Load a glossary from a JSON file.
    ///
    /// Fails if the file is missing, is not a JSON array of
    /// `{"source": ..., "target": ...}` objects, or contains an entry with
    /// an empty source term. Failure here is fatal for the application.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Arc<GlossaryTable>, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let raw: Vec<GlossaryEntry> =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let table = Self::from_entries(raw)?;
        info!("Loaded glossary with {} terms from {}", table.len(), path.display());
        Ok(Arc::new(table))
    }

    /// Build a table from already-parsed entries, folding keys.
    pub fn from_entries(raw: Vec<GlossaryEntry>) -> Result<GlossaryTable, ConfigError> {
        let mut entries: Vec<GlossaryEntry> = Vec::with_capacity(raw.len());
        for entry in raw {
            let folded = entry.source.trim().to_lowercase();
            if folded.is_empty() {
                return Err(ConfigError::MissingField("glossary entry source".to_string()));
            }
            match entries.iter_mut().find(|e| e.source == folded) {
                Some(existing) => existing.target = entry.target,
                None => entries.push(GlossaryEntry { source: folded, target: entry.target }),
            }
        }
        Ok(GlossaryTable { entries })
    }

    /// Number of terms in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no terms.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find every glossary term contained in `text`, case-insensitively.
    ///
    /// Returns (source, target) pairs in table order. The scan folds the
    /// input once and does a substring check per term; glossaries are small
    /// enough that a linear pass beats building an automaton.
    pub fn relevant_hints(&self, text: &str) -> Vec<(&str, &str)> {
        let folded = text.to_lowercase();
        let hints: Vec<(&str, &str)> = self
            .entries
            .iter()
            .filter(|e| folded.contains(e.source.as_str()))
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        debug!("Glossary scan matched {} of {} terms", hints.len(), self.entries.len());
        hints
    }
}
