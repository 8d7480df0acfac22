/*!
 * Workbook rewriting: scanning, batch translation and bilingual merge.
 *
 * Each sheet is processed independently. Its translatable cells are scanned
 * in row-major order, translated batch by batch, reconciled against the
 * original fragment count, and only then written back. A sheet that fails
 * reconciliation is left completely untouched while the remaining sheets
 * still proceed.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, info};

use crate::errors::SheetError;
use crate::sheet_processor::{CellValue, Sheet, SheetScan, Workbook};

use super::batch::BatchTranslator;

/// Shared cancellation flag polled between batches
///
/// Nothing in the public pipeline sets it today; the rewriter checks it so
/// a future job handle can stop work between provider calls.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an unset token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// What one rewrite pass did
#[derive(Debug, Clone, Default)]
pub struct RewriteSummary {
    /// Sheets rewritten (possibly with zero changed cells)
    pub sheets_processed: usize,

    /// Sheets skipped because they held no translatable cells
    pub sheets_skipped: usize,

    /// Names of sheets left untouched after a reconciliation failure
    pub sheets_failed: Vec<String>,

    /// Fragments extracted across all processed sheets
    pub fragments_total: usize,

    /// Cells whose value actually changed
    pub cells_rewritten: usize,
}

impl RewriteSummary {
    /// Whether any sheet failed reconciliation
    pub fn has_failures(&self) -> bool {
        !self.sheets_failed.is_empty()
    }
}

/// Drives batch translation over a whole workbook
pub struct WorkbookRewriter {
    translator: BatchTranslator,
    chunk_size: usize,
    cancel: CancelToken,
}

impl WorkbookRewriter {
    /// Create a rewriter translating `chunk_size` cells per batch
    pub fn new(translator: BatchTranslator, chunk_size: usize) -> Self {
        Self {
            translator,
            chunk_size: chunk_size.max(1),
            cancel: CancelToken::new(),
        }
    }

    /// Attach an externally owned cancellation token
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Access to the translator, mainly for its stats
    pub fn translator(&self) -> &BatchTranslator {
        &self.translator
    }

    /// Translate and rewrite every sheet of the workbook in place
    ///
    /// Batches run strictly one after another; `progress_callback` receives
    /// (batches done, batches total) across the whole workbook after each
    /// batch finishes.
    pub async fn process(
        &self,
        workbook: &mut Workbook,
        progress_callback: impl Fn(usize, usize),
    ) -> Result<RewriteSummary, SheetError> {
        let mut summary = RewriteSummary::default();

        // Scan everything up front so progress can report a workbook-wide total
        let scans: Vec<SheetScan> = workbook.sheets.iter().map(SheetScan::of_sheet).collect();
        let total_batches: usize = scans.iter().map(|s| s.batches(self.chunk_size).len()).sum();
        let mut done_batches = 0usize;

        for (sheet, scan) in workbook.sheets.iter_mut().zip(scans) {
            if scan.is_empty() {
                debug!("Sheet '{}' has no translatable cells, skipping", sheet.name);
                summary.sheets_skipped += 1;
                continue;
            }
            summary.fragments_total += scan.len();

            let mut translated: Vec<String> = Vec::with_capacity(scan.len());
            for chunk in scan.batches(self.chunk_size) {
                if self.cancel.is_cancelled() {
                    return Err(SheetError::Cancelled);
                }

                let delimiter = BatchTranslator::fresh_delimiter(chunk);
                let result = self.translator.translate_batch(chunk, &delimiter).await;
                translated.extend(result);

                done_batches += 1;
                progress_callback(done_batches, total_batches);
            }

            match apply_translations(sheet, &scan, &translated) {
                Ok(rewritten) => {
                    info!(
                        "Sheet '{}': {} of {} cells rewritten",
                        sheet.name,
                        rewritten,
                        scan.len()
                    );
                    summary.sheets_processed += 1;
                    summary.cells_rewritten += rewritten;
                }
                Err(e) => {
                    error!("{}", e);
                    summary.sheets_failed.push(sheet.name.clone());
                }
            }
        }

        Ok(summary)
    }
}

/// Merge translated fragments back into their source cells
///
/// The translation count is verified against the scan before the first
/// write, so a bad pairing leaves the sheet byte-for-byte unchanged. A cell
/// is rewritten to `original + "\n" + translation` only when the trimmed
/// translation is non-empty and differs from the trimmed original; in every
/// other case the original value is kept. Returns the number of cells
/// changed.
pub fn apply_translations(
    sheet: &mut Sheet,
    scan: &SheetScan,
    translations: &[String],
) -> Result<usize, SheetError> {
    if translations.len() != scan.len() {
        return Err(SheetError::IntegrityMismatch {
            sheet: sheet.name.clone(),
            expected: scan.len(),
            actual: translations.len(),
        });
    }

    // Validate every target before the first write; a partial rewrite would
    // be worse than none
    for location in scan.locations() {
        let exists = sheet
            .rows
            .get(location.row as usize - 1)
            .and_then(|r| r.get(location.col as usize - 1))
            .is_some();
        if !exists {
            return Err(SheetError::InvalidLocation {
                sheet: sheet.name.clone(),
                location: location.to_string(),
            });
        }
    }

    let mut rewritten = 0usize;
    for ((original, location), translated) in scan
        .fragments()
        .iter()
        .zip(scan.locations())
        .zip(translations.iter())
    {
        let trimmed = translated.trim();
        if trimmed.is_empty() || original.trim() == trimmed {
            continue;
        }

        if let Some(cell) = sheet
            .rows
            .get_mut(location.row as usize - 1)
            .and_then(|r| r.get_mut(location.col as usize - 1))
        {
            *cell = CellValue::Text(format!("{}\n{}", original, trimmed));
            rewritten += 1;
        }
    }

    Ok(rewritten)
}
