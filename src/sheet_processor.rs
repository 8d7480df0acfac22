use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, Context, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::file_utils::FileManager;

// @module: Tabular document model and cell extraction

// @struct: One cell in a sheet grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    // @variant: Boolean cell
    Bool(bool),
    // @variant: Numeric cell
    Number(f64),
    // @variant: String cell
    Text(String),
    // @variant: Blank cell, serialized as null
    Empty,
}

impl CellValue {
    /// The cell's text when it holds a string with non-whitespace content,
    /// otherwise None. Only these cells are extracted for translation;
    /// numbers, booleans, blanks and whitespace-only strings pass through
    /// a rewrite untouched.
    pub fn translatable_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Empty => Ok(()),
        }
    }
}

/// 1-based cell coordinates within a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellLocation {
    /// Row index, first row is 1
    pub row: u32,
    /// Column index, first column is 1
    pub col: u32,
}

impl fmt::Display for CellLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "R{}C{}", self.row, self.col)
    }
}

/// A single named sheet holding a row-major cell grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name
    pub name: String,
    /// Cell grid, outer index is rows
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Sheet { name: name.into(), rows: Vec::new() }
    }

    /// Read a cell; out-of-range coordinates read as Empty
    pub fn cell(&self, location: CellLocation) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(location.row as usize - 1)
            .and_then(|r| r.get(location.col as usize - 1))
            .unwrap_or(&EMPTY)
    }

    /// Overwrite a cell that was previously scanned from this sheet
    pub fn set_cell(&mut self, location: CellLocation, value: CellValue) -> Result<()> {
        let row = self
            .rows
            .get_mut(location.row as usize - 1)
            .ok_or_else(|| anyhow!("Row {} out of range in sheet '{}'", location.row, self.name))?;
        let cell = row
            .get_mut(location.col as usize - 1)
            .ok_or_else(|| anyhow!("Column {} out of range in sheet '{}'", location.col, self.name))?;
        *cell = value;
        Ok(())
    }
}

/// A document: an ordered list of sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    /// Sheets in document order
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Workbook { sheets: Vec::new() }
    }

    /// Load a workbook from its JSON grid representation
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        let workbook: Workbook = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse workbook: {:?}", path))?;
        debug!("Loaded workbook with {} sheets from {:?}", workbook.sheets.len(), path);
        Ok(workbook)
    }

    /// Save the workbook as JSON, atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize workbook")?;
        FileManager::write_atomic(path, &content)?;
        Ok(path.to_path_buf())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

/// The extracted translatable content of one sheet: fragment texts and the
/// cell locations they came from, index-aligned
///
/// The two sequences are built in lockstep and the constructor rejects any
/// attempt to pair sequences of different lengths, so an index valid for one
/// is always valid for the other.
#[derive(Debug, Clone)]
pub struct SheetScan {
    fragments: Vec<String>,
    locations: Vec<CellLocation>,
}

impl SheetScan {
    /// Pair fragment and location sequences, rejecting unequal lengths and
    /// coordinates outside the 1-based grid
    pub fn new(fragments: Vec<String>, locations: Vec<CellLocation>) -> Result<Self> {
        if fragments.len() != locations.len() {
            return Err(anyhow!(
                "Fragment/location length mismatch: {} fragments, {} locations",
                fragments.len(),
                locations.len()
            ));
        }
        if let Some(bad) = locations.iter().find(|l| l.row == 0 || l.col == 0) {
            return Err(anyhow!("Cell location {} is not 1-based", bad));
        }
        Ok(SheetScan { fragments, locations })
    }

    /// Extract all non-empty string cells of a sheet in row-major order
    pub fn of_sheet(sheet: &Sheet) -> Self {
        let mut fragments = Vec::new();
        let mut locations = Vec::new();

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                if let Some(text) = cell.translatable_text() {
                    fragments.push(text.to_string());
                    locations.push(CellLocation {
                        row: row_idx as u32 + 1,
                        col: col_idx as u32 + 1,
                    });
                }
            }
        }

        debug!("Scanned sheet '{}': {} translatable cells", sheet.name, fragments.len());
        SheetScan { fragments, locations }
    }

    /// Extracted fragment texts in scan order
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Source locations, aligned with fragments()
    pub fn locations(&self) -> &[CellLocation] {
        &self.locations
    }

    /// Number of extracted fragments
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the sheet had no translatable cells
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragments grouped into translation batches of at most `size`
    pub fn batches(&self, size: usize) -> std::slice::Chunks<'_, String> {
        self.fragments.chunks(size.max(1))
    }
}
