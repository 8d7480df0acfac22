/*!
 * Integration tests for the document translation workflow
 */

use std::fs;

use anyhow::Result;
use tempfile::TempDir;

use transheet::app_controller::Controller;
use transheet::sheet_processor::{CellLocation, CellValue, Workbook};

use crate::common;

/// Build a controller whose config points at a real glossary file
fn workflow_controller(temp_dir: &TempDir) -> Result<Controller> {
    let mut config = common::test_config(temp_dir);
    let glossary_path =
        common::create_test_glossary(&temp_dir.path().to_path_buf(), "glossary.json")?;
    config.glossary_path = glossary_path.display().to_string();
    let controller = Controller::with_config(config)?;
    Ok(controller)
}

/// Test translating one document into a separate output directory
#[test]
fn test_workflow_singleDocument_shouldWriteTaggedOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_dir = temp_dir.path().join("in");
    let output_dir = temp_dir.path().join("out");
    fs::create_dir_all(&input_dir)?;

    let input =
        common::create_single_sheet_document(&input_dir, "report.grid.json", &["xin chào"])?;
    let controller = workflow_controller(&temp_dir)?;

    tokio_test::block_on(controller.run(input, output_dir.clone(), None, false))?;

    let output_path = output_dir.join("report.zh.grid.json");
    assert!(output_path.exists());

    let workbook = Workbook::load(&output_path)?;
    assert_eq!(
        workbook.sheets[0].cell(CellLocation { row: 1, col: 1 }),
        &CellValue::Text("xin chào\n[TRANSLATED] xin chào".to_string())
    );

    Ok(())
}

/// Test that forcing an overwrite replaces a stale translation
#[test]
fn test_workflow_forceOverwrite_shouldReplaceExistingOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let work_dir = temp_dir.path().join("work");
    fs::create_dir_all(&work_dir)?;

    let input =
        common::create_single_sheet_document(&work_dir, "report.grid.json", &["xin chào"])?;
    let stale_output = work_dir.join("report.zh.grid.json");
    fs::write(&stale_output, "stale translation")?;

    let controller = workflow_controller(&temp_dir)?;

    // Without force the stale file survives
    tokio_test::block_on(controller.run(input.clone(), work_dir.clone(), None, false))?;
    assert_eq!(fs::read_to_string(&stale_output)?, "stale translation");

    // With force it is replaced by a real document
    tokio_test::block_on(controller.run(input, work_dir.clone(), None, true))?;
    let workbook = Workbook::load(&stale_output)?;
    assert_eq!(
        workbook.sheets[0].cell(CellLocation { row: 1, col: 1 }),
        &CellValue::Text("xin chào\n[TRANSLATED] xin chào".to_string())
    );

    Ok(())
}

/// Test folder mode across a nested directory tree
#[test]
fn test_workflow_folderMode_shouldTranslateNestedDocuments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_dir = temp_dir.path().join("batch");
    let nested_dir = input_dir.join("nested");
    fs::create_dir_all(&nested_dir)?;

    common::create_single_sheet_document(&input_dir, "a.grid.json", &["một"])?;
    common::create_single_sheet_document(&nested_dir, "b.grid.json", &["hai"])?;

    let controller = workflow_controller(&temp_dir)?;
    tokio_test::block_on(controller.run_folder(input_dir.clone(), None, false))?;

    // Outputs land next to their inputs
    assert!(input_dir.join("a.zh.grid.json").exists());
    assert!(nested_dir.join("b.zh.grid.json").exists());

    Ok(())
}

/// Test that folder mode never translates its own outputs
///
/// A second pass over the same folder must see the finished translations
/// and produce nothing new.
#[test]
fn test_workflow_folderMode_runTwice_shouldNotRetranslateOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_dir = temp_dir.path().join("batch");
    fs::create_dir_all(&input_dir)?;

    common::create_single_sheet_document(&input_dir, "a.grid.json", &["một"])?;

    let controller = workflow_controller(&temp_dir)?;
    tokio_test::block_on(controller.run_folder(input_dir.clone(), None, false))?;
    tokio_test::block_on(controller.run_folder(input_dir.clone(), None, false))?;

    let mut names: Vec<String> = fs::read_dir(&input_dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
        .collect::<std::io::Result<_>>()?;
    names.sort();

    // Exactly the original and one translation; no a.zh.zh.grid.json
    assert_eq!(names, vec!["a.grid.json".to_string(), "a.zh.grid.json".to_string()]);

    Ok(())
}

/// Test that folder mode fails on a directory with nothing to translate
#[test]
fn test_workflow_folderMode_withoutDocuments_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_dir = temp_dir.path().join("empty");
    fs::create_dir_all(&input_dir)?;
    common::create_test_file(&input_dir, "notes.txt", "nothing translatable")?;

    let controller = workflow_controller(&temp_dir)?;
    let result = tokio_test::block_on(controller.run_folder(input_dir, None, false));

    assert!(result.is_err());
    assert!(format!("{}", result.unwrap_err()).contains("No documents found"));

    Ok(())
}
