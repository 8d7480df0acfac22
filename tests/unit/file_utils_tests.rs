/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;

use anyhow::Result;
use transheet::file_utils::FileManager;

use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    // Create a temporary test file
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "test_file_exists.tmp",
        "test content",
    )?;

    // Test that file_exists works correctly
    assert!(FileManager::file_exists(test_file.to_str().unwrap()));

    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that generate_output_path tags the language between stem and suffix
#[test]
fn test_generate_output_path_withDocumentSuffix_shouldTagLanguage() {
    let input_file = Path::new("/tmp/input/report.grid.json");
    let output_dir = Path::new("/tmp/output");

    let output_path = FileManager::generate_output_path(input_file, output_dir, "zh");

    assert_eq!(output_path, Path::new("/tmp/output/report.zh.grid.json"));
}

/// Test that generate_output_path falls back to the file stem for other names
#[test]
fn test_generate_output_path_withPlainFile_shouldUseStem() {
    let input_file = Path::new("/tmp/input/report.json");
    let output_dir = Path::new("/tmp/output");

    let output_path = FileManager::generate_output_path(input_file, output_dir, "zh");

    assert_eq!(output_path, Path::new("/tmp/output/report.zh.grid.json"));
}

/// Test that dir_exists returns true for existing directories
#[test]
fn test_dir_exists_withExistingDir_shouldReturnTrue() -> Result<()> {
    // Use the current directory which definitely exists
    let current_dir = ".";

    // Test that dir_exists works correctly
    assert!(FileManager::dir_exists(current_dir));

    Ok(())
}

/// Test that dir_exists returns false for non-existent directories
#[test]
fn test_dir_exists_withNonExistentDir_shouldReturnFalse() {
    assert!(!FileManager::dir_exists("./non_existent_directory_12345"));
}

/// Test that ensure_dir creates directories as needed
#[test]
fn test_ensure_dir_withNonExistentDir_shouldCreateDirectory() -> Result<()> {
    // Create a temporary directory for testing
    let temp_dir = common::create_temp_dir()?;
    let test_subdir = temp_dir.path().join("test_subdir");

    // Ensure the subdirectory exists (should create it)
    FileManager::ensure_dir(test_subdir.to_str().unwrap())?;

    // Verify the directory was created
    assert!(test_subdir.exists());
    assert!(test_subdir.is_dir());

    Ok(())
}

/// Test that read_to_string returns file content correctly
#[test]
fn test_read_to_string_withValidFile_shouldReturnContent() -> Result<()> {
    // Create a temporary test file
    let temp_dir = common::create_temp_dir()?;
    let content = "Hello, World!";
    let test_file = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "test_read_file.tmp",
        content,
    )?;

    // Test read_to_string
    let read_content = FileManager::read_to_string(test_file.to_str().unwrap())?;
    assert_eq!(read_content, content);

    Ok(())
}

/// Test that write_to_file creates file with content correctly
#[test]
fn test_write_to_file_withValidInput_shouldCreateFileWithContent() -> Result<()> {
    // Create a temporary directory for testing
    let temp_dir = common::create_temp_dir()?;
    let test_file = temp_dir.path().join("test_write_file.tmp");
    let content = "Test write content";

    // Write to the file
    FileManager::write_to_file(test_file.to_str().unwrap(), content)?;

    // Verify content was written
    let read_content = fs::read_to_string(&test_file)?;
    assert_eq!(read_content, content);

    Ok(())
}

/// Test that write_atomic leaves the final content in place
#[test]
fn test_write_atomic_withExistingFile_shouldReplaceContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = temp_dir.path().join("test_atomic.tmp");

    FileManager::write_atomic(&test_file, "first")?;
    FileManager::write_atomic(&test_file, "second")?;

    assert_eq!(fs::read_to_string(&test_file)?, "second");

    Ok(())
}

/// Test that copy_file duplicates content and creates parent directories
#[test]
fn test_copy_file_withNestedDestination_shouldCopyContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "source.tmp",
        "copy me",
    )?;
    let destination = temp_dir.path().join("nested").join("dir").join("copy.tmp");

    FileManager::copy_file(&source, &destination)?;

    assert_eq!(fs::read_to_string(&destination)?, "copy me");
    // Source must survive the copy
    assert!(source.exists());

    Ok(())
}

/// Test that find_documents finds grid documents recursively
#[test]
fn test_find_documents_withMixedTree_shouldReturnOnlyDocuments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().to_path_buf();
    let subdir = root.join("nested");
    fs::create_dir_all(&subdir)?;

    common::create_test_document(&root, "top.grid.json")?;
    common::create_test_document(&subdir, "deep.grid.json")?;
    // Case-insensitive suffix match
    common::create_test_document(&root, "SHOUTING.GRID.JSON")?;
    // These must not show up
    common::create_test_file(&root, "notes.txt", "not a document")?;
    common::create_test_file(&root, "data.json", "{}")?;

    let mut found = FileManager::find_documents(&root)?;
    found.sort();

    assert_eq!(found.len(), 3);
    assert!(found.iter().any(|p| p.ends_with("top.grid.json")));
    assert!(found.iter().any(|p| p.ends_with("nested/deep.grid.json")));
    assert!(found.iter().any(|p| p.ends_with("SHOUTING.GRID.JSON")));

    Ok(())
}

/// Test that find_documents returns an empty list for a directory without documents
#[test]
fn test_find_documents_withNoDocuments_shouldReturnEmptyList() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(&temp_dir.path().to_path_buf(), "readme.md", "hi")?;

    let found = FileManager::find_documents(temp_dir.path())?;
    assert!(found.is_empty());

    Ok(())
}

/// Test that sha256_digest is stable for identical content
#[test]
fn test_sha256_digest_withSameContent_shouldMatch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let first = common::create_test_file(&dir, "a.bin", "identical bytes")?;
    let second = common::create_test_file(&dir, "b.bin", "identical bytes")?;

    let digest_a = FileManager::sha256_digest(&first)?;
    let digest_b = FileManager::sha256_digest(&second)?;

    assert_eq!(digest_a, digest_b);
    // Lowercase hex, 32 bytes
    assert_eq!(digest_a.len(), 64);
    assert!(digest_a.chars().all(|c| c.is_ascii_hexdigit()));

    Ok(())
}

/// Test that sha256_digest changes when content changes
#[test]
fn test_sha256_digest_withDifferentContent_shouldDiffer() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let first = common::create_test_file(&dir, "a.bin", "one")?;
    let second = common::create_test_file(&dir, "b.bin", "two")?;

    assert_ne!(
        FileManager::sha256_digest(&first)?,
        FileManager::sha256_digest(&second)?
    );

    Ok(())
}

/// Test the well-known digest of the empty input
#[test]
fn test_sha256_digest_withEmptyFile_shouldMatchKnownVector() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let empty = common::create_test_file(&temp_dir.path().to_path_buf(), "empty.bin", "")?;

    assert_eq!(
        FileManager::sha256_digest(&empty)?,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );

    Ok(())
}

/// Test that remove_file_idempotent succeeds on both present and absent files
#[test]
fn test_remove_file_idempotent_calledTwice_shouldSucceedBothTimes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "removable.tmp",
        "soon gone",
    )?;

    FileManager::remove_file_idempotent(&test_file)?;
    assert!(!test_file.exists());

    // Second removal of a missing file must not error
    FileManager::remove_file_idempotent(&test_file)?;

    Ok(())
}
