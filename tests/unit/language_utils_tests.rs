/*!
 * Tests for language utility functions
 */

use anyhow::Result;
use transheet::language_utils::{get_language_name, language_codes_match, validate_language_code};

/// Test validation of language codes
#[test]
fn test_validate_language_code_withValidCodes_shouldAccept() {
    // ISO 639-1 tests
    assert!(validate_language_code("vi").is_ok());
    assert!(validate_language_code("zh").is_ok());
    assert!(validate_language_code("en").is_ok());

    // ISO 639-3 tests
    assert!(validate_language_code("vie").is_ok());
    assert!(validate_language_code("zho").is_ok());
    assert!(validate_language_code("eng").is_ok());

    // Whitespace and case tests
    assert!(validate_language_code(" VI ").is_ok());
    assert!(validate_language_code("ZHO").is_ok());
}

/// Test rejection of invalid language codes
#[test]
fn test_validate_language_code_withInvalidCodes_shouldReject() {
    assert!(validate_language_code("xyz").is_err());
    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("v").is_err());
    assert!(validate_language_code("").is_err());
    assert!(validate_language_code("vietnamese").is_err());
}

/// Test resolution of codes to English display names
#[test]
fn test_get_language_name_withValidCodes_shouldReturnEnglishName() -> Result<()> {
    assert_eq!(get_language_name("vi")?, "Vietnamese");
    assert_eq!(get_language_name("zh")?, "Chinese");
    assert_eq!(get_language_name("ja")?, "Japanese");

    // Both code lengths resolve to the same name
    assert_eq!(get_language_name("vie")?, get_language_name("vi")?);
    assert_eq!(get_language_name("zho")?, get_language_name("zh")?);

    Ok(())
}

/// Test that unknown codes produce a resolution error
#[test]
fn test_get_language_name_withUnknownCode_shouldFail() {
    let result = get_language_name("qq");
    assert!(result.is_err());
    let message = format!("{}", result.unwrap_err());
    assert!(message.contains("Invalid language code"));
    assert!(message.contains("qq"));
}

/// Test matching of different language code formats
#[test]
fn test_language_codes_match_withMatchingCodes_shouldReturnTrue() {
    assert!(language_codes_match("vi", "vie"));
    assert!(language_codes_match("vie", "vi"));
    assert!(language_codes_match("zh", "zho"));
    assert!(language_codes_match("zho", "zho"));

    // Case insensitivity
    assert!(language_codes_match("VI", "vie"));
    assert!(language_codes_match("ZH", "Zho"));

    // Whitespace
    assert!(language_codes_match(" vi ", "vie"));
}

/// Test non-matching of distinct languages and unresolvable codes
#[test]
fn test_language_codes_match_withNonMatchingCodes_shouldReturnFalse() {
    assert!(!language_codes_match("vi", "zh"));
    assert!(!language_codes_match("vie", "zho"));

    // An unresolvable side never matches, even against itself
    assert!(!language_codes_match("xx", "vi"));
    assert!(!language_codes_match("xx", "xx"));
}
