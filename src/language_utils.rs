use isolang::Language;

use crate::errors::ConfigError;

/// Language utilities for ISO language code handling
///
/// This module resolves the ISO 639-1 (2-letter) and ISO 639-3 (3-letter)
/// codes used in configuration into the English display names the prompt
/// builder embeds in translation instructions.
/// Resolve a language code to an isolang Language
fn resolve(code: &str) -> Result<Language, ConfigError> {
    let normalized = code.trim().to_lowercase();

    let lang = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    };

    lang.ok_or_else(|| ConfigError::InvalidLanguage(code.to_string()))
}

/// Validate that a code names a known language
pub fn validate_language_code(code: &str) -> Result<(), ConfigError> {
    resolve(code).map(|_| ())
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String, ConfigError> {
    Ok(resolve(code)?.to_name().to_string())
}

/// Check if two language codes name the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (resolve(code1), resolve(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
