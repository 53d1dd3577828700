//! Message catalog quality validation.
//!
//! Catalog keys are the English source strings. A translation has to keep
//! every `{placeholder}` of its key, otherwise the substituted values would
//! silently disappear from the rendered page.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Problems that make the translation unusable
    pub errors: Vec<String>,

    /// Suspicious differences worth a look
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for catalog entries.
pub struct CatalogValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl CatalogValidator {
    /// Validate one `key -> translation` entry.
    pub fn validate(key: &str, translation: &str) -> ValidationReport {
        let mut report = ValidationReport::default();

        if translation.trim().is_empty() {
            report
                .errors
                .push(format!("Empty translation for '{}'", key));
            return report;
        }

        let expected = Self::extract_placeholders(key);
        let actual = Self::extract_placeholders(translation);
        if expected != actual {
            report.warnings.push(format!(
                "Placeholder mismatch for '{}': expected {:?}, found {:?}",
                key, expected, actual
            ));
        }

        report
    }

    /// Extract `{name}` placeholder names.
    pub fn extract_placeholders(text: &str) -> BTreeSet<String> {
        let regex = PLACEHOLDER_REGEX.get_or_init(|| {
            Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid placeholder regex")
        });

        regex
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_translation() {
        let report = CatalogValidator::validate("Hello, {name}!", "Salut, {name}!");
        assert!(report.is_clean());
    }

    #[test]
    fn test_dropped_placeholder_warns() {
        let report = CatalogValidator::validate("Hello, {name}!", "Salut!");
        assert!(report.has_warnings());
        assert!(!report.has_errors());
        assert!(report.warnings[0].contains("name"));
    }

    #[test]
    fn test_renamed_placeholder_warns() {
        let report = CatalogValidator::validate("{count} messages", "{numar} mesaje");
        assert!(report.has_warnings());
    }

    #[test]
    fn test_reordered_placeholders_are_fine() {
        let report = CatalogValidator::validate("{a} then {b}", "{b} după {a}");
        assert!(report.is_clean());
    }

    #[test]
    fn test_empty_translation_is_error() {
        let report = CatalogValidator::validate("Home", "   ");
        assert!(report.has_errors());
    }

    #[test]
    fn test_extract_placeholders_ignores_braces_without_names() {
        let found = CatalogValidator::extract_placeholders("{} {1} {ok} {also_ok}");
        let expected: BTreeSet<String> = ["ok", "also_ok"].iter().map(|s| s.to_string()).collect();
        assert_eq!(found, expected);
    }
}
