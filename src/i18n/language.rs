//! Language metadata used when presenting locales to visitors.
//!
//! Locale tags come from configuration; this table only supplies display
//! names for the language switcher. Tags not listed here are still valid
//! locales, they just display as their upper-cased code.

/// Display metadata for a known language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "ro")
    pub code: &'static str,

    /// English name of the language (e.g., "Romanian")
    pub name: &'static str,

    /// Native name of the language (e.g., "Română")
    pub native_name: &'static str,
}

const LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English", native_name: "English" },
    Language { code: "ro", name: "Romanian", native_name: "Română" },
    Language { code: "fr", name: "French", native_name: "Français" },
    Language { code: "es", name: "Spanish", native_name: "Español" },
    Language { code: "de", name: "German", native_name: "Deutsch" },
    Language { code: "it", name: "Italian", native_name: "Italiano" },
];

impl Language {
    /// Look up a language by its code.
    pub fn from_code(code: &str) -> Option<Language> {
        LANGUAGES.iter().copied().find(|lang| lang.code == code)
    }
}

/// Name of the language in its own language, for the switcher.
pub fn native_name(code: &str) -> String {
    Language::from_code(code)
        .map(|lang| lang.native_name.to_string())
        .unwrap_or_else(|| code.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_known() {
        let romanian = Language::from_code("ro").unwrap();
        assert_eq!(romanian.name, "Romanian");
        assert_eq!(romanian.native_name, "Română");
    }

    #[test]
    fn test_from_code_unknown() {
        assert!(Language::from_code("xx").is_none());
        assert!(Language::from_code("").is_none());
    }

    #[test]
    fn test_native_name_falls_back_to_code() {
        assert_eq!(native_name("es"), "Español");
        assert_eq!(native_name("pt"), "PT");
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in LANGUAGES.iter().enumerate() {
            for b in &LANGUAGES[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }
}
