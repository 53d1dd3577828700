//! Locale registry: single source of truth for the site's locales.
//!
//! The registry owns the [`LocaleConfig`] loaded at startup and exposes
//! read-only accessors. It is built once, validated, and shared behind an
//! `Arc` for the lifetime of the process.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::LocaleError;

/// Route name -> locale tag -> translated slug.
pub type RouteSlugs = BTreeMap<String, BTreeMap<String, String>>;

/// Locale settings as loaded from the environment or a config file.
#[derive(Debug, Clone, Deserialize)]
pub struct LocaleConfig {
    /// Locale served without a URL prefix (e.g., "en")
    pub default_locale: String,

    /// Every locale the site serves, in display order
    pub supported_locales: Vec<String>,

    /// Locales the message catalog falls back to when a key is missing
    #[serde(default = "default_fallback_locales")]
    pub fallback_locales: Vec<String>,

    /// Translated URL slugs; absent entries use the route name itself
    #[serde(default)]
    pub route_slugs: RouteSlugs,

    /// Directory holding `messages.{locale}.json` catalogs
    #[serde(default = "default_translations_path")]
    pub translations_path: PathBuf,
}

fn default_fallback_locales() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_translations_path() -> PathBuf {
    PathBuf::from("translations")
}

/// Validated, immutable view over a [`LocaleConfig`].
#[derive(Debug)]
pub struct LocaleRegistry {
    config: LocaleConfig,
}

impl LocaleRegistry {
    /// Validate `config` and wrap it in a registry.
    ///
    /// # Errors
    /// * [`LocaleError::NoLocales`] if no locale is configured
    /// * [`LocaleError::DuplicateLocale`] if a tag is listed twice
    /// * [`LocaleError::DefaultNotSupported`] if the default locale is not
    ///   one of the supported locales
    pub fn new(config: LocaleConfig) -> Result<Self, LocaleError> {
        if config.supported_locales.is_empty() {
            return Err(LocaleError::NoLocales);
        }

        let mut seen = HashSet::new();
        for locale in &config.supported_locales {
            if !seen.insert(locale.as_str()) {
                return Err(LocaleError::DuplicateLocale(locale.clone()));
            }
        }

        if !seen.contains(config.default_locale.as_str()) {
            return Err(LocaleError::DefaultNotSupported {
                default: config.default_locale.clone(),
                supported: config.supported_locales.join(","),
            });
        }

        Ok(Self { config })
    }

    /// The unprefixed locale.
    pub fn default_locale(&self) -> &str {
        &self.config.default_locale
    }

    /// All supported locales, default included, in configured order.
    pub fn supported_locales(&self) -> &[String] {
        &self.config.supported_locales
    }

    pub fn fallback_locales(&self) -> &[String] {
        &self.config.fallback_locales
    }

    /// Check if a locale tag is served by the site.
    pub fn is_supported(&self, locale: &str) -> bool {
        self.config.supported_locales.iter().any(|l| l == locale)
    }

    pub fn is_default(&self, locale: &str) -> bool {
        self.config.default_locale == locale
    }

    /// Raw slug table entry for `route` in `locale`, if one is configured.
    pub fn translated_slug(&self, route: &str, locale: &str) -> Option<&str> {
        self.config
            .route_slugs
            .get(route)
            .and_then(|slugs| slugs.get(locale))
            .map(String::as_str)
    }

    pub fn route_slugs(&self) -> &RouteSlugs {
        &self.config.route_slugs
    }

    pub fn translations_path(&self) -> &Path {
        &self.config.translations_path
    }
}

/// Slug translations shipped with the site.
pub fn default_route_slugs() -> RouteSlugs {
    let table: [(&str, [(&str, &str); 3]); 3] = [
        (
            "about",
            [("es", "acerca-de"), ("fr", "a-propos"), ("ro", "despre-noi")],
        ),
        (
            "contact",
            [("es", "contacto"), ("fr", "contact"), ("ro", "contact")],
        ),
        (
            "privacy",
            [
                ("es", "privacidad"),
                ("fr", "confidentialite"),
                ("ro", "confidentialitate"),
            ],
        ),
    ];

    table
        .into_iter()
        .map(|(route, slugs)| {
            let slugs = slugs
                .into_iter()
                .map(|(locale, slug)| (locale.to_string(), slug.to_string()))
                .collect();
            (route.to_string(), slugs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(default: &str, supported: &[&str]) -> LocaleConfig {
        LocaleConfig {
            default_locale: default.to_string(),
            supported_locales: supported.iter().map(|s| s.to_string()).collect(),
            fallback_locales: default_fallback_locales(),
            route_slugs: default_route_slugs(),
            translations_path: default_translations_path(),
        }
    }

    #[test]
    fn test_new_accepts_valid_config() {
        let registry = LocaleRegistry::new(config("en", &["en", "ro"])).unwrap();
        assert_eq!(registry.default_locale(), "en");
        assert_eq!(registry.supported_locales(), &["en", "ro"]);
    }

    #[test]
    fn test_new_rejects_default_missing_from_supported() {
        let err = LocaleRegistry::new(config("de", &["en", "ro"])).unwrap_err();
        assert!(matches!(err, LocaleError::DefaultNotSupported { .. }));
        assert!(err.to_string().contains("'de'"));
    }

    #[test]
    fn test_new_rejects_duplicate_locale() {
        let err = LocaleRegistry::new(config("en", &["en", "ro", "en"])).unwrap_err();
        assert!(matches!(err, LocaleError::DuplicateLocale(ref l) if l == "en"));
    }

    #[test]
    fn test_new_rejects_empty_locale_list() {
        let err = LocaleRegistry::new(config("en", &[])).unwrap_err();
        assert!(matches!(err, LocaleError::NoLocales));
    }

    #[test]
    fn test_is_supported_and_is_default() {
        let registry = LocaleRegistry::new(config("en", &["en", "ro", "fr"])).unwrap();
        assert!(registry.is_supported("fr"));
        assert!(!registry.is_supported("de"));
        assert!(registry.is_default("en"));
        assert!(!registry.is_default("ro"));
    }

    #[test]
    fn test_translated_slug_lookup() {
        let registry = LocaleRegistry::new(config("en", &["en", "ro"])).unwrap();
        assert_eq!(registry.translated_slug("about", "ro"), Some("despre-noi"));
        assert_eq!(registry.translated_slug("about", "de"), None);
        assert_eq!(registry.translated_slug("careers", "ro"), None);
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: LocaleConfig = serde_json::from_str(
            r#"{"default_locale": "en", "supported_locales": ["en", "ro"]}"#,
        )
        .unwrap();

        assert_eq!(config.fallback_locales, vec!["en"]);
        assert!(config.route_slugs.is_empty());
        assert_eq!(config.translations_path, PathBuf::from("translations"));
    }

    #[test]
    fn test_default_route_slugs_cover_site_pages() {
        let slugs = default_route_slugs();
        assert_eq!(slugs["about"]["ro"], "despre-noi");
        assert_eq!(slugs["privacy"]["fr"], "confidentialite");
        assert_eq!(slugs["contact"]["es"], "contacto");
    }
}
