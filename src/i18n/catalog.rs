//! Message catalogs.
//!
//! Each locale has an optional `messages.{locale}.json` file mapping English
//! source strings to their translation. Lookups walk the active locale, then
//! the fallback chain, and finally return the key itself, so English text
//! never needs a catalog of its own.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::i18n::CatalogValidator;

/// Translations for every loaded locale.
#[derive(Debug, Default)]
pub struct MessageCatalog {
    messages: HashMap<String, HashMap<String, String>>,
    fallback_locales: Vec<String>,
}

impl MessageCatalog {
    /// Build a catalog from in-memory messages.
    pub fn new(
        messages: HashMap<String, HashMap<String, String>>,
        fallback_locales: Vec<String>,
    ) -> Self {
        Self {
            messages,
            fallback_locales,
        }
    }

    /// Load `messages.{locale}.json` for each locale from `dir`.
    ///
    /// Missing files are skipped. A file that exists but is not a flat JSON
    /// object of strings is an error.
    pub fn load(dir: &Path, locales: &[String], fallback_locales: &[String]) -> Result<Self> {
        let mut messages = HashMap::new();

        for locale in locales {
            let file = dir.join(format!("messages.{}.json", locale));
            if !file.exists() {
                debug!("No catalog for locale '{}' at {}", locale, file.display());
                continue;
            }

            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read catalog {}", file.display()))?;
            let entries: HashMap<String, String> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse catalog {}", file.display()))?;

            for (key, translation) in &entries {
                let report = CatalogValidator::validate(key, translation);
                for problem in report.errors.iter().chain(report.warnings.iter()) {
                    warn!("[{}] {}", locale, problem);
                }
            }

            info!("Loaded {} messages for locale '{}'", entries.len(), locale);
            messages.insert(locale.clone(), entries);
        }

        Ok(Self::new(messages, fallback_locales.to_vec()))
    }

    /// Translate `key` into `locale`, substituting `{name}` placeholders.
    pub fn translate(&self, key: &str, locale: &str, params: &[(&str, &str)]) -> String {
        let template = std::iter::once(locale)
            .chain(self.fallback_locales.iter().map(String::as_str))
            .find_map(|l| {
                self.messages
                    .get(l)
                    .and_then(|entries| entries.get(key))
                    .filter(|t| !t.trim().is_empty())
            })
            .map(String::as_str)
            .unwrap_or(key);

        substitute(template, params)
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.messages.contains_key(locale)
    }
}

fn substitute(template: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
}

/// A catalog bound to one locale.
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: Arc<MessageCatalog>,
    locale: String,
}

impl Translator {
    pub fn new(catalog: Arc<MessageCatalog>, locale: impl Into<String>) -> Self {
        Self {
            catalog,
            locale: locale.into(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn t(&self, key: &str) -> String {
        self.catalog.translate(key, &self.locale, &[])
    }

    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.catalog.translate(key, &self.locale, params)
    }
}
