//! Slug codec: maps (route, locale) pairs to URL paths and back.
//!
//! The forward direction reads the registry's slug table. The reverse
//! direction uses a [`SlugIndex`] built once at construction, so decoding a
//! translated slug is a single hash lookup.
//!
//! The default locale is always the identity mapping: its URLs carry the
//! route name itself and are never looked up in the slug table.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::error::LocaleError;
use crate::i18n::LocaleRegistry;

/// Route name of the homepage, which maps to the bare locale prefix.
pub const HOME_ROUTE: &str = "home";

/// Reverse slug index: locale -> slug -> route name.
#[derive(Debug, Default)]
pub struct SlugIndex {
    slug_to_route: HashMap<String, HashMap<String, String>>,
}

impl SlugIndex {
    /// Invert the registry's slug table.
    ///
    /// Entries for the default locale and for unsupported locales are skipped.
    /// Two routes sharing a slug in the same locale is a configuration error.
    fn build(registry: &LocaleRegistry) -> Result<Self, LocaleError> {
        let mut index = SlugIndex::default();

        for (route, translations) in registry.route_slugs() {
            for (locale, slug) in translations {
                if registry.is_default(locale) {
                    continue;
                }
                if !registry.is_supported(locale) {
                    warn!(
                        "Ignoring slug '{}' for route '{}': locale '{}' is not supported",
                        slug, route, locale
                    );
                    continue;
                }
                if !is_url_safe(slug) {
                    return Err(LocaleError::InvalidSlug {
                        route: route.clone(),
                        locale: locale.clone(),
                        slug: slug.clone(),
                    });
                }

                let slugs = index.slug_to_route.entry(locale.clone()).or_default();
                if let Some(existing) = slugs.get(slug) {
                    return Err(LocaleError::SlugCollision {
                        locale: locale.clone(),
                        slug: slug.clone(),
                        first: existing.clone(),
                        second: route.clone(),
                    });
                }
                slugs.insert(slug.clone(), route.clone());
            }
        }

        Ok(index)
    }

    fn lookup(&self, slug: &str, locale: &str) -> Option<&str> {
        self.slug_to_route
            .get(locale)
            .and_then(|slugs| slugs.get(slug))
            .map(String::as_str)
    }
}

/// A slug must be a single segment that browsers send unencoded: ASCII
/// letters, digits and `-._~`, excluding the `.` and `..` segments.
fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
}

/// Bidirectional mapping between route names and localized URL paths.
#[derive(Debug)]
pub struct SlugCodec {
    registry: Arc<LocaleRegistry>,
    index: SlugIndex,
}

impl SlugCodec {
    /// Build the codec and its reverse index.
    ///
    /// # Errors
    /// Returns [`LocaleError::SlugCollision`] or [`LocaleError::InvalidSlug`]
    /// when the slug table cannot be inverted unambiguously.
    pub fn new(registry: Arc<LocaleRegistry>) -> Result<Self, LocaleError> {
        let index = SlugIndex::build(&registry)?;
        Ok(Self { registry, index })
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    /// Translated slug for `route` in `locale`, or the route name itself.
    pub fn slug_for(&self, route: &str, locale: &str) -> String {
        if self.registry.is_default(locale) {
            return route.to_string();
        }

        self.registry
            .translated_slug(route, locale)
            .unwrap_or(route)
            .to_string()
    }

    /// Route name for a slug seen under `locale`.
    ///
    /// The default locale is the identity mapping. For other locales `None`
    /// means the slug is not a known translation.
    pub fn route_for(&self, slug: &str, locale: &str) -> Option<String> {
        if self.registry.is_default(locale) {
            return Some(slug.to_string());
        }

        self.index.lookup(slug, locale).map(str::to_string)
    }

    /// Full URL path of `route` in `locale`.
    pub fn path_for(&self, route: &str, locale: &str) -> String {
        let is_default = self.registry.is_default(locale);

        if route == HOME_ROUTE {
            return if is_default {
                "/".to_string()
            } else {
                format!("/{}", locale)
            };
        }

        let slug = self.slug_for(route, locale);
        if is_default {
            format!("/{}", slug)
        } else {
            format!("/{}/{}", locale, slug)
        }
    }

    /// Path of `route` in every supported locale, in configured order.
    pub fn all_paths_for(&self, route: &str) -> Vec<(String, String)> {
        self.registry
            .supported_locales()
            .iter()
            .map(|locale| (locale.clone(), self.path_for(route, locale)))
            .collect()
    }
}
