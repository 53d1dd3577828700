//! Request locale resolution.
//!
//! Turns a raw request path into the active locale and the canonical path:
//! the path with its locale prefix removed and its translated slug mapped
//! back to the route name. Resolution never fails; anything it does not
//! recognise passes through unchanged so the router can answer 404.

use std::sync::Arc;

use crate::i18n::slugs::HOME_ROUTE;
use crate::i18n::SlugCodec;

/// Locale information attached to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLocaleContext {
    active_locale: String,
    canonical_path: String,
}

impl RequestLocaleContext {
    pub fn new(active_locale: impl Into<String>, canonical_path: impl Into<String>) -> Self {
        Self {
            active_locale: active_locale.into(),
            canonical_path: canonical_path.into(),
        }
    }

    pub fn active_locale(&self) -> &str {
        &self.active_locale
    }

    pub fn canonical_path(&self) -> &str {
        &self.canonical_path
    }

    /// Route name addressed by the canonical path: its first segment, or
    /// `home` for the site root.
    pub fn route_name(&self) -> &str {
        self.canonical_path
            .split('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(HOME_ROUTE)
    }
}

/// Resolves incoming paths against the configured locales.
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    codec: Arc<SlugCodec>,
}

impl LocaleResolver {
    pub fn new(codec: Arc<SlugCodec>) -> Self {
        Self { codec }
    }

    /// Resolve `path` into a [`RequestLocaleContext`].
    ///
    /// Only a non-default supported locale in the first segment is treated
    /// as a prefix. Default-locale URLs are never prefixed, so `/en/about`
    /// (with `en` as default) is passed through untouched.
    pub fn resolve(&self, path: &str) -> RequestLocaleContext {
        let registry = self.codec.registry();
        let default_locale = registry.default_locale();

        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let candidate = match segments.first() {
            Some(first) if registry.is_supported(first) && !registry.is_default(first) => {
                first.to_string()
            }
            _ => return RequestLocaleContext::new(default_locale, path),
        };

        segments.remove(0);

        let mut canonical: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        if let Some(slug) = canonical.first_mut() {
            if let Some(route) = self.codec.route_for(slug, &candidate) {
                if route != *slug {
                    *slug = route;
                }
            }
        }

        RequestLocaleContext::new(candidate, format!("/{}", canonical.join("/")))
    }
}
