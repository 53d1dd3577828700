//! Locale-specific template overrides.
//!
//! A page template such as `pages/about` may have a per-locale override at
//! `pages/ro/about`. The resolver picks the override when the template store
//! has it and silently falls back to the shared template otherwise.

use std::sync::Arc;

/// Storage holding the site's templates.
pub trait TemplateStore: Send + Sync {
    /// Whether a template with this identifier can be rendered.
    fn exists(&self, identifier: &str) -> bool;
}

/// Picks locale overrides for template identifiers.
#[derive(Clone)]
pub struct TemplateResolver {
    store: Arc<dyn TemplateStore>,
}

impl TemplateResolver {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self { store }
    }

    /// Resolve `identifier` for `locale`.
    ///
    /// For locale `ro` and `pages/about`, checks `pages/ro/about` first and
    /// returns `pages/about` when no override exists. The store is consulted
    /// on every call.
    pub fn resolve(&self, identifier: &str, locale: &str, default_locale: &str) -> String {
        if locale == default_locale {
            return identifier.to_string();
        }

        let candidate = override_identifier(identifier, locale);
        if self.store.exists(&candidate) {
            candidate
        } else {
            identifier.to_string()
        }
    }
}

/// Insert `locale` as a segment before the last component of `identifier`.
fn override_identifier(identifier: &str, locale: &str) -> String {
    match identifier.rsplit_once('/') {
        Some((dir, name)) if !dir.is_empty() => format!("{}/{}/{}", dir, locale, name),
        Some((_, name)) => format!("{}/{}", locale, name),
        None => format!("{}/{}", locale, identifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeStore {
        templates: HashSet<&'static str>,
        lookups: AtomicUsize,
    }

    impl FakeStore {
        fn with(templates: &[&'static str]) -> Arc<Self> {
            Arc::new(Self {
                templates: templates.iter().copied().collect(),
                lookups: AtomicUsize::new(0),
            })
        }
    }

    impl TemplateStore for FakeStore {
        fn exists(&self, identifier: &str) -> bool {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.templates.contains(identifier)
        }
    }

    #[test]
    fn test_override_is_used_when_present() {
        let resolver = TemplateResolver::new(FakeStore::with(&["pages/about", "pages/ro/about"]));
        assert_eq!(resolver.resolve("pages/about", "ro", "en"), "pages/ro/about");
    }

    #[test]
    fn test_falls_back_without_override() {
        let resolver = TemplateResolver::new(FakeStore::with(&["pages/about"]));
        assert_eq!(resolver.resolve("pages/about", "ro", "en"), "pages/about");
    }

    #[test]
    fn test_default_locale_skips_store() {
        let store = FakeStore::with(&["pages/about", "pages/en/about"]);
        let resolver = TemplateResolver::new(store.clone());

        assert_eq!(resolver.resolve("pages/about", "en", "en"), "pages/about");
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_every_call_checks_store() {
        let store = FakeStore::with(&["pages/ro/about"]);
        let resolver = TemplateResolver::new(store.clone());

        resolver.resolve("pages/about", "ro", "en");
        resolver.resolve("pages/about", "ro", "en");
        assert_eq!(store.lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_override_identifier_shapes() {
        assert_eq!(override_identifier("pages/about", "ro"), "pages/ro/about");
        assert_eq!(override_identifier("about", "ro"), "ro/about");
        assert_eq!(override_identifier("/about", "ro"), "ro/about");
        assert_eq!(override_identifier("a/b/c", "fr"), "a/b/fr/c");
    }
}
