//! Compiled page templates.
//!
//! Templates are compiled into the binary with askama. [`EmbeddedTemplates`]
//! exposes them by identifier (`pages/about`, `pages/ro/about`, ...) so the
//! locale override lookup can ask whether a given variant exists.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{Datelike, Utc};
use std::sync::Arc;

use crate::error::AppError;
use crate::i18n::{native_name, SlugCodec, TemplateStore, Translator};
use crate::session::{FlashMessages, FormData};

/// One entry of the language switcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitcherLink {
    pub locale: String,
    pub label: String,
    pub path: String,
    pub active: bool,
}

/// Everything a page template can see.
pub struct PageContext {
    pub locale: String,
    pub default_locale: String,
    pub current_route: String,
    pub base_url: String,
    pub switcher: Vec<SwitcherLink>,
    pub flash: FlashMessages,
    pub form: FormData,
    pub csrf_token: String,
    pub year: i32,
    translator: Translator,
    codec: Arc<SlugCodec>,
}

impl PageContext {
    pub fn new(
        codec: Arc<SlugCodec>,
        translator: Translator,
        current_route: &str,
        base_url: &str,
    ) -> Self {
        let locale = translator.locale().to_string();
        let switcher = codec
            .all_paths_for(current_route)
            .into_iter()
            .map(|(code, path)| SwitcherLink {
                label: native_name(&code),
                active: code == locale,
                locale: code,
                path,
            })
            .collect();

        Self {
            default_locale: codec.registry().default_locale().to_string(),
            locale,
            current_route: current_route.to_string(),
            base_url: base_url.to_string(),
            switcher,
            flash: FlashMessages::default(),
            form: FormData::new(),
            csrf_token: String::new(),
            year: Utc::now().year(),
            translator,
            codec,
        }
    }

    pub fn with_flash(mut self, flash: FlashMessages) -> Self {
        self.flash = flash;
        self
    }

    pub fn with_form(mut self, form: FormData, csrf_token: String) -> Self {
        self.form = form;
        self.csrf_token = csrf_token;
        self
    }

    /// Translate a source string into the page's locale.
    pub fn t(&self, key: &str) -> String {
        self.translator.t(key)
    }

    /// Localized path of `route` in the page's locale.
    pub fn route(&self, route: &str) -> String {
        self.codec.path_for(route, &self.locale)
    }

    /// Saved value of a form field, empty when none.
    pub fn field(&self, name: &str) -> &str {
        self.form.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn is_current(&self, route: &str) -> bool {
        self.current_route == route
    }
}

#[derive(Template)]
#[template(path = "pages/home.html")]
struct HomePage<'a> {
    ctx: &'a PageContext,
}

#[derive(Template)]
#[template(path = "pages/about.html")]
struct AboutPage<'a> {
    ctx: &'a PageContext,
}

#[derive(Template)]
#[template(path = "pages/ro/about.html")]
struct AboutPageRo<'a> {
    ctx: &'a PageContext,
}

#[derive(Template)]
#[template(path = "pages/privacy.html")]
struct PrivacyPage<'a> {
    ctx: &'a PageContext,
}

#[derive(Template)]
#[template(path = "pages/ro/privacy.html")]
struct PrivacyPageRo<'a> {
    ctx: &'a PageContext,
}

#[derive(Template)]
#[template(path = "pages/contact.html")]
struct ContactPage<'a> {
    ctx: &'a PageContext,
}

/// Identifiers of every compiled page template.
pub const PAGE_TEMPLATES: &[&str] = &[
    "pages/home",
    "pages/about",
    "pages/ro/about",
    "pages/privacy",
    "pages/ro/privacy",
    "pages/contact",
];

/// Page templates compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTemplates;

impl EmbeddedTemplates {
    /// Render the template called `identifier`.
    pub fn render(&self, identifier: &str, ctx: &PageContext) -> Result<String, AppError> {
        let rendered = match identifier {
            "pages/home" => HomePage { ctx }.render(),
            "pages/about" => AboutPage { ctx }.render(),
            "pages/ro/about" => AboutPageRo { ctx }.render(),
            "pages/privacy" => PrivacyPage { ctx }.render(),
            "pages/ro/privacy" => PrivacyPageRo { ctx }.render(),
            "pages/contact" => ContactPage { ctx }.render(),
            other => return Err(AppError::UnknownTemplate(other.to_string())),
        };

        rendered.map_err(|source| AppError::Render {
            template: identifier.to_string(),
            source,
        })
    }
}

impl TemplateStore for EmbeddedTemplates {
    fn exists(&self, identifier: &str) -> bool {
        PAGE_TEMPLATES.contains(&identifier) || ERROR_TEMPLATES.contains(&identifier)
    }
}

#[derive(Template)]
#[template(path = "errors/404.html")]
struct NotFoundPage<'a> {
    lang: &'a str,
    status_code: u16,
    title: String,
    message: String,
    back_label: String,
    home: &'a str,
}

#[derive(Template)]
#[template(path = "errors/default.html")]
struct DefaultErrorPage<'a> {
    lang: &'a str,
    status_code: u16,
    reason: &'a str,
    message: String,
    back_label: String,
    home: &'a str,
    details: Option<&'a str>,
}

const ERROR_TEMPLATES: &[&str] = &["errors/404", "errors/default"];

/// What an error page knows about the request that failed.
#[derive(Default)]
pub struct ErrorPageContext<'a> {
    /// Translator for the request's locale; English when absent.
    pub translator: Option<&'a Translator>,

    /// Homepage path in the request's locale; `/` when absent.
    pub home: Option<&'a str>,

    /// Error message shown on `errors/default` in debug mode.
    pub details: Option<&'a str>,
}

impl ErrorPageContext<'_> {
    fn t(&self, key: &str) -> String {
        self.translator
            .map(|translator| translator.t(key))
            .unwrap_or_else(|| key.to_string())
    }

    fn lang(&self) -> &str {
        self.translator.map(Translator::locale).unwrap_or("en")
    }
}

/// Render the error page body for `status`: `errors/{code}` when it
/// exists, `errors/default` otherwise.
pub fn render_error_page(status: StatusCode, ctx: &ErrorPageContext<'_>) -> askama::Result<String> {
    let status_code = status.as_u16();
    let specific = format!("errors/{}", status_code);
    let identifier = if EmbeddedTemplates.exists(&specific) {
        specific.as_str()
    } else {
        "errors/default"
    };
    let home = ctx.home.unwrap_or("/");
    let back_label = ctx.t("Back to the homepage");

    if identifier == "errors/404" {
        return NotFoundPage {
            lang: ctx.lang(),
            status_code,
            title: ctx.t("Page not found"),
            message: ctx.t("The page you are looking for does not exist or has moved."),
            back_label,
            home,
        }
        .render();
    }

    DefaultErrorPage {
        lang: ctx.lang(),
        status_code,
        reason: status.canonical_reason().unwrap_or("Error"),
        message: ctx.t("Something went wrong on our side. Please try again in a moment."),
        back_label,
        home,
        details: ctx.details,
    }
    .render()
}

/// Error page response for `status` in the request's locale.
pub fn localized_error_page(status: StatusCode, ctx: &ErrorPageContext<'_>) -> Response {
    match render_error_page(status, ctx) {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            (status, status.canonical_reason().unwrap_or("Error")).into_response()
        }
    }
}

/// Error page response for `status` without request context.
pub fn error_page(status: StatusCode) -> Response {
    localized_error_page(status, &ErrorPageContext::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::registry::{default_route_slugs, LocaleConfig};
    use crate::i18n::{LocaleRegistry, MessageCatalog, TemplateResolver};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn codec() -> Arc<SlugCodec> {
        let registry = LocaleRegistry::new(LocaleConfig {
            default_locale: "en".to_string(),
            supported_locales: vec!["en".to_string(), "ro".to_string(), "fr".to_string()],
            fallback_locales: vec!["en".to_string()],
            route_slugs: default_route_slugs(),
            translations_path: PathBuf::from("translations"),
        })
        .unwrap();
        Arc::new(SlugCodec::new(Arc::new(registry)).unwrap())
    }

    fn context(locale: &str, route: &str) -> PageContext {
        let catalog = Arc::new(MessageCatalog::new(HashMap::new(), vec![]));
        PageContext::new(codec(), Translator::new(catalog, locale), route, "https://example.com")
    }

    #[test]
    fn test_switcher_lists_every_locale() {
        let ctx = context("ro", "about");

        let paths: Vec<_> = ctx.switcher.iter().map(|l| l.path.as_str()).collect();
        assert_eq!(paths, vec!["/about", "/ro/despre-noi", "/fr/a-propos"]);

        let active: Vec<_> = ctx
            .switcher
            .iter()
            .filter(|l| l.active)
            .map(|l| l.locale.as_str())
            .collect();
        assert_eq!(active, vec!["ro"]);
        assert_eq!(ctx.switcher[1].label, "Română");
    }

    #[test]
    fn test_route_uses_page_locale() {
        let ctx = context("fr", "home");
        assert_eq!(ctx.route("privacy"), "/fr/confidentialite");
        assert_eq!(ctx.route("home"), "/fr");
    }

    #[test]
    fn test_field_defaults_to_empty() {
        let mut form = FormData::new();
        form.insert("name".to_string(), "Ana".to_string());
        let ctx = context("en", "contact").with_form(form, "token".to_string());

        assert_eq!(ctx.field("name"), "Ana");
        assert_eq!(ctx.field("email"), "");
        assert_eq!(ctx.csrf_token, "token");
    }

    #[test]
    fn test_embedded_store_knows_overrides() {
        let resolver = TemplateResolver::new(Arc::new(EmbeddedTemplates));
        assert_eq!(resolver.resolve("pages/about", "ro", "en"), "pages/ro/about");
        assert_eq!(resolver.resolve("pages/about", "fr", "en"), "pages/about");
        assert_eq!(resolver.resolve("pages/contact", "ro", "en"), "pages/contact");
    }

    #[test]
    fn test_render_every_page_template() {
        let ctx = context("ro", "about");
        for identifier in PAGE_TEMPLATES {
            let html = EmbeddedTemplates.render(identifier, &ctx).unwrap();
            assert!(html.contains("<html lang=\"ro\">"), "{identifier}");
        }
    }

    #[test]
    fn test_render_unknown_template() {
        let ctx = context("en", "home");
        let err = EmbeddedTemplates.render("pages/careers", &ctx).unwrap_err();
        assert!(matches!(err, AppError::UnknownTemplate(_)));
    }

    // ==================== Error Page Tests ====================

    fn romanian() -> Translator {
        let mut ro = HashMap::new();
        ro.insert("Page not found".to_string(), "Pagina nu a fost găsită".to_string());
        ro.insert(
            "Back to the homepage".to_string(),
            "Înapoi la pagina principală".to_string(),
        );
        let mut messages = HashMap::new();
        messages.insert("ro".to_string(), ro);
        Translator::new(Arc::new(MessageCatalog::new(messages, vec![])), "ro")
    }

    #[test]
    fn test_not_found_page_is_localized() {
        let translator = romanian();
        let ctx = ErrorPageContext {
            translator: Some(&translator),
            home: Some("/ro"),
            details: None,
        };

        let html = render_error_page(StatusCode::NOT_FOUND, &ctx).unwrap();
        assert!(html.contains(r#"<html lang="ro">"#));
        assert!(html.contains("Pagina nu a fost găsită"));
        assert!(html.contains(r#"<a href="/ro">Înapoi la pagina principală</a>"#));
    }

    #[test]
    fn test_error_page_without_context_is_english() {
        let html = render_error_page(StatusCode::NOT_FOUND, &ErrorPageContext::default()).unwrap();
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(html.contains("Page not found"));
        assert!(html.contains(r#"<a href="/">"#));
    }

    #[test]
    fn test_default_error_page_shows_details_only_when_given() {
        let with_details = ErrorPageContext {
            details: Some("unknown template pages/careers"),
            ..Default::default()
        };
        let html = render_error_page(StatusCode::INTERNAL_SERVER_ERROR, &with_details).unwrap();
        assert!(html.contains("500"));
        assert!(html.contains("unknown template pages/careers"));

        let html =
            render_error_page(StatusCode::INTERNAL_SERVER_ERROR, &ErrorPageContext::default())
                .unwrap();
        assert!(!html.contains("error-details"));
    }

    #[test]
    fn test_error_page_statuses() {
        assert_eq!(error_page(StatusCode::NOT_FOUND).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            error_page(StatusCode::INTERNAL_SERVER_ERROR).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
