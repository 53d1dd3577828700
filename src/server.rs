//! HTTP server: application state, route table and handlers.
//!
//! Every page is registered once per supported locale, using the localized
//! paths produced by the slug codec (`/about`, `/ro/despre-noi`, ...). A
//! middleware resolves each request's locale and canonical path before the
//! handlers run, so handlers only ever deal with route names.

use anyhow::{bail, Context, Result};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, MethodRouter};
use axum::{Extension, Form, Router};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::contact::{self, ContactSubmission};
use crate::error::AppError;
use crate::i18n::{
    LocaleRegistry, LocaleResolver, MessageCatalog, RequestLocaleContext, SlugCodec,
    TemplateResolver, Translator, HOME_ROUTE,
};
use crate::mail::{self, Mailer};
use crate::security::verify_csrf;
use crate::session::{attach_session, FlashKind, MemorySessionStore, Session, SessionStore};
use crate::templates::{localized_error_page, EmbeddedTemplates, ErrorPageContext, PageContext};

/// Route name of the contact page, which also accepts form posts.
pub const CONTACT_ROUTE: &str = "contact";

/// Pages served by the site, by route name.
pub const PAGE_ROUTES: &[&str] = &[HOME_ROUTE, "about", "privacy", CONTACT_ROUTE];

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub codec: Arc<SlugCodec>,
    pub resolver: LocaleResolver,
    pub templates: TemplateResolver,
    pub catalog: Arc<MessageCatalog>,
    pub sessions: Arc<dyn SessionStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Build the production state: catalogs from disk, in-memory sessions and
    /// the mail transport named by the configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let catalog = MessageCatalog::load(
            &config.locale.translations_path,
            &config.locale.supported_locales,
            &config.locale.fallback_locales,
        )?;
        let sessions = Arc::new(MemorySessionStore::new(config.session_ttl));
        let mailer: Arc<dyn Mailer> = Arc::from(mail::from_config(&config));

        Self::new(config, catalog, sessions, mailer)
    }

    /// Build state from explicit collaborators.
    pub fn new(
        config: Config,
        catalog: MessageCatalog,
        sessions: Arc<dyn SessionStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self> {
        let registry =
            LocaleRegistry::new(config.locale.clone()).context("Invalid locale configuration")?;
        let codec = Arc::new(
            SlugCodec::new(Arc::new(registry)).context("Invalid route slug configuration")?,
        );

        info!(
            "Locales: default '{}', supported [{}]",
            codec.registry().default_locale(),
            codec.registry().supported_locales().join(", ")
        );

        Ok(Self {
            config: Arc::new(config),
            resolver: LocaleResolver::new(Arc::clone(&codec)),
            templates: TemplateResolver::new(Arc::new(EmbeddedTemplates)),
            codec,
            catalog: Arc::new(catalog),
            sessions,
            mailer,
        })
    }

    pub fn translator(&self, locale: &str) -> Translator {
        Translator::new(Arc::clone(&self.catalog), locale)
    }

    fn render_page(
        &self,
        route: &str,
        locale: &RequestLocaleContext,
        session: &Session,
    ) -> Result<Html<String>, AppError> {
        if !PAGE_ROUTES.contains(&route) {
            return Err(AppError::NotFound);
        }

        let active = locale.active_locale();
        let identifier = self.templates.resolve(
            &format!("pages/{}", route),
            active,
            self.codec.registry().default_locale(),
        );
        debug!("Rendering '{}' for route '{}' in '{}'", identifier, route, active);

        let ctx = PageContext::new(
            Arc::clone(&self.codec),
            self.translator(active),
            route,
            &self.config.app_url,
        )
        .with_flash(session.take_flash())
        .with_form(session.take_form_data(), session.csrf_token());

        EmbeddedTemplates.render(&identifier, &ctx).map(Html)
    }

    /// Render `error` as an error page in the request's locale. Server
    /// errors carry their message when debug mode is on.
    fn error_response(&self, error: AppError, locale: &RequestLocaleContext) -> Response {
        error.log();

        let status = error.status();
        let active = locale.active_locale();
        let translator = self.translator(active);
        let home = self.codec.path_for(HOME_ROUTE, active);
        let details = (self.config.debug && status.is_server_error()).then(|| error.to_string());

        localized_error_page(
            status,
            &ErrorPageContext {
                translator: Some(&translator),
                home: Some(&home),
                details: details.as_deref(),
            },
        )
    }
}

/// Build the router with one route per (page, locale) pair.
pub fn router(state: AppState) -> Result<Router> {
    let mut router: Router<AppState> = Router::new();
    let mut registered = HashSet::new();

    for locale in state.codec.registry().supported_locales() {
        for &route in PAGE_ROUTES {
            let path = state.codec.path_for(route, locale);
            if !registered.insert(path.clone()) {
                bail!(
                    "Path '{}' for route '{}' in locale '{}' is already registered",
                    path,
                    route,
                    locale
                );
            }

            let handler: MethodRouter<AppState> = if route == CONTACT_ROUTE {
                get(show_page).post(submit_contact)
            } else {
                get(show_page)
            };

            debug!("Route {} -> {} [{}]", path, route, locale);
            router = router.route(&path, handler);
        }
    }

    info!("Registered {} localized routes", registered.len());

    // Locale and session layers wrap the page routes only, so asset and
    // 404 requests never start a session.
    Ok(router
        .route_layer(middleware::from_fn_with_state(state.clone(), attach_locale))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.sessions),
            attach_session,
        ))
        .nest_service("/assets", ServeDir::new(&state.config.assets_path))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the HTTP server and run until Ctrl-C or SIGTERM.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.bind_address();
    let app = router(state)?;

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("✓ Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Middleware attaching the [`RequestLocaleContext`] to every request.
async fn attach_locale(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let ctx = state.resolver.resolve(request.uri().path());
    debug!(
        locale = ctx.active_locale(),
        canonical = ctx.canonical_path(),
        "Resolved request locale"
    );

    request.extensions_mut().insert(ctx);
    next.run(request).await
}

async fn show_page(
    State(state): State<AppState>,
    Extension(locale): Extension<RequestLocaleContext>,
    Extension(session): Extension<Session>,
) -> Response {
    match state.render_page(locale.route_name(), &locale, &session) {
        Ok(html) => html.into_response(),
        Err(e) => state.error_response(e, &locale),
    }
}

async fn submit_contact(
    State(state): State<AppState>,
    Extension(locale): Extension<RequestLocaleContext>,
    Extension(session): Extension<Session>,
    Form(submission): Form<ContactSubmission>,
) -> Response {
    let active = locale.active_locale();
    let translator = state.translator(active);
    let back = redirect(state.codec.path_for(CONTACT_ROUTE, active));

    if !verify_csrf(&session.csrf_token(), submission.csrf_token.as_deref()) {
        warn!("Rejected contact form with a missing or stale CSRF token");
        session.set_form_data(submission.form_data());
        session.flash(FlashKind::Error, translator.t(contact::SESSION_EXPIRED));
        return back;
    }

    let message = match submission.validate(&translator) {
        Ok(message) => message,
        Err(errors) => {
            debug!("Contact form rejected with {} validation errors", errors.len());
            for error in errors {
                session.flash(FlashKind::Error, error);
            }
            session.set_form_data(submission.form_data());
            return back;
        }
    };

    let sent = match message.to_mail(&state.config.contact_email, active) {
        Ok(mail) => state.mailer.send(&mail).await,
        Err(e) => Err(anyhow::Error::new(e).context("Failed to render contact mail")),
    };

    match sent {
        Ok(()) => {
            info!("Contact message from {} forwarded", message.email);
            session.flash(FlashKind::Success, translator.t(contact::SENT));
        }
        Err(e) => {
            error!("Failed to send contact message: {:#}", e);
            session.set_form_data(submission.form_data());
            session.flash(FlashKind::Error, translator.t(contact::SEND_FAILED));
        }
    }

    back
}

async fn not_found(State(state): State<AppState>, uri: Uri) -> Response {
    let locale = state.resolver.resolve(uri.path());
    state.error_response(AppError::NotFound, &locale)
}

fn redirect(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
