use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::templates;

/// Locale configuration problems. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("no supported locales configured")]
    NoLocales,

    #[error("locale '{0}' is listed more than once in the supported locales")]
    DuplicateLocale(String),

    #[error("default locale '{default}' is not one of the supported locales ({supported})")]
    DefaultNotSupported { default: String, supported: String },

    #[error("slug '{slug}' for route '{route}' in locale '{locale}' must be a single URL-safe path segment (ASCII letters, digits, '-', '.', '_', '~')")]
    InvalidSlug {
        route: String,
        locale: String,
        slug: String,
    },

    #[error("routes '{first}' and '{second}' both use slug '{slug}' in locale '{locale}'")]
    SlugCollision {
        locale: String,
        slug: String,
        first: String,
        second: String,
    },
}

/// Errors surfaced by request handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("page not found")]
    NotFound,

    #[error("failed to render template '{template}': {source}")]
    Render {
        template: String,
        #[source]
        source: askama::Error,
    },

    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
}

impl AppError {
    /// Log at a level matching the status: errors for 5xx, warnings otherwise.
    pub fn log(&self) {
        if self.status().is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request failed: {}", self);
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Render { .. } | AppError::UnknownTemplate(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        templates::error_page(self.status())
    }
}
