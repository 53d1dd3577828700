use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::i18n::registry::default_route_slugs;
use crate::i18n::{LocaleConfig, RouteSlugs};

#[derive(Debug, Clone)]
pub struct Config {
    // Application
    pub app_env: String,
    pub debug: bool,
    pub app_url: String,
    pub host: String,
    pub port: u16,

    // Locales
    pub locale: LocaleConfig,

    // Static files
    pub assets_path: PathBuf,

    // Contact form
    pub contact_email: String,

    // Mail relay (None = log mails instead of sending)
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from_address: String,
    pub mail_from_name: String,

    // Sessions
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Application
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            debug: std::env::var("APP_DEBUG")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            app_url: std::env::var("APP_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            // Locales
            locale: locale_config_from_env()?,

            // Static files
            assets_path: std::env::var("ASSETS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public")),

            // Contact form
            contact_email: std::env::var("CONTACT_EMAIL").context("CONTACT_EMAIL not set")?,

            // Mail relay
            mail_api_url: non_empty_var("MAIL_API_URL"),
            mail_api_key: non_empty_var("MAIL_API_KEY"),
            mail_from_address: std::env::var("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "no-reply@localhost".to_string()),
            mail_from_name: std::env::var("MAIL_FROM_NAME")
                .unwrap_or_else(|_| "Website".to_string()),

            // Sessions
            session_ttl: Duration::from_secs(
                std::env::var("SESSION_TTL_MINUTES")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(120)
                    * 60,
            ),
        })
    }

    /// Socket address string to bind the HTTP server to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Locale settings alone, for tools that do not need the full configuration.
pub fn locale_config_from_env() -> Result<LocaleConfig> {
    let route_slugs = match non_empty_var("ROUTE_SLUGS_FILE") {
        Some(path) => load_route_slugs(&path)?,
        None => default_route_slugs(),
    };

    Ok(LocaleConfig {
        default_locale: std::env::var("APP_LOCALE").unwrap_or_else(|_| "en".to_string()),
        supported_locales: parse_locale_list(
            &std::env::var("APP_LOCALES").unwrap_or_else(|_| "en,ro,fr,es".to_string()),
        ),
        fallback_locales: parse_locale_list(
            &std::env::var("FALLBACK_LOCALES").unwrap_or_else(|_| "en".to_string()),
        ),
        route_slugs,
        translations_path: std::env::var("TRANSLATIONS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("translations")),
    })
}

fn load_route_slugs(path: &str) -> Result<RouteSlugs> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ROUTE_SLUGS_FILE {}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse ROUTE_SLUGS_FILE {}", path))
}

/// Split a comma-separated locale list, dropping blanks.
pub fn parse_locale_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
