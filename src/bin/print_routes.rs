//! Route table binary - prints every localized path the site serves
//!
//! Usage:
//!   cargo run --bin routes
//!
//! Reads the same locale settings as the server:
//! - APP_LOCALE (defaults to en)
//! - APP_LOCALES (defaults to en,ro,fr,es)
//! - ROUTE_SLUGS_FILE (defaults to the built-in slug table)

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use multilingual_site::config::locale_config_from_env;
use multilingual_site::i18n::{LocaleRegistry, SlugCodec};
use multilingual_site::server::PAGE_ROUTES;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("multilingual_site=warn".parse()?),
        )
        .init();

    let registry = LocaleRegistry::new(locale_config_from_env()?)
        .context("Invalid locale configuration")?;
    let codec = SlugCodec::new(Arc::new(registry)).context("Invalid route slug configuration")?;

    info!("Default locale: {}", codec.registry().default_locale());

    let width = PAGE_ROUTES.iter().map(|r| r.len()).max().unwrap_or(0);

    println!("{:width$}  {:6}  PATH", "ROUTE", "LOCALE", width = width);
    for route in PAGE_ROUTES {
        for (locale, path) in codec.all_paths_for(route) {
            println!("{:width$}  {:6}  {}", route, locale, path, width = width);
        }
    }

    Ok(())
}
