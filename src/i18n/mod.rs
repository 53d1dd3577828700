//! Internationalization (i18n) module for locale-aware routing.
//!
//! Everything the site knows about locales lives here: which locales exist,
//! how route names map to translated URL slugs, how an incoming path maps
//! back to a locale and route, which template a locale should render, and
//! the message catalogs used inside templates.
//!
//! # Architecture
//!
//! - `registry`: validated locale configuration (default, supported, slug table)
//! - `slugs`: bidirectional route <-> path codec with a reverse slug index
//! - `resolver`: per-request locale detection and canonical path
//! - `templates`: locale-specific template override lookup
//! - `catalog`: message catalogs with a fallback chain
//! - `validator`: catalog quality checks
//! - `language`: display names for the language switcher
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{LocaleRegistry, LocaleResolver, SlugCodec};
//!
//! let registry = Arc::new(LocaleRegistry::new(config)?);
//! let codec = Arc::new(SlugCodec::new(registry)?);
//!
//! assert_eq!(codec.path_for("about", "ro"), "/ro/despre-noi");
//!
//! let ctx = LocaleResolver::new(codec).resolve("/ro/despre-noi");
//! assert_eq!(ctx.canonical_path(), "/about");
//! ```

mod catalog;
mod language;
pub mod registry;
mod resolver;
mod slugs;
mod templates;
mod validator;

pub use catalog::{MessageCatalog, Translator};
pub use language::{native_name, Language};
pub use registry::{LocaleConfig, LocaleRegistry, RouteSlugs};
pub use resolver::{LocaleResolver, RequestLocaleContext};
pub use slugs::{SlugCodec, SlugIndex, HOME_ROUTE};
pub use templates::{TemplateResolver, TemplateStore};
pub use validator::{CatalogValidator, ValidationReport};
