pub mod config;
pub mod contact;
pub mod error;
pub mod i18n;
pub mod mail;
pub mod security;
pub mod server;
pub mod session;
pub mod templates;
