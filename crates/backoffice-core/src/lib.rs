//! # backoffice-core
//!
//! Core types, settings, translations, and error types for the backoffice admin.
//! This crate has no HTTP or storage dependencies and provides the foundation
//! the admin crate builds on.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy, validation errors, and result alias
//! - [`settings`] - Admin configuration with defaults
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`i18n`] - Translation catalogs, pluralization, and time zones
//! - [`utils`] - Inflection and text helpers
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod i18n;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{AdminError, AdminResult, ValidationErrors};
pub use settings::Settings;
