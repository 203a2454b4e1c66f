//! Utility functions for the backoffice admin.
//!
//! This module provides:
//! - [`inflector`]: English singular/plural inflection and identifier casing.
//! - [`text`]: String helpers (capitalization, whitespace squishing, truncation).

pub mod inflector;
pub mod text;
