//! One-time notifications carried by redirects.
//!
//! After a successful write the controller redirects with a notice; after a
//! refused destroy it redirects with an error. The flash travels in the
//! redirect response so the next page can show it once.

use serde::{Deserialize, Serialize};

/// The severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    /// A confirmation ("Customer was successfully created.").
    Notice,
    /// A failure the user should see.
    Error,
}

impl FlashLevel {
    /// The CSS tag for this level.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single flash message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// The severity.
    pub level: FlashLevel,
    /// The message text. Error messages may contain `<br/>` separators.
    pub message: String,
}

impl Flash {
    /// A notice.
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Notice,
            message: message.into(),
        }
    }

    /// An error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Flash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}
