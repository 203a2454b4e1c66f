//! # backoffice
//!
//! Dashboard-driven admin CRUD for axum services.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `backoffice` to get everything, or on the individual
//! crates for finer-grained control.
//!
//! ```
//! use backoffice::prelude::*;
//!
//! # fn main() -> AdminResult<()> {
//! let mut site = AdminSite::new();
//! site.register(ResourceEntry::new(
//!     Dashboard::new("customer")
//!         .attribute("id", FieldType::number())
//!         .attribute("name", FieldType::string())
//!         .attribute("joined_on", FieldType::date())
//!         .collection_attributes(&["id", "name"]),
//! ))?;
//! let app: axum::Router = site.into_axum_router()?;
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

/// Settings, translations, inflection and error types.
pub use backoffice_core as core;

/// Dashboards, fields, controllers, stores and routing.
#[cfg(feature = "admin")]
pub use backoffice_admin as admin;

// Third-party crates the public API is expressed in.
pub use async_trait;
pub use axum;
pub use chrono;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tower_http;
pub use tracing;
pub use tracing_subscriber;

/// The most commonly used types.
pub mod prelude {
    pub use backoffice_core::i18n::{Localizer, Translations};
    pub use backoffice_core::logging::setup_logging;
    pub use backoffice_core::settings_loader;
    pub use backoffice_core::{AdminError, AdminResult, Settings, ValidationErrors};

    #[cfg(feature = "admin")]
    pub use backoffice_admin::{
        authorization::{Action, AuthTarget, Authorizer, PassthroughAuthorizer},
        controller::{ResourceController, Response},
        dashboard::Dashboard,
        field::{DateOptions, FieldType, NumberOptions},
        locator::{GlobalId, Locator},
        model::Model,
        registry::{ResourceEntry, ResourceRegistry},
        resource::Resource,
        site::AdminSite,
        store::{InMemoryStore, ResourceStore},
    };
}
