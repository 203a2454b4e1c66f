//! # backoffice-admin
//!
//! Dashboard-driven CRUD for the backoffice. Each resource type is described
//! by a [`Dashboard`](dashboard::Dashboard) of typed fields; the
//! [`ResourceController`](controller::ResourceController) lists, shows,
//! creates, updates and destroys resources through a
//! [`ResourceStore`](store::ResourceStore), and the
//! [`AdminSite`](site::AdminSite) serves it all as an Axum router.
//!
//! ## Modules
//!
//! - [`resource`] / [`model`] - Records and their store-side validations
//! - [`field`] - Field types, formatting and coercion
//! - [`dashboard`] - Per-resource page and permission configuration
//! - [`search`], [`order`], [`pagination`], [`scope`] - Collection queries
//! - [`store`] / [`locator`] - Persistence and global-id resolution
//! - [`params`] - Request parameter parsing and sanitization
//! - [`authorization`] - The authorization hook
//! - [`registry`] - Route key to resource resolution
//! - [`page`], [`helpers`], [`flash`] - View-models and presentation helpers
//! - [`controller`] - The seven CRUD actions
//! - [`site`] - Site assembly and HTTP routing

pub mod authorization;
pub mod controller;
pub mod dashboard;
pub mod field;
pub mod flash;
pub mod helpers;
pub mod locator;
pub mod model;
pub mod order;
pub mod page;
pub mod pagination;
pub mod params;
pub mod registry;
pub mod resource;
pub mod scope;
pub mod search;
pub mod site;
pub mod store;

pub use controller::{ResourceController, Response};
pub use dashboard::Dashboard;
pub use field::FieldType;
pub use registry::{ResourceEntry, ResourceRegistry};
pub use resource::Resource;
pub use site::AdminSite;
