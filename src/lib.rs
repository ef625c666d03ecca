//! Route-to-permission mapping and authorization for API tokens.
//!
//! At startup every route the router registers is handed to a
//! [`RouteRegistry`], which classifies the session-gated ones into permission
//! groups and actions (`tasks.create`, `projects.background`, ...). At request
//! time an [`Authorizer`] decides whether a token's [`PermissionSet`] covers the
//! route being called, and [`validate`] rejects permission sets that name
//! groups or actions the catalog does not contain.
//!
//! ```rust
//! use routeperm_core::{
//!     ApiToken, Authorizer, HandlerKind, PermissionSet, RouteRegistration, RouteRegistry,
//! };
//!
//! let registry = RouteRegistry::new();
//! registry
//!     .register(
//!         &RouteRegistration::new("PUT", "/api/v1/projects/:project/tasks", HandlerKind::Create)
//!             .session_authenticated(),
//!     )
//!     .unwrap();
//!
//! let permissions = PermissionSet::new().grant("tasks", ["create"]);
//! registry.validate_permissions(&permissions).unwrap();
//!
//! let authorizer = Authorizer::new(registry);
//! let token = ApiToken::new(1, permissions);
//! assert!(authorizer.authorize("/api/v1/projects/42/tasks", "PUT", &token));
//! assert!(!authorizer.authorize("/api/v1/projects/42/tasks/7", "DELETE", &token));
//! ```

pub use authorizer::Authorizer;
pub use classifier::{Classifier, DEFAULT_API_PREFIX, DEFAULT_PARAM_SIGIL, RouteClassification};
pub use error::RouteError;
pub use registry::{DEFAULT_ATTACHMENT_GROUP, OTHER_GROUP, RouteRegistry, RouteRegistryBuilder};
pub use traits::TokenPermissions;
pub use types::{
    ActionOverride, ApiToken, CanonicalAction, Decision, DenyReason, HandlerKind, PermissionSet,
    Registration, RouteCatalog, RouteCatalogEntry, RouteDetail, RouteRegistration, SkipReason,
};
pub use validator::validate;

mod authorizer;
mod classifier;
mod error;
pub mod metrics;
mod registry;
mod traits;
mod types;
mod validator;

#[cfg(test)]
mod tests;
