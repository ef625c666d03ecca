//! Data model types for route catalogs, token permissions and decisions.
//!
//! JSON forms:
//! - RouteDetail: `{"path": "/api/v1/projects/:project/tasks", "method": "PUT"}`
//! - RouteCatalog: `{"tasks": {"create": <RouteDetail>, ...}, ...}`
//! - PermissionSet: `{"tasks": ["create", "read_all"], ...}`

mod action_override;
mod decision;
mod handler;
mod permissions;
mod route;

pub use action_override::ActionOverride;
pub use decision::{Decision, DenyReason, Registration, SkipReason};
pub use handler::{CanonicalAction, HandlerKind, RouteRegistration};
pub use permissions::{ApiToken, PermissionSet};
pub use route::{RouteCatalog, RouteCatalogEntry, RouteDetail};
