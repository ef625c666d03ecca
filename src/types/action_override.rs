//! Explicit request-to-action overrides.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Forces the action for one route template within one group.
///
/// Needed where two different URL forms mean the same logical action but
/// register as different routes, e.g. `/projects/:project/tasks` and
/// `/tasks/all` both listing tasks.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ActionOverride {
    pub group: String,
    pub path: String,
    pub method: String,
    pub action: String,
}

impl ActionOverride {
    pub fn new(
        group: impl Into<String>,
        path: impl Into<String>,
        method: impl AsRef<str>,
        action: impl Into<String>,
    ) -> Self {
        ActionOverride {
            group: group.into(),
            path: path.into(),
            method: method.as_ref().to_ascii_uppercase(),
            action: action.into(),
        }
    }

    /// Whether this override applies to a request classified into `group`.
    pub fn applies_to(&self, group: &str, path: &str, method: &str) -> bool {
        self.group == group && self.path == path && self.method.eq_ignore_ascii_case(method)
    }
}
