use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum RouteError {
    #[error("route '{path}' does not start with the API prefix '{prefix}'")]
    UnclassifiableRoute { path: String, prefix: String },

    #[error("invalid api token permission group: '{group}' does not exist")]
    InvalidPermissionGroup { group: String },

    #[error("invalid api token permission: '{action}' does not exist in group '{group}'")]
    InvalidPermissionAction { group: String, action: String },

    #[error("invalid exclusion pattern: {0}")]
    InvalidPattern(String),

    #[error("Poisoned lock error: {0}")]
    PoisonedLockError(String),

    #[error("failed to serialize route catalog: {0}")]
    SerializationError(String),
}

impl RouteError {
    /// The permission group an invalid permission error refers to, if any.
    pub fn group(&self) -> Option<&str> {
        match self {
            RouteError::InvalidPermissionGroup { group }
            | RouteError::InvalidPermissionAction { group, .. } => Some(group),
            _ => None,
        }
    }

    /// The action an invalid permission error refers to, if any.
    pub fn action(&self) -> Option<&str> {
        match self {
            RouteError::InvalidPermissionAction { action, .. } => Some(action),
            _ => None,
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for RouteError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        RouteError::PoisonedLockError(err.to_string())
    }
}

impl From<regex::Error> for RouteError {
    fn from(err: regex::Error) -> Self {
        RouteError::InvalidPattern(err.to_string())
    }
}

impl From<serde_json::Error> for RouteError {
    fn from(err: serde_json::Error) -> Self {
        RouteError::SerializationError(err.to_string())
    }
}
