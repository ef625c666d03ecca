//! Authorization decisions and registration outcomes.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Why a token request was denied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenyReason {
    /// The request path does not carry the API prefix.
    Unclassifiable { path: String },
    /// The token has no permissions for the route's group.
    GroupNotGranted { group: String },
    /// No token-usable routes exist for the route's group.
    UnknownGroup { group: String },
    /// The token's group grant does not include the route's action.
    ActionNotGranted { group: String, action: String },
    /// The route registry could not be read.
    RegistryUnavailable,
}

impl Display for DenyReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DenyReason::Unclassifiable { path } => write!(f, "unclassifiable path {path}"),
            DenyReason::GroupNotGranted { group } => write!(f, "group {group} not granted"),
            DenyReason::UnknownGroup { group } => write!(f, "no token routes for group {group}"),
            DenyReason::ActionNotGranted { group, action } => {
                write!(f, "action '{action}' not granted in group {group}")
            }
            DenyReason::RegistryUnavailable => write!(f, "route registry unavailable"),
        }
    }
}

/// Allow or deny decision for one token request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum Decision {
    Allow { group: String, action: String },
    Deny { reason: DenyReason },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    pub(crate) fn deny(reason: DenyReason) -> Self {
        Decision::Deny { reason }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Decision::Allow { group, action } => write!(f, "Allow({group}.{action})"),
            Decision::Deny { reason } => write!(f, "Deny({reason})"),
        }
    }
}

/// Why a route registration did not produce a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The router's not-found sentinel route.
    NotFound,
    /// The route is not behind session authentication.
    NoSessionAuth,
    /// The path classifies to an empty group.
    EmptyGroup,
    /// The group is session-only and must never be reachable with a token.
    Excluded,
    /// An attachment handler outside the attachment group.
    UnmappedAttachment,
    /// The exact same path and method is already in the catalog.
    AlreadyRegistered,
    /// Both the plain and the method-suffixed key are taken by other routes.
    KeyConflict,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            SkipReason::NotFound => "not found route",
            SkipReason::NoSessionAuth => "no session authentication",
            SkipReason::EmptyGroup => "empty group",
            SkipReason::Excluded => "excluded group",
            SkipReason::UnmappedAttachment => "unmapped attachment handler",
            SkipReason::AlreadyRegistered => "already registered",
            SkipReason::KeyConflict => "key conflict",
        };
        write!(f, "{s}")
    }
}

/// The outcome of registering one route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum Registration {
    Registered { group: String, action: String },
    Skipped { reason: SkipReason },
}

impl Registration {
    pub fn is_registered(&self) -> bool {
        matches!(self, Registration::Registered { .. })
    }

    pub(crate) fn skipped(reason: SkipReason) -> Self {
        Registration::Skipped { reason }
    }
}

impl Display for Registration {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Registration::Registered { group, action } => {
                write!(f, "Registered({group}.{action})")
            }
            Registration::Skipped { reason } => write!(f, "Skipped({reason})"),
        }
    }
}
