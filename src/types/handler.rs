//! Handler tags and route registrations handed over by the routing layer.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// The five canonical CRUD actions.
///
/// The declaration order is the order in which the authorizer checks them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CanonicalAction {
    Create,
    ReadOne,
    ReadAll,
    Update,
    Delete,
}

/// What kind of handler serves a route.
///
/// Supplied by the integration layer when it registers a route, so the
/// classification never depends on reflected handler names.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HandlerKind {
    Create,
    ReadOne,
    ReadAll,
    Update,
    Delete,
    UploadAttachment,
    GetAttachment,
    /// Any handler that is not one of the generic CRUD operations.
    Generic,
    /// The router's catch-all "route not found" handler.
    NotFound,
}

impl HandlerKind {
    /// The canonical action for the generic CRUD handlers.
    pub fn canonical_action(&self) -> Option<CanonicalAction> {
        match self {
            HandlerKind::Create => Some(CanonicalAction::Create),
            HandlerKind::ReadOne => Some(CanonicalAction::ReadOne),
            HandlerKind::ReadAll => Some(CanonicalAction::ReadAll),
            HandlerKind::Update => Some(CanonicalAction::Update),
            HandlerKind::Delete => Some(CanonicalAction::Delete),
            _ => None,
        }
    }

    /// The canonical action an attachment handler maps to inside the attachment group.
    pub fn attachment_action(&self) -> Option<CanonicalAction> {
        match self {
            HandlerKind::UploadAttachment => Some(CanonicalAction::Create),
            HandlerKind::GetAttachment => Some(CanonicalAction::ReadOne),
            _ => None,
        }
    }
}

/// A route as enumerated by the router at startup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RouteRegistration {
    pub path: String,
    pub method: String,
    pub handler: HandlerKind,
    /// Whether the route's middleware chain includes session authentication.
    pub requires_session_auth: bool,
}

impl RouteRegistration {
    /// A route without session authentication. Use
    /// [`RouteRegistration::session_authenticated`] to mark it as gated.
    pub fn new<M: Into<String>, P: Into<String>>(method: M, path: P, handler: HandlerKind) -> Self {
        RouteRegistration {
            path: path.into(),
            method: method.into(),
            handler,
            requires_session_auth: false,
        }
    }

    pub fn session_authenticated(mut self) -> Self {
        self.requires_session_auth = true;
        self
    }
}
