//! Route details and the catalog of token-usable routes.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One concrete HTTP endpoint, identified by its path template and method.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct RouteDetail {
    pub path: String,
    pub method: String,
}

impl RouteDetail {
    /// Create a route detail. The method is normalized to upper case.
    pub fn new<P: Into<String>, M: AsRef<str>>(path: P, method: M) -> Self {
        RouteDetail {
            path: path.into(),
            method: method.as_ref().to_ascii_uppercase(),
        }
    }

    /// Whether this route is exactly the given path and method.
    pub fn matches(&self, path: &str, method: &str) -> bool {
        self.path == path && self.method.eq_ignore_ascii_case(method)
    }
}

impl Display for RouteDetail {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// All routes of one permission group, keyed by action name.
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(transparent)]
pub struct RouteCatalogEntry(BTreeMap<String, RouteDetail>);

impl RouteCatalogEntry {
    pub fn get(&self, action: &str) -> Option<&RouteDetail> {
        self.0.get(action)
    }

    pub fn contains_action(&self, action: &str) -> bool {
        self.0.contains_key(action)
    }

    /// Whether any action in this entry already points at exactly this route.
    pub fn contains_route(&self, route: &RouteDetail) -> bool {
        self.0.values().any(|r| r == route)
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteDetail)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or replace an action, returning the route it replaced.
    pub(crate) fn insert(&mut self, action: String, route: RouteDetail) -> Option<RouteDetail> {
        self.0.insert(action, route)
    }

    pub(crate) fn entry(&mut self, action: String) -> Entry<'_, String, RouteDetail> {
        self.0.entry(action)
    }
}

impl<K: Into<String>> FromIterator<(K, RouteDetail)> for RouteCatalogEntry {
    fn from_iter<I: IntoIterator<Item = (K, RouteDetail)>>(iter: I) -> Self {
        RouteCatalogEntry(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// The complete catalog of token-usable routes: group -> action -> route.
///
/// This is the body published to clients so they can discover which
/// permissions a token may be granted.
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(transparent)]
pub struct RouteCatalog(BTreeMap<String, RouteCatalogEntry>);

impl RouteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group: &str) -> Option<&RouteCatalogEntry> {
        self.0.get(group)
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.0.contains_key(group)
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteCatalogEntry)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the entry for a group, creating an empty one if needed.
    pub(crate) fn group_mut(&mut self, group: &str) -> &mut RouteCatalogEntry {
        self.0.entry(group.to_string()).or_default()
    }
}

impl<K: Into<String>> FromIterator<(K, RouteCatalogEntry)> for RouteCatalog {
    fn from_iter<I: IntoIterator<Item = (K, RouteCatalogEntry)>>(iter: I) -> Self {
        RouteCatalog(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
