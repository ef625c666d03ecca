//! Token permission sets and the token entity.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::traits::TokenPermissions;

/// The permissions granted to one API token: group -> allowed action names.
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(transparent)]
pub struct PermissionSet(BTreeMap<String, Vec<String>>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group with its granted actions, replacing any previous grant for the group.
    pub fn grant<G, I, A>(mut self, group: G, actions: I) -> Self
    where
        G: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.0
            .insert(group.into(), actions.into_iter().map(Into::into).collect());
        self
    }

    /// The actions granted for a group, if the group is granted at all.
    pub fn get(&self, group: &str) -> Option<&[String]> {
        self.0.get(group).map(Vec::as_slice)
    }

    /// Whether the token may use `action` within `group`.
    pub fn allows(&self, group: &str, action: &str) -> bool {
        self.get(group)
            .is_some_and(|actions| actions.iter().any(|a| a == action))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Display for PermissionSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let groups = self
            .0
            .iter()
            .map(|(group, actions)| format!("{group}: [{}]", actions.join(", ")))
            .join(", ");
        write!(f, "{{{groups}}}")
    }
}

impl<G, A> FromIterator<(G, Vec<A>)> for PermissionSet
where
    G: Into<String>,
    A: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (G, Vec<A>)>>(iter: I) -> Self {
        PermissionSet(
            iter.into_iter()
                .map(|(g, a)| (g.into(), a.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

/// An API token as far as authorization is concerned: its id and its permissions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ApiToken {
    pub id: i64,
    pub permissions: PermissionSet,
}

impl ApiToken {
    pub fn new(id: i64, permissions: PermissionSet) -> Self {
        ApiToken { id, permissions }
    }
}

impl TokenPermissions for ApiToken {
    fn token_id(&self) -> i64 {
        self.id
    }

    fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }
}
