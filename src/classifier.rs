//! Classification of route path templates into permission groups.
//!
//! A path such as `/api/v1/projects/:project/views/:view` is reduced to its
//! literal segments (`["projects", "views"]`) and a group name made of those
//! segments joined with `_` (`projects_views`). A small alias table folds
//! route families that mean the same thing into one group.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RouteError;

pub const DEFAULT_API_PREFIX: &str = "/api/v1/";
pub const DEFAULT_PARAM_SIGIL: char = ':';

/// Known aliasing route families: (candidate group, canonical group).
const DEFAULT_ALIASES: &[(&str, &str)] = &[("projects_tasks", "tasks"), ("tasks_all", "tasks")];

/// The group a path belongs to and its literal segments.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct RouteClassification {
    pub group: String,
    pub segments: Vec<String>,
}

impl RouteClassification {
    pub fn first_segment(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Everything after the first segment, joined with `_`.
    pub fn sub_key(&self) -> String {
        self.segments.iter().skip(1).join("_")
    }
}

/// Pure path classifier. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    prefix: String,
    param_sigil: char,
    aliases: BTreeMap<String, String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(DEFAULT_API_PREFIX, DEFAULT_PARAM_SIGIL)
    }
}

impl Classifier {
    /// Create a classifier with the default alias table.
    pub fn new(prefix: impl Into<String>, param_sigil: char) -> Self {
        Classifier {
            prefix: prefix.into(),
            param_sigil,
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// Fold the candidate group `from` into the group `to`.
    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases.insert(from.into(), to.into());
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn param_sigil(&self) -> char {
        self.param_sigil
    }

    pub fn is_param(&self, segment: &str) -> bool {
        segment.starts_with(self.param_sigil)
    }

    /// Classify a path template (or a concrete request path).
    ///
    /// Fails only if the path does not start with the API prefix.
    pub fn classify(&self, path: &str) -> Result<RouteClassification, RouteError> {
        let rest = self.strip_prefix(path).ok_or_else(|| RouteError::UnclassifiableRoute {
            path: path.to_string(),
            prefix: self.prefix.clone(),
        })?;

        let segments: Vec<String> = rest
            .split('/')
            .filter(|s| !s.is_empty() && !self.is_param(s))
            .map(str::to_string)
            .collect();

        let group = segments.join("_");
        if let Some(canonical) = self.aliases.get(&group) {
            return Ok(RouteClassification {
                group: canonical.clone(),
                segments: vec![canonical.clone()],
            });
        }

        Ok(RouteClassification { group, segments })
    }

    fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.prefix.as_str())
            .or_else(|| (path == self.prefix.trim_end_matches('/')).then_some(""))
    }
}
