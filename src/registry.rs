use std::collections::btree_map::Entry;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::classifier::{Classifier, DEFAULT_API_PREFIX, DEFAULT_PARAM_SIGIL, RouteClassification};
use crate::error::RouteError;
use crate::metrics::{self, MetricsSink, RegistrationStats};
use crate::types::{
    CanonicalAction, HandlerKind, PermissionSet, Registration, RouteCatalog, RouteDetail,
    RouteRegistration, SkipReason,
};
use crate::validator;

/// Group collecting generic single-segment routes such as `/api/v1/info`.
pub const OTHER_GROUP: &str = "other";
pub const DEFAULT_ATTACHMENT_GROUP: &str = "tasks_attachments";

/// Groups that are only ever usable with a user session.
const DEFAULT_EXCLUSION_PATTERNS: &[&str] = &[
    r"^user$",
    r"^tokenTest$",
    r"^subscriptions$",
    r"^tokens$",
    r"^\*$",
    r"^user_",
    r"_bulk$",
];

static DEFAULT_EXCLUSIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    DEFAULT_EXCLUSION_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("static exclusion pattern"))
        .collect()
});

struct RegistryConfig {
    classifier: Classifier,
    exclusions: Vec<Regex>,
    attachment_group: String,
    sink: Option<Arc<dyn MetricsSink>>,
}

impl RegistryConfig {
    fn is_excluded(&self, group: &str) -> bool {
        self.exclusions.iter().any(|re| re.is_match(group))
    }
}

#[derive(Debug, Default)]
pub(crate) struct RegistryState {
    catalog: RouteCatalog,
    /// Every session-gated route seen, in registration order, excluded groups included.
    templates: Vec<RouteDetail>,
}

impl RegistryState {
    pub(crate) fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    /// Find the registered route template a request path was routed to.
    ///
    /// Parameter segments match any non-empty value. The template with the
    /// most literal segments wins, then one registered for the same method,
    /// then the earliest registered.
    pub(crate) fn resolve_template(
        &self,
        classifier: &Classifier,
        path: &str,
        method: &str,
    ) -> Option<&RouteDetail> {
        let request: Vec<&str> = path.split('/').collect();
        let mut best: Option<((usize, bool), &RouteDetail)> = None;

        for template in &self.templates {
            let Some(literals) = match_template(classifier, &template.path, &request) else {
                continue;
            };
            let score = (literals, template.method.eq_ignore_ascii_case(method));
            if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
                best = Some((score, template));
            }
        }

        best.map(|(_, template)| template)
    }

    fn insert_canonical(
        &mut self,
        group: &str,
        action: CanonicalAction,
        route: RouteDetail,
    ) -> Registration {
        let entry = self.catalog.group_mut(group);
        if entry.get(action.as_ref()) == Some(&route) {
            return Registration::skipped(SkipReason::AlreadyRegistered);
        }

        if let Some(previous) = entry.insert(action.to_string(), route.clone()) {
            warn!(
                event = "Register",
                phase = "Replaced",
                group = group,
                action = %action,
                previous = %previous,
                route = %route
            );
        }

        Registration::Registered {
            group: group.to_string(),
            action: action.to_string(),
        }
    }

    fn insert_generic(
        &mut self,
        classification: &RouteClassification,
        route: RouteDetail,
    ) -> Registration {
        let (group, key) = match classification.segments.as_slice() {
            [] => return Registration::skipped(SkipReason::EmptyGroup),
            [_] => (OTHER_GROUP.to_string(), classification.group.clone()),
            [first, ..] => (first.clone(), classification.sub_key()),
        };

        let entry = self.catalog.group_mut(&group);
        if entry.contains_route(&route) {
            return Registration::skipped(SkipReason::AlreadyRegistered);
        }

        let key = if entry.contains_action(&key) {
            format!("{key}_{}", route.method.to_ascii_lowercase())
        } else {
            key
        };

        match entry.entry(key) {
            Entry::Vacant(slot) => {
                let action = slot.key().clone();
                slot.insert(route);
                Registration::Registered { group, action }
            }
            Entry::Occupied(slot) => {
                warn!(
                    event = "Register",
                    phase = "Conflict",
                    group = group,
                    action = slot.key(),
                    existing = %slot.get(),
                    route = %route
                );
                Registration::skipped(SkipReason::KeyConflict)
            }
        }
    }
}

fn match_template(classifier: &Classifier, template: &str, request: &[&str]) -> Option<usize> {
    let segments: Vec<&str> = template.split('/').collect();
    if segments.len() != request.len() {
        return None;
    }

    let mut literals = 0;
    for (t, r) in segments.iter().zip(request) {
        if classifier.is_param(t) {
            if r.is_empty() {
                return None;
            }
        } else if t == r {
            literals += 1;
        } else {
            return None;
        }
    }
    Some(literals)
}

/// The catalog of routes usable with API tokens. Cloneable and thread-safe.
///
/// Routes are registered once at startup; afterwards the registry is only
/// read, by the [`Authorizer`](crate::Authorizer) and by permission validation.
#[derive(Clone)]
pub struct RouteRegistry {
    inner: Arc<RwLock<RegistryState>>,
    config: Arc<RegistryConfig>,
}

impl Default for RouteRegistry {
    fn default() -> Self {
        RouteRegistry::new()
    }
}

impl RouteRegistry {
    /// A registry with the default prefix, aliases, exclusions and attachment group.
    pub fn new() -> Self {
        RouteRegistryBuilder::default().finish(DEFAULT_EXCLUSIONS.clone())
    }

    pub fn builder() -> RouteRegistryBuilder {
        RouteRegistryBuilder::default()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.config.classifier
    }

    /// Record one route enumerated by the router.
    ///
    /// Only fails if a session-gated route does not carry the API prefix.
    pub fn register(&self, route: &RouteRegistration) -> Result<Registration, RouteError> {
        let outcome = self.record(route)?;

        match &outcome {
            Registration::Registered { group, action } => debug!(
                event = "Register",
                phase = "Registered",
                path = route.path,
                method = route.method,
                group = group,
                action = action
            ),
            Registration::Skipped { reason } => debug!(
                event = "Register",
                phase = "Skipped",
                path = route.path,
                method = route.method,
                reason = %reason
            ),
        }

        metrics::sink_or_global(self.config.sink.as_ref()).on_registration(&RegistrationStats {
            path: route.path.clone(),
            method: route.method.clone(),
            outcome: outcome.clone(),
        });

        Ok(outcome)
    }

    /// Register every route in order, stopping at the first error.
    pub fn register_all<'a, I>(&self, routes: I) -> Result<Vec<Registration>, RouteError>
    where
        I: IntoIterator<Item = &'a RouteRegistration>,
    {
        routes.into_iter().map(|r| self.register(r)).collect()
    }

    fn record(&self, route: &RouteRegistration) -> Result<Registration, RouteError> {
        if route.handler == HandlerKind::NotFound {
            return Ok(Registration::skipped(SkipReason::NotFound));
        }
        if !route.requires_session_auth {
            return Ok(Registration::skipped(SkipReason::NoSessionAuth));
        }

        let classification = self.config.classifier.classify(&route.path)?;
        let detail = RouteDetail::new(route.path.as_str(), &route.method);

        let mut state = self.inner.write()?;
        if !state.templates.contains(&detail) {
            state.templates.push(detail.clone());
        }

        let group = classification.group.as_str();
        if group.is_empty() {
            return Ok(Registration::skipped(SkipReason::EmptyGroup));
        }
        if self.config.is_excluded(group) {
            return Ok(Registration::skipped(SkipReason::Excluded));
        }

        if route.handler == HandlerKind::Generic {
            return Ok(state.insert_generic(&classification, detail));
        }

        let action = route.handler.canonical_action().or_else(|| {
            (group == self.config.attachment_group)
                .then(|| route.handler.attachment_action())
                .flatten()
        });

        Ok(match action {
            Some(action) => state.insert_canonical(group, action, detail),
            None => Registration::skipped(SkipReason::UnmappedAttachment),
        })
    }

    /// A snapshot of the full catalog.
    pub fn catalog(&self) -> Result<RouteCatalog, RouteError> {
        Ok(self.inner.read()?.catalog.clone())
    }

    /// The catalog as the JSON body of the route listing endpoint.
    pub fn catalog_json(&self) -> Result<serde_json::Value, RouteError> {
        let state = self.inner.read()?;
        Ok(serde_json::to_value(&state.catalog)?)
    }

    /// Check a token permission set against the catalog before it is saved.
    pub fn validate_permissions(&self, permissions: &PermissionSet) -> Result<(), RouteError> {
        let state = self.inner.read()?;
        validator::validate(&state.catalog, permissions)
    }

    /// The registered route template a concrete request path matches, if any.
    pub fn resolve_template(
        &self,
        path: &str,
        method: &str,
    ) -> Result<Option<RouteDetail>, RouteError> {
        let state = self.inner.read()?;
        Ok(state
            .resolve_template(&self.config.classifier, path, method)
            .cloned())
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, RegistryState>, RouteError> {
        Ok(self.inner.read()?)
    }
}

/// Configures a [`RouteRegistry`]. Defaults match [`RouteRegistry::new`].
pub struct RouteRegistryBuilder {
    prefix: String,
    param_sigil: char,
    aliases: Vec<(String, String)>,
    exclusion_patterns: Vec<String>,
    attachment_group: String,
    sink: Option<Arc<dyn MetricsSink>>,
}

impl Default for RouteRegistryBuilder {
    fn default() -> Self {
        RouteRegistryBuilder {
            prefix: DEFAULT_API_PREFIX.to_string(),
            param_sigil: DEFAULT_PARAM_SIGIL,
            aliases: Vec::new(),
            exclusion_patterns: Vec::new(),
            attachment_group: DEFAULT_ATTACHMENT_GROUP.to_string(),
            sink: None,
        }
    }
}

impl RouteRegistryBuilder {
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn param_sigil(mut self, sigil: char) -> Self {
        self.param_sigil = sigil;
        self
    }

    /// Fold an additional route family into an existing group.
    pub fn alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases.push((from.into(), to.into()));
        self
    }

    /// Exclude every group matching this regular expression, on top of the defaults.
    pub fn exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.exclusion_patterns.push(pattern.into());
        self
    }

    pub fn attachment_group(mut self, group: impl Into<String>) -> Self {
        self.attachment_group = group.into();
        self
    }

    pub fn metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<RouteRegistry, RouteError> {
        let mut exclusions = DEFAULT_EXCLUSIONS.clone();
        for pattern in &self.exclusion_patterns {
            exclusions.push(Regex::new(pattern)?);
        }
        Ok(self.finish(exclusions))
    }

    fn finish(self, exclusions: Vec<Regex>) -> RouteRegistry {
        let classifier = self
            .aliases
            .into_iter()
            .fold(Classifier::new(self.prefix, self.param_sigil), |c, (from, to)| {
                c.with_alias(from, to)
            });

        RouteRegistry {
            inner: Arc::new(RwLock::new(RegistryState::default())),
            config: Arc::new(RegistryConfig {
                classifier,
                exclusions,
                attachment_group: self.attachment_group,
                sink: self.sink,
            }),
        }
    }
}

#[cfg(test)]
mod tests;
