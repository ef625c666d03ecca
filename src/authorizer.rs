use std::sync::Arc;
use std::time::Instant;

use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::metrics::{self, AuthorizationStats, MetricsSink};
use crate::registry::{OTHER_GROUP, RegistryState, RouteRegistry};
use crate::traits::TokenPermissions;
use crate::types::{ActionOverride, CanonicalAction, Decision, DenyReason, RouteCatalogEntry};

/// Decides whether an API token may call a route. Cloneable and thread-safe.
#[derive(Clone)]
pub struct Authorizer {
    registry: RouteRegistry,
    overrides: Vec<ActionOverride>,
    sink: Option<Arc<dyn MetricsSink>>,
}

impl Authorizer {
    /// An authorizer over `registry` with the default overrides.
    ///
    /// The project-scoped task list (`GET <prefix>projects/:project/tasks`) is
    /// the same permission as `GET <prefix>tasks/all`, so it is forced to
    /// `tasks.read_all`.
    pub fn new(registry: RouteRegistry) -> Self {
        let classifier = registry.classifier();
        let project_tasks = format!(
            "{}projects/{}project/tasks",
            classifier.prefix(),
            classifier.param_sigil()
        );
        let overrides = vec![ActionOverride::new(
            "tasks",
            project_tasks,
            "GET",
            CanonicalAction::ReadAll.to_string(),
        )];

        Authorizer {
            registry,
            overrides,
            sink: None,
        }
    }

    pub fn with_override(mut self, action_override: ActionOverride) -> Self {
        self.overrides.push(action_override);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Whether `token` may call `method path`.
    ///
    /// `path` may be the route template the router matched or the concrete
    /// request path.
    pub fn authorize<T>(&self, path: &str, method: &str, token: &T) -> bool
    where
        T: TokenPermissions + ?Sized,
    {
        self.decide(path, method, token).is_allowed()
    }

    /// Like [`Authorizer::authorize`], returning the full decision.
    pub fn decide<T>(&self, path: &str, method: &str, token: &T) -> Decision
    where
        T: TokenPermissions + ?Sized,
    {
        let start = Instant::now();

        let decision = match self.registry.read() {
            Ok(state) => self.evaluate(&state, path, method, token),
            Err(err) => {
                warn!(event = "Authorize", phase = "Registry", error = %err);
                Decision::deny(DenyReason::RegistryUnavailable)
            }
        };

        let (group, action) = match &decision {
            Decision::Allow { group, action } => (Some(group.clone()), Some(action.clone())),
            Decision::Deny {
                reason: DenyReason::ActionNotGranted { group, action },
            } => (Some(group.clone()), Some(action.clone())),
            Decision::Deny {
                reason: DenyReason::GroupNotGranted { group } | DenyReason::UnknownGroup { group },
            } => (Some(group.clone()), None),
            Decision::Deny { .. } => (None, None),
        };

        metrics::sink_or_global(self.sink.as_ref()).on_authorization(&AuthorizationStats {
            duration: start.elapsed(),
            allowed: decision.is_allowed(),
            token_id: token.token_id(),
            group,
            action,
        });

        decision
    }

    fn evaluate<T: TokenPermissions + ?Sized>(
        &self,
        state: &RegistryState,
        path: &str,
        method: &str,
        token: &T,
    ) -> Decision {
        let classifier = self.registry.classifier();
        let template = state
            .resolve_template(classifier, path, method)
            .map_or(path, |t| t.path.as_str());

        let classification = match classifier.classify(template) {
            Ok(c) => c,
            Err(err) => {
                debug!(
                    event = "Authorize",
                    phase = "Classify",
                    token = token.token_id(),
                    error = %err
                );
                return Decision::deny(DenyReason::Unclassifiable {
                    path: path.to_string(),
                });
            }
        };

        let group = classification.group.as_str();
        let first = classification.first_segment();
        let single_segment = classification.segments.len() == 1;

        let catalog = state.catalog();
        let resolved = catalog
            .get(group)
            .map(|routes| (group, routes, String::new()))
            .or_else(|| {
                let first = first?;
                catalog
                    .get(first)
                    .map(|routes| (first, routes, classification.sub_key()))
            })
            .or_else(|| {
                single_segment
                    .then(|| catalog.get(OTHER_GROUP))
                    .flatten()
                    .map(|routes| (OTHER_GROUP, routes, group.to_string()))
            });

        let Some((resolved_group, routes, mut action)) = resolved else {
            return self.denied(token, template, DenyReason::UnknownGroup {
                group: group.to_string(),
            });
        };

        // A single-segment group can also have generic routes filed under "other".
        let (resolved_group, exact) = match exact_action(routes, template, method) {
            None if single_segment && resolved_group != OTHER_GROUP => catalog
                .get(OTHER_GROUP)
                .and_then(|other| exact_action(other, template, method))
                .map_or((resolved_group, None), |key| (OTHER_GROUP, Some(key))),
            exact => (resolved_group, exact),
        };

        // Routes filed under "other" are only granted through "other".
        let permissions = token.permissions();
        let granted = if resolved_group == OTHER_GROUP && group != OTHER_GROUP {
            permissions.get(OTHER_GROUP)
        } else {
            permissions
                .get(group)
                .or_else(|| first.and_then(|s| permissions.get(s)))
        };

        let Some(granted) = granted else {
            return self.denied(token, template, DenyReason::GroupNotGranted {
                group: resolved_group.to_string(),
            });
        };

        if let Some(exact) = exact {
            action = exact;
        }

        if let Some(o) = self
            .overrides
            .iter()
            .rev()
            .find(|o| o.applies_to(group, template, method))
        {
            action = o.action.clone();
        }

        if !action.is_empty() && granted.iter().any(|a| *a == action) {
            debug!(
                event = "Authorize",
                phase = "Allowed",
                token = token.token_id(),
                path = template,
                group = resolved_group,
                action = action
            );
            return Decision::Allow {
                group: resolved_group.to_string(),
                action,
            };
        }

        self.denied(token, template, DenyReason::ActionNotGranted {
            group: resolved_group.to_string(),
            action,
        })
    }

    fn denied<T>(&self, token: &T, path: &str, reason: DenyReason) -> Decision
    where
        T: TokenPermissions + ?Sized,
    {
        let action = match &reason {
            DenyReason::ActionNotGranted { action, .. } => action.as_str(),
            _ => "",
        };
        info!(
            event = "Authorize",
            phase = "Denied",
            token = token.token_id(),
            path = path,
            action = action,
            permissions = %token.permissions(),
            reason = %reason
        );
        Decision::deny(reason)
    }
}

/// The action whose stored route is exactly this path and method.
///
/// Any key may match, but the canonical actions are checked last, in their
/// fixed order, so a canonical match always wins and the last one wins among
/// them.
fn exact_action(routes: &RouteCatalogEntry, path: &str, method: &str) -> Option<String> {
    let generic = routes
        .iter()
        .filter(|(key, _)| key.parse::<CanonicalAction>().is_err())
        .filter(|(_, route)| route.matches(path, method))
        .map(|(key, _)| key.to_string())
        .next();

    let canonical = CanonicalAction::iter()
        .filter(|action| {
            routes
                .get(action.as_ref())
                .is_some_and(|route| route.matches(path, method))
        })
        .last()
        .map(|action| action.to_string());

    canonical.or(generic)
}
