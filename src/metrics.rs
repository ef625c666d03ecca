//! Vendor-agnostic metrics collection via a pluggable sink.
//!
//! Consumers implement [`MetricsSink`] to count registrations and token
//! authorization decisions without tying the library to a specific metrics
//! backend (Prometheus, OpenTelemetry, CloudWatch, etc.).
//!
//! ## Usage
//!
//! ```ignore
//! use routeperm_core::metrics::{AuthorizationStats, MetricsSink, RegistrationStats};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! struct DenyCounter {
//!     denies: AtomicU64,
//! }
//!
//! impl MetricsSink for DenyCounter {
//!     fn on_authorization(&self, stats: &AuthorizationStats) {
//!         if !stats.allowed {
//!             self.denies.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn on_registration(&self, _stats: &RegistrationStats) {}
//! }
//!
//! routeperm_core::metrics::set_sink(Arc::new(DenyCounter { denies: AtomicU64::new(0) }));
//! ```
//!
//! A sink can also be scoped to one registry or authorizer with
//! `RouteRegistryBuilder::metrics_sink` and `Authorizer::with_sink`.

use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::warn;

use crate::types::Registration;

/// Snapshot of one token authorization, passed to [`MetricsSink::on_authorization`].
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationStats {
    /// Time spent deciding, including lock acquisition
    pub duration: Duration,
    /// Whether the token was allowed to use the route
    pub allowed: bool,
    /// The token's id
    pub token_id: i64,
    /// The group the request resolved to, if it got that far
    pub group: Option<String>,
    /// The candidate action, if it got that far
    pub action: Option<String>,
}

/// Snapshot of one route registration, passed to [`MetricsSink::on_registration`].
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationStats {
    pub path: String,
    pub method: String,
    pub outcome: Registration,
}

/// Trait for consuming registration and authorization metrics.
///
/// Implementations must be thread-safe because authorization runs
/// concurrently on every request-handling thread, and should not block.
pub trait MetricsSink: Send + Sync {
    /// Called after every authorization decision, allowed or denied.
    fn on_authorization(&self, stats: &AuthorizationStats);

    /// Called after every route registration that did not fail.
    fn on_registration(&self, stats: &RegistrationStats);
}

/// No-op sink; metrics are silently dropped.
struct NoOpSink;

impl MetricsSink for NoOpSink {
    fn on_authorization(&self, _stats: &AuthorizationStats) {}
    fn on_registration(&self, _stats: &RegistrationStats) {}
}

static SINK: OnceLock<Arc<dyn MetricsSink>> = OnceLock::new();

/// Set the global metrics sink.
///
/// Call this once at startup, before routes are registered. Registries and
/// authorizers without their own sink report here.
pub fn set_sink(sink: Arc<dyn MetricsSink>) {
    if SINK.set(sink).is_err() {
        warn!(
            "Metrics sink was already initialized. Ignoring subsequent set_sink call. Set the sink before registering routes."
        );
    }
}

pub(crate) fn get_sink() -> Arc<dyn MetricsSink> {
    SINK.get_or_init(|| Arc::new(NoOpSink)).clone()
}

/// Resolve a scoped sink, falling back to the global one.
pub(crate) fn sink_or_global(scoped: Option<&Arc<dyn MetricsSink>>) -> Arc<dyn MetricsSink> {
    match scoped {
        Some(sink) => Arc::clone(sink),
        None => get_sink(),
    }
}
