//! # Prometheus Metrics
//!
//! Exposes operational metrics for the registry node. Scraped by Prometheus
//! at the `/metrics` HTTP endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
///
/// Clone-friendly (wraps `Arc` internally via prometheus handles) so it can
/// be shared across request handlers.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Total signed envelopes received on the submit endpoint.
    pub instructions_submitted_total: IntCounter,
    /// Total submissions rejected (bad envelope or registry error).
    pub instructions_rejected_total: IntCounter,
    /// Total first mints committed.
    pub objects_minted_total: IntCounter,
    /// Total manifest updates committed.
    pub manifest_updates_total: IntCounter,
    /// Number of live configurations (namespaces, including superseded).
    pub namespaces: IntGauge,
    /// Histogram of instruction execution latency in seconds.
    pub instruction_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("ember".into()), None)
            .expect("failed to create prometheus registry");

        let instructions_submitted_total = IntCounter::new(
            "instructions_submitted_total",
            "Total signed envelopes received on the submit endpoint",
        )
        .expect("metric creation");
        registry
            .register(Box::new(instructions_submitted_total.clone()))
            .expect("metric registration");

        let instructions_rejected_total = IntCounter::new(
            "instructions_rejected_total",
            "Total submissions rejected by verification or the registry",
        )
        .expect("metric creation");
        registry
            .register(Box::new(instructions_rejected_total.clone()))
            .expect("metric registration");

        let objects_minted_total = IntCounter::new(
            "objects_minted_total",
            "Total first mints committed by the registry",
        )
        .expect("metric creation");
        registry
            .register(Box::new(objects_minted_total.clone()))
            .expect("metric registration");

        let manifest_updates_total = IntCounter::new(
            "manifest_updates_total",
            "Total manifest content updates committed",
        )
        .expect("metric creation");
        registry
            .register(Box::new(manifest_updates_total.clone()))
            .expect("metric registration");

        let namespaces = IntGauge::new(
            "namespaces",
            "Number of live configurations, including superseded ones",
        )
        .expect("metric creation");
        registry
            .register(Box::new(namespaces.clone()))
            .expect("metric registration");

        let instruction_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "instruction_latency_seconds",
                "Instruction execution latency in seconds",
            )
            .buckets(vec![
                0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
            ]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(instruction_latency_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            instructions_submitted_total,
            instructions_rejected_total,
            objects_minted_total,
            manifest_updates_total,
            namespaces,
            instruction_latency_seconds,
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).expect("prometheus output is valid utf-8"))
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails (should never happen in practice).
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
