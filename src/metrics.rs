use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

pub const CACHE_HITS: &str = "api_cache_hits_total";
pub const CACHE_MISSES: &str = "api_cache_misses_total";
pub const CACHE_BYPASS: &str = "api_cache_bypass_total";
pub const SOURCE_QUERIES: &str = "sources_queries_total";
pub const ARTICLES_LOADED: &str = "articles_loaded";

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and expose a static gauge for the cache TTL.
    /// Only one recorder can exist per process.
    pub fn init(cache_ttl: Duration) -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!(CACHE_HITS, "Responses served from the response cache.");
        describe_counter!(CACHE_MISSES, "Responses computed and stored in the cache.");
        describe_counter!(CACHE_BYPASS, "Administrative requests that skipped the cache.");
        describe_counter!(SOURCE_QUERIES, "Primary source queries by kind.");
        describe_gauge!(ARTICLES_LOADED, "Articles held by the store after the last load.");

        // Absolute TTL, no sliding refresh
        gauge!("api_cache_ttl_ms").set(cache_ttl.as_millis() as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
