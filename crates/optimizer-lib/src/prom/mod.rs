//! Metrics backend access
//!
//! The pipeline treats the metrics store as an opaque collaborator behind
//! the `MetricsBackend` trait: instant queries for allocation and ownership
//! series, range queries for the usage series. The production implementation
//! speaks the Prometheus HTTP API.

mod client;
mod queries;

pub use client::PrometheusClient;
pub use queries::{QuerySet, USAGE_STEP_SECS};

use crate::models::MetricSeries;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;

pub use async_trait::async_trait;

/// Trait for metrics query implementations
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Evaluate an instant query at the given instant.
    async fn query(&self, expr: &str, at: DateTime<Utc>) -> Result<Vec<MetricSeries>>;

    /// Evaluate a range query between `start` and `end` at the given step.
    async fn query_range(
        &self,
        expr: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<Vec<MetricSeries>>;
}
