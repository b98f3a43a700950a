//! Pipeline orchestration
//!
//! Fetches the eight queries concurrently, each behind its own timeout,
//! then runs the engine stages over whatever arrived. A failed query
//! degrades the run with a warning; only the overall deadline aborts it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::engine::{self, MetricBatch};
use crate::error::{OptimizerError, Warning};
use crate::models::{MetricSeries, OptimizationReport};
use crate::prom::{MetricsBackend, QuerySet, USAGE_STEP_SECS};

/// Configuration handed to the pipeline at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Historical window to analyze, in hours (24-168 is typical).
    pub lookback_hours: f64,
    /// Timeout applied to each of the eight queries independently.
    pub query_timeout: Duration,
    /// Deadline for the whole run.
    pub deadline: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lookback_hours: 168.0,
            query_timeout: Duration::from_secs(10),
            deadline: Duration::from_secs(120),
        }
    }
}

/// Single-pass analysis pipeline over one query batch.
pub struct Pipeline {
    backend: Arc<dyn MetricsBackend>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(backend: Arc<dyn MetricsBackend>, config: PipelineConfig) -> Self {
        Self { backend, config }
    }

    /// Run the full pipeline, evaluating all queries at `at`.
    pub async fn run(&self, at: DateTime<Utc>) -> Result<OptimizationReport, OptimizerError> {
        let deadline = self.config.deadline;
        tokio::time::timeout(deadline, self.run_inner(at))
            .await
            .map_err(|_| OptimizerError::DeadlineExceeded {
                seconds: deadline.as_secs(),
            })
    }

    async fn run_inner(&self, at: DateTime<Utc>) -> OptimizationReport {
        let queries = QuerySet::new(self.config.lookback_hours);
        let start = at - chrono::Duration::seconds((queries.lookback_hours() * 3600.0) as i64);
        let step = Duration::from_secs(USAGE_STEP_SECS);

        info!(
            lookback_hours = self.config.lookback_hours,
            "Starting optimization run"
        );

        // The eight fetches are mutually independent.
        let (
            cpu_usage,
            memory_usage,
            cpu_requests,
            cpu_limits,
            memory_requests,
            memory_limits,
            indirect,
            direct,
        ) = tokio::join!(
            self.fetch_range("cpu_usage", queries.cpu_usage(), start, at, step),
            self.fetch_range("memory_usage", queries.memory_usage(), start, at, step),
            self.fetch("cpu_requests", queries.cpu_requests(), at),
            self.fetch("cpu_limits", queries.cpu_limits(), at),
            self.fetch("memory_requests", queries.memory_requests(), at),
            self.fetch("memory_limits", queries.memory_limits(), at),
            self.fetch("indirect_ownership", queries.indirect_ownership(), at),
            self.fetch("direct_ownership", queries.direct_ownership(), at),
        );

        let mut warnings = Vec::new();
        let batch = MetricBatch {
            cpu_usage: collect(cpu_usage, &mut warnings),
            memory_usage: collect(memory_usage, &mut warnings),
            cpu_requests: collect(cpu_requests, &mut warnings),
            cpu_limits: collect(cpu_limits, &mut warnings),
            memory_requests: collect(memory_requests, &mut warnings),
            memory_limits: collect(memory_limits, &mut warnings),
        };
        let indirect = collect(indirect, &mut warnings);
        let direct = collect(direct, &mut warnings);

        let ownership =
            engine::resolve_ownership(&indirect, &direct, self.config.lookback_hours);
        let records = engine::aggregate(&ownership, &batch, self.config.lookback_hours);
        let buckets = engine::classify(records);
        let summary = buckets.summary();
        let (ranked, unscored) = engine::rank(engine::recommend(&buckets));

        info!(
            instances = ownership.instance_count(),
            ranked = ranked.len(),
            unscored = unscored.len(),
            warnings = warnings.len(),
            "Optimization run complete"
        );

        OptimizationReport {
            generated_at: at.to_rfc3339(),
            window_hours: self.config.lookback_hours,
            buckets: summary,
            ranked,
            unscored,
            warnings,
        }
    }

    async fn fetch(
        &self,
        name: &str,
        expr: String,
        at: DateTime<Utc>,
    ) -> (Vec<MetricSeries>, Option<Warning>) {
        let result =
            tokio::time::timeout(self.config.query_timeout, self.backend.query(&expr, at)).await;
        self.settle(name, result)
    }

    async fn fetch_range(
        &self,
        name: &str,
        expr: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> (Vec<MetricSeries>, Option<Warning>) {
        let result = tokio::time::timeout(
            self.config.query_timeout,
            self.backend.query_range(&expr, start, end, step),
        )
        .await;
        self.settle(name, result)
    }

    fn settle(
        &self,
        name: &str,
        result: Result<anyhow::Result<Vec<MetricSeries>>, tokio::time::error::Elapsed>,
    ) -> (Vec<MetricSeries>, Option<Warning>) {
        match result {
            Ok(Ok(series)) => {
                debug!(query = name, series = series.len(), "Query complete");
                (series, None)
            }
            Ok(Err(e)) => {
                warn!(query = name, error = %e, "Query failed, continuing without it");
                (Vec::new(), Some(Warning::new(name, e.to_string())))
            }
            Err(_) => {
                let detail = format!(
                    "timed out after {}s",
                    self.config.query_timeout.as_secs()
                );
                warn!(query = name, detail = %detail, "Query timed out, continuing without it");
                (Vec::new(), Some(Warning::new(name, detail)))
            }
        }
    }
}

fn collect(
    outcome: (Vec<MetricSeries>, Option<Warning>),
    warnings: &mut Vec<Warning>,
) -> Vec<MetricSeries> {
    let (series, warning) = outcome;
    if let Some(warning) = warning {
        warnings.push(warning);
    }
    series
}
