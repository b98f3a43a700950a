//! Core data models for the optimizer

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Normalized representation of one time series returned by a backend query.
///
/// Instant queries carry a single value; range queries carry one value per
/// resolution step, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub labels: HashMap<String, String>,
    pub values: Vec<f64>,
    pub timestamp: Option<i64>,
}

impl MetricSeries {
    /// Look up a label value, treating a missing label as `None`.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }

    /// The single value of an instant-vector result.
    pub fn scalar(&self) -> Option<f64> {
        self.values.first().copied()
    }
}

/// Stable logical workload identity, durable across pod restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControllerKey {
    pub namespace: String,
    pub kind: String,
    pub name: String,
}

impl fmt::Display for ControllerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.kind, self.name)
    }
}

/// Transient identity of one running pod. Only lives inside ownership
/// resolution; never appears in output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceKey {
    pub namespace: String,
    pub pod: String,
}

/// Key of the unit of analysis: one container of one workload controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub controller: ControllerKey,
    pub container: String,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.controller, self.container)
    }
}

/// A CPU/memory pair where either side may be undeclared. Absence is a
/// distinct state from zero and must never be collapsed into `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputeResources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<f64>,
}

/// Declared allocation of a container: requests and limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceAllocation {
    pub requests: ComputeResources,
    pub limits: ComputeResources,
}

/// Observed usage of a container over the lookback window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// CPU samples in cores, one per resolution step.
    pub cpu_samples: Vec<f64>,
    /// Memory working-set samples in bytes.
    pub memory_samples: Vec<f64>,
    pub window_hours: f64,
}

impl ResourceUsage {
    pub fn is_empty(&self) -> bool {
        self.cpu_samples.is_empty() && self.memory_samples.is_empty()
    }

    pub fn cpu_mean(&self) -> Option<f64> {
        mean(&self.cpu_samples)
    }

    pub fn cpu_max(&self) -> Option<f64> {
        max(&self.cpu_samples)
    }

    pub fn memory_mean(&self) -> Option<f64> {
        mean(&self.memory_samples)
    }

    pub fn memory_max(&self) -> Option<f64> {
        max(&self.memory_samples)
    }
}

fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

fn max(samples: &[f64]) -> Option<f64> {
    samples.iter().copied().reduce(f64::max)
}

/// The joined unit of analysis: usage plus allocation for one
/// workload-container, keyed by `RecordKey`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub key: RecordKey,
    pub usage: ResourceUsage,
    pub allocation: ResourceAllocation,
}

impl ResourceRecord {
    /// An empty record seeding the join: no samples, all allocation absent.
    pub fn empty(key: RecordKey, window_hours: f64) -> Self {
        Self {
            key,
            usage: ResourceUsage {
                window_hours,
                ..Default::default()
            },
            allocation: ResourceAllocation::default(),
        }
    }
}

/// Condensed view of the usage series carried along on a recommendation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_max: Option<f64>,
    pub window_hours: f64,
}

impl UsageSummary {
    pub fn of(usage: &ResourceUsage) -> Self {
        Self {
            cpu_mean: usage.cpu_mean(),
            cpu_max: usage.cpu_max(),
            memory_mean: usage.memory_mean(),
            memory_max: usage.memory_max(),
            window_hours: usage.window_hours,
        }
    }
}

/// A computed right-sizing recommendation for one workload-container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub controller: ControllerKey,
    pub container: String,
    pub usage: UsageSummary,
    pub current: ResourceAllocation,
    pub recommended: ComputeResources,
}

/// A recommendation with its projected-savings score. Unscored
/// recommendations never carry a sentinel; they live in their own list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecommendation {
    pub recommendation: Recommendation,
    pub score: f64,
}

/// Per-bucket record counts, reported alongside the recommendation lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub candidates: usize,
    pub cpu_qualified: usize,
    pub memory_qualified: usize,
    pub qualified: usize,
}

/// Final output of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub generated_at: String,
    pub window_hours: f64,
    pub buckets: BucketSummary,
    /// Scored recommendations, sorted descending by score.
    pub ranked: Vec<ScoredRecommendation>,
    /// Recommendations with no prior request to compare against.
    pub unscored: Vec<Recommendation>,
    pub warnings: Vec<crate::error::Warning>,
}
