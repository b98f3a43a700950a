//! Usage/allocation join
//!
//! Joins the six metric series into one record per (controller, container),
//! starting from the seed universe produced by ownership resolution. Usage
//! samples append; allocation scalars overwrite. Entries whose instance
//! cannot be resolved are discarded: the pod disappeared between queries.

use std::collections::BTreeMap;

use tracing::debug;

use super::Ownership;
use crate::models::{MetricSeries, RecordKey, ResourceRecord};

/// The six metric series of one run, in fetch order.
#[derive(Debug, Default)]
pub struct MetricBatch {
    pub cpu_usage: Vec<MetricSeries>,
    pub cpu_requests: Vec<MetricSeries>,
    pub cpu_limits: Vec<MetricSeries>,
    pub memory_usage: Vec<MetricSeries>,
    pub memory_requests: Vec<MetricSeries>,
    pub memory_limits: Vec<MetricSeries>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    CpuUsage,
    CpuRequests,
    CpuLimits,
    MemoryUsage,
    MemoryRequests,
    MemoryLimits,
}

/// Join the batch onto the ownership seed. Pure: the inputs are borrowed,
/// the returned map is freshly built.
pub fn aggregate(
    ownership: &Ownership,
    batch: &MetricBatch,
    window_hours: f64,
) -> BTreeMap<RecordKey, ResourceRecord> {
    let mut records = ownership.seed_records();

    let passes = [
        (Field::CpuUsage, &batch.cpu_usage),
        (Field::CpuRequests, &batch.cpu_requests),
        (Field::CpuLimits, &batch.cpu_limits),
        (Field::MemoryUsage, &batch.memory_usage),
        (Field::MemoryRequests, &batch.memory_requests),
        (Field::MemoryLimits, &batch.memory_limits),
    ];

    let mut unresolved = 0usize;
    for (field, series_set) in passes {
        for series in series_set.iter() {
            if !apply_series(&mut records, ownership, series, field, window_hours) {
                unresolved += 1;
            }
        }
    }

    if unresolved > 0 {
        debug!(unresolved, "Discarded entries with unknown ownership");
    }

    records
}

/// Returns false when the entry had a container label but no resolvable
/// owner; container-less entries (pod-level series) are skipped silently.
fn apply_series(
    records: &mut BTreeMap<RecordKey, ResourceRecord>,
    ownership: &Ownership,
    series: &MetricSeries,
    field: Field,
    window_hours: f64,
) -> bool {
    let (Some(namespace), Some(pod), Some(container)) = (
        series.label("namespace"),
        series.label("pod"),
        series.label("container"),
    ) else {
        return true;
    };
    if container.is_empty() {
        return true;
    }

    let Some(controller) = ownership.controller_for(namespace, pod) else {
        return false;
    };

    let key = RecordKey {
        controller: controller.clone(),
        container: container.to_string(),
    };
    let record = records
        .entry(key.clone())
        .or_insert_with(|| ResourceRecord::empty(key, window_hours));

    match field {
        Field::CpuUsage => record.usage.cpu_samples.extend(&series.values),
        Field::MemoryUsage => record.usage.memory_samples.extend(&series.values),
        Field::CpuRequests => record.allocation.requests.cpu = series.scalar(),
        Field::CpuLimits => record.allocation.limits.cpu = series.scalar(),
        Field::MemoryRequests => record.allocation.requests.memory = series.scalar(),
        Field::MemoryLimits => record.allocation.limits.memory = series.scalar(),
    }

    true
}
