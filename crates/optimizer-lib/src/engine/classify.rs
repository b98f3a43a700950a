//! Record classification
//!
//! Partitions joined records into actionability buckets by which requests
//! were declared. Records with no usage samples in either dimension belong
//! to workloads that are not currently running and are dropped.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{BucketSummary, RecordKey, ResourceRecord};

/// A record annotated with its mean usage/request ratios. A ratio is only
/// present when the matching request is declared and non-zero and at least
/// one usage sample exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub record: ResourceRecord,
    pub cpu_ratio: Option<f64>,
    pub memory_ratio: Option<f64>,
}

/// The four-way partition. Exhaustive and disjoint over every record with
/// live usage.
#[derive(Debug, Default)]
pub struct Buckets {
    /// Usage present, no requests of either kind.
    pub candidates: Vec<ClassifiedRecord>,
    /// CPU request present, memory absent.
    pub cpu_qualified: Vec<ClassifiedRecord>,
    /// Memory request present, CPU absent.
    pub memory_qualified: Vec<ClassifiedRecord>,
    /// Both requests present.
    pub qualified: Vec<ClassifiedRecord>,
}

impl Buckets {
    pub fn summary(&self) -> BucketSummary {
        BucketSummary {
            candidates: self.candidates.len(),
            cpu_qualified: self.cpu_qualified.len(),
            memory_qualified: self.memory_qualified.len(),
            qualified: self.qualified.len(),
        }
    }
}

/// Classify every joined record into exactly one bucket.
pub fn classify(records: BTreeMap<RecordKey, ResourceRecord>) -> Buckets {
    let mut buckets = Buckets::default();
    let mut dropped = 0usize;

    for (_, record) in records {
        if record.usage.is_empty() {
            dropped += 1;
            continue;
        }

        let cpu_ratio = usage_ratio(record.usage.cpu_mean(), record.allocation.requests.cpu);
        let memory_ratio =
            usage_ratio(record.usage.memory_mean(), record.allocation.requests.memory);

        let has_cpu_request = record.allocation.requests.cpu.is_some();
        let has_memory_request = record.allocation.requests.memory.is_some();

        let classified = ClassifiedRecord {
            record,
            cpu_ratio,
            memory_ratio,
        };

        match (has_cpu_request, has_memory_request) {
            (false, false) => buckets.candidates.push(classified),
            (true, false) => buckets.cpu_qualified.push(classified),
            (false, true) => buckets.memory_qualified.push(classified),
            (true, true) => buckets.qualified.push(classified),
        }
    }

    if dropped > 0 {
        debug!(dropped, "Dropped records with no live usage");
    }

    buckets
}

/// Guarded ratio: only defined when the divisor is present and non-zero.
fn usage_ratio(mean: Option<f64>, request: Option<f64>) -> Option<f64> {
    match (mean, request) {
        (Some(mean), Some(request)) if request > 0.0 => Some(mean / request),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ControllerKey, ResourceRecord};

    fn record(
        name: &str,
        cpu_samples: &[f64],
        memory_samples: &[f64],
        cpu_request: Option<f64>,
        memory_request: Option<f64>,
    ) -> (RecordKey, ResourceRecord) {
        let key = RecordKey {
            controller: ControllerKey {
                namespace: "prod".to_string(),
                kind: "Deployment".to_string(),
                name: name.to_string(),
            },
            container: "app".to_string(),
        };
        let mut record = ResourceRecord::empty(key.clone(), 168.0);
        record.usage.cpu_samples = cpu_samples.to_vec();
        record.usage.memory_samples = memory_samples.to_vec();
        record.allocation.requests.cpu = cpu_request;
        record.allocation.requests.memory = memory_request;
        (key, record)
    }

    #[test]
    fn test_partition_is_exhaustive_and_disjoint() {
        let records: BTreeMap<_, _> = [
            record("a", &[0.1], &[1e9], None, None),
            record("b", &[0.1], &[1e9], Some(1.0), None),
            record("c", &[0.1], &[1e9], None, Some(2e9)),
            record("d", &[0.1], &[1e9], Some(1.0), Some(2e9)),
        ]
        .into_iter()
        .collect();

        let buckets = classify(records);
        let summary = buckets.summary();
        assert_eq!(summary.candidates, 1);
        assert_eq!(summary.cpu_qualified, 1);
        assert_eq!(summary.memory_qualified, 1);
        assert_eq!(summary.qualified, 1);
    }

    #[test]
    fn test_dead_records_dropped() {
        let records: BTreeMap<_, _> =
            [record("dead", &[], &[], Some(1.0), Some(2e9))].into_iter().collect();

        let buckets = classify(records);
        let summary = buckets.summary();
        assert_eq!(
            summary.candidates + summary.cpu_qualified + summary.memory_qualified
                + summary.qualified,
            0
        );
    }

    #[test]
    fn test_ratio_requires_present_nonzero_request() {
        let records: BTreeMap<_, _> = [
            record("zero", &[0.5], &[], Some(0.0), None),
            record("present", &[0.5], &[], Some(1.0), None),
        ]
        .into_iter()
        .collect();

        let buckets = classify(records);
        // A zero request never produces a ratio, so no division can occur.
        let zero = buckets
            .cpu_qualified
            .iter()
            .find(|c| c.record.key.controller.name == "zero")
            .unwrap();
        assert_eq!(zero.cpu_ratio, None);

        let present = buckets
            .cpu_qualified
            .iter()
            .find(|c| c.record.key.controller.name == "present")
            .unwrap();
        assert_eq!(present.cpu_ratio, Some(0.5));
    }

    #[test]
    fn test_single_dimension_usage_still_classified() {
        // Memory samples only; the record is alive and lands in a bucket.
        let records: BTreeMap<_, _> =
            [record("mem-only", &[], &[1e9, 2e9], Some(1.0), Some(4e9))]
                .into_iter()
                .collect();

        let buckets = classify(records);
        assert_eq!(buckets.qualified.len(), 1);
        let classified = &buckets.qualified[0];
        assert_eq!(classified.cpu_ratio, None);
        assert_eq!(classified.memory_ratio, Some(1.5e9 / 4e9));
    }

    #[test]
    fn test_classification_idempotent() {
        let build = || -> BTreeMap<_, _> {
            [
                record("a", &[0.1, 0.3], &[1e9], Some(1.0), Some(2e9)),
                record("b", &[0.2], &[5e8], None, None),
            ]
            .into_iter()
            .collect()
        };

        let first = classify(build());
        let second = classify(build());
        assert_eq!(first.qualified, second.qualified);
        assert_eq!(first.candidates, second.candidates);
        assert_eq!(first.summary(), second.summary());
    }
}
