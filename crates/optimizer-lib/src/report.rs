//! Report sinks
//!
//! The pipeline hands its finished report to a sink; the core does not care
//! about the persistence format beyond this seam.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::models::OptimizationReport;

/// Destination for a finished report.
pub trait ReportSink {
    fn write(&self, report: &OptimizationReport) -> Result<()>;
}

/// Serializes the full report as pretty-printed JSON to a file.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonFileSink {
    fn write(&self, report: &OptimizationReport) -> Result<()> {
        let json =
            serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write report to {}", self.path.display()))?;
        info!(path = %self.path.display(), "Report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BucketSummary, OptimizationReport};

    fn report() -> OptimizationReport {
        OptimizationReport {
            generated_at: "2026-01-01T00:00:00+00:00".to_string(),
            window_hours: 168.0,
            buckets: BucketSummary {
                qualified: 1,
                ..Default::default()
            },
            ranked: Vec::new(),
            unscored: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_json_sink_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        JsonFileSink::new(&path).write(&report()).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: OptimizationReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.buckets.qualified, 1);
        assert_eq!(parsed.window_hours, 168.0);
    }

    #[test]
    fn test_json_sink_unwritable_path_errors() {
        let sink = JsonFileSink::new("/nonexistent-dir/report.json");
        let err = sink.write(&report()).unwrap_err();
        assert!(err.to_string().contains("Failed to write report"));
    }
}
