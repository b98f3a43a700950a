//! Error and warning taxonomy
//!
//! A failed or timed-out metric query is not fatal: it contributes an empty
//! series and a `Warning` on the report. Only the overall pipeline deadline
//! and backend construction abort a run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal pipeline errors.
#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("pipeline deadline of {seconds}s exceeded")]
    DeadlineExceeded { seconds: u64 },

    #[error("metrics backend unavailable: {0}")]
    Backend(anyhow::Error),
}

/// A non-fatal problem captured during a run and attached to the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Short name of the query that degraded, e.g. `cpu_requests`.
    pub query: String,
    pub detail: String,
}

impl Warning {
    pub fn new(query: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            detail: detail.into(),
        }
    }
}
