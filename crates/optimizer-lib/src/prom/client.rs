//! Prometheus HTTP API client

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::MetricsBackend;
use crate::models::MetricSeries;

/// Client for the Prometheus query API (`/api/v1/query`, `/api/v1/query_range`).
pub struct PrometheusClient {
    client: Client,
    base_url: Url,
}

impl PrometheusClient {
    /// Create a new client. `timeout` bounds each HTTP request.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid metrics backend URL")?;

        Ok(Self { client, base_url })
    }

    async fn get_series(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<MetricSeries>> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("backend error ({}): {}", status, body);
        }

        let envelope: QueryResponse =
            response.json().await.context("Failed to parse response")?;

        if envelope.status != "success" {
            anyhow::bail!(
                "query returned status {}: {}",
                envelope.status,
                envelope.error.unwrap_or_default()
            );
        }

        debug!(series = envelope.data.result.len(), "query evaluated");
        Ok(envelope.data.result.into_iter().map(into_series).collect())
    }
}

#[async_trait::async_trait]
impl MetricsBackend for PrometheusClient {
    async fn query(&self, expr: &str, at: DateTime<Utc>) -> Result<Vec<MetricSeries>> {
        let params = [
            ("query", expr.to_string()),
            ("time", at.to_rfc3339()),
        ];
        self.get_series("api/v1/query", &params).await
    }

    async fn query_range(
        &self,
        expr: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<Vec<MetricSeries>> {
        let params = [
            ("query", expr.to_string()),
            ("start", start.to_rfc3339()),
            ("end", end.to_rfc3339()),
            ("step", format!("{}s", step.as_secs())),
        ];
        self.get_series("api/v1/query_range", &params).await
    }
}

// Wire types for the Prometheus response envelope.

#[derive(Debug, Deserialize)]
struct QueryResponse {
    status: String,
    #[serde(default)]
    data: QueryData,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryData {
    #[serde(default)]
    result: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    metric: HashMap<String, String>,
    /// Instant vectors: one `[timestamp, "value"]` pair.
    #[serde(default)]
    value: Option<(f64, String)>,
    /// Range matrices: a list of `[timestamp, "value"]` pairs.
    #[serde(default)]
    values: Option<Vec<(f64, String)>>,
}

fn into_series(result: QueryResult) -> MetricSeries {
    let (values, timestamp) = match (result.value, result.values) {
        (Some((ts, v)), _) => (vec![parse_value(&v)], Some(ts as i64)),
        (None, Some(pairs)) => {
            let ts = pairs.first().map(|(ts, _)| *ts as i64);
            (pairs.iter().map(|(_, v)| parse_value(v)).collect(), ts)
        }
        (None, None) => (Vec::new(), None),
    };

    MetricSeries {
        labels: result.metric,
        values: values.into_iter().flatten().collect(),
        timestamp,
    }
}

fn parse_value(raw: &str) -> Option<f64> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        // Prometheus encodes gaps as NaN; drop them from the series.
        Ok(_) => None,
        Err(e) => {
            debug!(raw, error = %e, "Unparseable sample value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prom::MetricsBackend;

    #[tokio::test]
    async fn test_instant_query_parses_vector() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "status": "success",
            "data": {
                "resultType": "vector",
                "result": [
                    {
                        "metric": {"namespace": "default", "pod": "web-1", "container": "app"},
                        "value": [1700000000, "0.25"]
                    }
                ]
            }
        }"#;
        let mock = server
            .mock("GET", "/api/v1/query")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client =
            PrometheusClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let series = client.query("up", Utc::now()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label("container"), Some("app"));
        assert_eq!(series[0].scalar(), Some(0.25));
        assert_eq!(series[0].timestamp, Some(1700000000));
    }

    #[tokio::test]
    async fn test_range_query_preserves_all_samples() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{
            "status": "success",
            "data": {
                "resultType": "matrix",
                "result": [
                    {
                        "metric": {"namespace": "default", "pod": "web-1", "container": "app"},
                        "values": [[1700000000, "0.1"], [1700000300, "0.2"], [1700000600, "NaN"]]
                    }
                ]
            }
        }"#;
        let mock = server
            .mock("GET", "/api/v1/query_range")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client =
            PrometheusClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let end = Utc::now();
        let start = end - chrono::Duration::hours(1);
        let series = client
            .query_range("usage", start, end, Duration::from_secs(300))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(series.len(), 1);
        // The NaN gap is dropped; real samples stay in order.
        assert_eq!(series[0].values, vec![0.1, 0.2]);
    }

    #[tokio::test]
    async fn test_error_status_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"status": "error", "error": "parse error at char 3"}"#;
        server
            .mock("GET", "/api/v1/query")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client =
            PrometheusClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = client.query("bad{", Utc::now()).await.unwrap_err();
        assert!(err.to_string().contains("parse error"));
    }

    #[tokio::test]
    async fn test_http_failure_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/query")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let client =
            PrometheusClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = client.query("up", Utc::now()).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(PrometheusClient::new("not a url", Duration::from_secs(5)).is_err());
    }
}
