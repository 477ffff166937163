//! Prometheus HTTP API client for average utilisation
//!
//! Only `query_range` is used. Each workload gets two range queries (CPU and
//! memory) over the configured window, returning percent-of-request series.

use crate::error::{DeckError, DeckResult};
use crate::models::{AverageUsage, MetricSample};
use anyhow::Context;
use chrono::{Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Client for one Prometheus endpoint
#[derive(Clone, Debug)]
pub struct PrometheusMonitor {
    client: reqwest::Client,
    base_url: url::Url,
    window_minutes: i64,
    samples: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    status: String,
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    #[serde(default)]
    result: Vec<RangeSeries>,
}

#[derive(Debug, Deserialize)]
struct RangeSeries {
    #[serde(default)]
    values: Vec<(f64, String)>,
}

impl PrometheusMonitor {
    /// Create a client for `base_url` (e.g. `http://prometheus:9090`)
    pub fn new(
        base_url: &str,
        timeout: Duration,
        window_minutes: i64,
        samples: usize,
    ) -> anyhow::Result<Self> {
        let base_url = url::Url::parse(base_url)
            .with_context(|| format!("Invalid Prometheus URL: {}", base_url))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!("Created Prometheus monitor for: {}", base_url);

        Ok(Self {
            client,
            base_url,
            window_minutes,
            samples: samples.max(1),
        })
    }

    fn endpoint(&self) -> DeckResult<url::Url> {
        self.base_url
            .join("api/v1/query_range")
            .map_err(|e| DeckError::invalid(format!("bad Prometheus URL: {}", e)))
    }

    /// Run one range query ending now
    pub async fn query_range(&self, query: &str) -> DeckResult<Vec<MetricSample>> {
        let end = Utc::now();
        let start = end - ChronoDuration::minutes(self.window_minutes);
        let step = (self.window_minutes * 60 / self.samples as i64).max(1);

        let mut url = self.endpoint()?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("start", &start.timestamp().to_string())
            .append_pair("end", &end.timestamp().to_string())
            .append_pair("step", &format!("{}s", step));

        tracing::debug!("Prometheus query_range: {}", query);

        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(DeckError::Upstream(format!(
                "Prometheus returned status {}",
                resp.status()
            )));
        }
        let body: QueryResponse = resp.json().await?;
        parse_range_response(body)
    }

    /// CPU and memory averages for the pods of one workload
    pub async fn average_usage(&self, namespace: &str, name: &str) -> DeckResult<AverageUsage> {
        let cpu_query = cpu_query(namespace, name);
        let memory_query = memory_query(namespace, name);
        let (cpu, memory) = tokio::join!(
            self.query_range(&cpu_query),
            self.query_range(&memory_query)
        );
        Ok(AverageUsage {
            cpu: cpu?,
            memory: memory?,
        })
    }
}

fn pod_selector(namespace: &str, name: &str) -> String {
    format!("namespace=\"{}\",pod=~\"{}-.*\"", namespace, name)
}

fn cpu_query(namespace: &str, name: &str) -> String {
    let selector = pod_selector(namespace, name);
    format!(
        "sum(rate(container_cpu_usage_seconds_total{{{sel},container!=\"\"}}[1m])) / \
         sum(kube_pod_container_resource_requests{{{sel},resource=\"cpu\"}}) * 100",
        sel = selector
    )
}

fn memory_query(namespace: &str, name: &str) -> String {
    let selector = pod_selector(namespace, name);
    format!(
        "sum(container_memory_working_set_bytes{{{sel},container!=\"\"}}) / \
         sum(kube_pod_container_resource_requests{{{sel},resource=\"memory\"}}) * 100",
        sel = selector
    )
}

/// Flatten a range response into samples; an empty result is not an error
fn parse_range_response(body: QueryResponse) -> DeckResult<Vec<MetricSample>> {
    if body.status != "success" {
        return Err(DeckError::Upstream(format!(
            "Prometheus query failed: {}",
            body.error.unwrap_or_else(|| body.status.clone())
        )));
    }

    let Some(series) = body.data.and_then(|d| d.result.into_iter().next()) else {
        return Ok(Vec::new());
    };

    Ok(series
        .values
        .into_iter()
        .filter_map(|(ts, raw)| {
            let value = raw.parse::<f64>().ok().filter(|v| v.is_finite())?;
            Some(MetricSample::new(ts as i64, (value * 100.0).round() / 100.0))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> DeckResult<Vec<MetricSample>> {
        parse_range_response(serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn test_parse_matrix() {
        let samples = parse(
            r#"{"status":"success","data":{"resultType":"matrix","result":[
                {"metric":{},"values":[[1714560000,"12.3"],[1714560060,"NaN"],[1714560120,"7"]]}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(
            samples,
            vec![
                MetricSample::new(1714560000, 12.3),
                MetricSample::new(1714560120, 7.0)
            ]
        );
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let samples =
            parse(r#"{"status":"success","data":{"resultType":"matrix","result":[]}}"#).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_error_status() {
        let err = parse(r#"{"status":"error","errorType":"bad_data","error":"parse error"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            DeckError::Upstream("Prometheus query failed: parse error".into())
        );
    }

    #[test]
    fn test_queries_scope_to_workload_pods() {
        let q = cpu_query("ns-a", "web");
        assert!(q.contains("namespace=\"ns-a\",pod=~\"web-.*\""));
        assert!(q.contains("resource=\"cpu\""));
        assert!(memory_query("ns-a", "web").contains("container_memory_working_set_bytes"));
    }

    #[test]
    fn test_endpoint_join() {
        let monitor =
            PrometheusMonitor::new("http://prometheus:9090/", Duration::from_secs(5), 30, 30)
                .unwrap();
        assert_eq!(
            monitor.endpoint().unwrap().as_str(),
            "http://prometheus:9090/api/v1/query_range"
        );
    }
}
