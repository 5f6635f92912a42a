//! Live chart queries against a Wavefront-style metrics store.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{info, warn};

use super::{parse_chart_response, DataSource, QueryWindow};
use crate::error::SourceError;
use crate::series::TimeSeries;

/// Environment variable holding the store's base URL.
pub const URL_ENV: &str = "WF_URL";
/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "WF_TOKEN";

const CHART_PATH: &str = "/api/v2/chart/api";

/// Fetches one metric, aligned and interpolated, for every reporting host.
pub struct WavefrontSource {
    client: Client,
    base_url: String,
    token: String,
    metric: String,
}

impl WavefrontSource {
    pub fn new(
        base_url: Option<String>,
        token: Option<String>,
        metric: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .ok_or(SourceError::MissingSetting(URL_ENV))?;
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(SourceError::MissingSetting(TOKEN_ENV))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            metric: metric.into(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CHART_PATH)
    }
}

/// The ts() expression: align to the sampling granularity, filling gaps by
/// interpolation so every host yields evenly spaced points.
pub fn chart_query(metric: &str, granularity_minutes: f64) -> String {
    format!(
        "align({}m, interpolate(ts(\"{}\")))",
        granularity_minutes, metric
    )
}

#[async_trait::async_trait]
impl DataSource for WavefrontSource {
    async fn fetch(&self, window: &QueryWindow) -> Result<Vec<TimeSeries>, SourceError> {
        let query = chart_query(&self.metric, window.granularity_minutes);
        let start = window.start.timestamp().to_string();
        info!(metric = %self.metric, %query, %start, "Querying chart API");

        let response = self
            .client
            .get(self.endpoint())
            .query(&[("q", query.as_str()), ("s", start.as_str()), ("g", "m")])
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Chart API request rejected");
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let series = parse_chart_response(&body)?;
        info!(metric = %self.metric, series = series.len(), "Chart query complete");
        Ok(series)
    }
}
