//! Where series come from.
//!
//! A run performs exactly one fetch. The chart API response format is shared
//! by the live HTTP source and by saved response files.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::SourceError;
use crate::series::{Sample, TimeSeries};

pub mod file;
pub mod wavefront;

pub use file::FileSource;
pub use wavefront::WavefrontSource;

/// The observation window requested from a source.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub granularity_minutes: f64,
}

impl QueryWindow {
    /// Window covering the configured lookback, ending now.
    ///
    /// A lookback reaching past the representable range starts at the
    /// earliest representable instant.
    pub fn ending_now(config: &AnalysisConfig) -> Self {
        let lookback = Duration::days(i64::from(config.lookback_days));
        Self {
            start: Utc::now()
                .checked_sub_signed(lookback)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            granularity_minutes: config.granularity_minutes,
        }
    }
}

/// Trait for anything that can yield the series to scan.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch every series in the window. Errors are fatal for the run.
    async fn fetch(&self, window: &QueryWindow) -> Result<Vec<TimeSeries>, SourceError>;
}

/// Series held in memory; ignores the window.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    series: Vec<TimeSeries>,
}

impl MemorySource {
    pub fn new(series: Vec<TimeSeries>) -> Self {
        Self { series }
    }
}

#[async_trait::async_trait]
impl DataSource for MemorySource {
    async fn fetch(&self, _window: &QueryWindow) -> Result<Vec<TimeSeries>, SourceError> {
        Ok(self.series.clone())
    }
}

// ---------------------------------------------------------------------------
// Chart API response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    #[serde(default)]
    timeseries: Vec<ChartSeries>,
}

#[derive(Debug, Deserialize)]
struct ChartSeries {
    host: Option<String>,
    label: Option<String>,
    #[serde(default)]
    data: Vec<(f64, f64)>,
}

/// Parse a chart API JSON body into labelled series.
///
/// A response without a `timeseries` array means the query matched nothing.
/// Points are put in timestamp order.
pub fn parse_chart_response(body: &str) -> Result<Vec<TimeSeries>, SourceError> {
    let response: ChartResponse = serde_json::from_str(body)?;

    let series = response
        .timeseries
        .into_iter()
        .map(|raw| {
            let label = raw
                .host
                .or(raw.label)
                .unwrap_or_else(|| "unknown".to_string());
            let mut samples: Vec<Sample> = raw
                .data
                .into_iter()
                .map(|(timestamp, value)| Sample {
                    timestamp: timestamp as i64,
                    value,
                })
                .collect();
            samples.sort_by_key(|s| s.timestamp);
            TimeSeries::new(label, samples)
        })
        .collect::<Vec<_>>();

    debug!(series = series.len(), "parsed chart response");
    Ok(series)
}
