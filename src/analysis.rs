//! Batch analysis: score every series, rank the survivors, hand them off.

use anyhow::Result;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::rank::{rank, Candidate};
use crate::series::TimeSeries;
use crate::sink::ResultSink;
use crate::source::{DataSource, QueryWindow};
use crate::spectral::SpectralScorer;

/// Outcome of one scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Retained candidates, highest score first.
    pub candidates: Vec<Candidate>,
    /// Number of series examined.
    pub scanned: usize,
    /// Series that could not be scored (too short, constant, ...).
    pub skipped: usize,
}

/// Score each series independently and rank whatever clears the threshold.
///
/// Spectra are only carried on the candidates when `keep_spectra` is set.
pub fn analyze(series: &[TimeSeries], config: &AnalysisConfig, keep_spectra: bool) -> ScanReport {
    let scorer = SpectralScorer::new(config);
    let mut candidates = Vec::new();
    let mut skipped = 0;

    for ts in series {
        match scorer.evaluate(ts, keep_spectra) {
            Ok(Some(candidate)) => {
                debug!(
                    label = ts.label(),
                    score = candidate.score,
                    period = candidate.period,
                    "Periodic candidate"
                );
                candidates.push(candidate);
            }
            Ok(None) => {}
            Err(reason) => {
                debug!(label = ts.label(), %reason, "Skipping series");
                skipped += 1;
            }
        }
    }

    ScanReport {
        candidates: rank(candidates),
        scanned: series.len(),
        skipped,
    }
}

/// Fetch once, analyze, and emit every ranked candidate to `sink` in order.
///
/// A source failure aborts before any analysis happens.
pub async fn run<D, S>(
    source: &D,
    window: &QueryWindow,
    sink: &mut S,
    config: &AnalysisConfig,
    keep_spectra: bool,
) -> Result<ScanReport>
where
    D: DataSource + ?Sized,
    S: ResultSink + ?Sized,
{
    let series = source.fetch(window).await?;
    info!(series = series.len(), "Fetched series");

    let report = analyze(&series, config, keep_spectra);
    info!(
        scanned = report.scanned,
        skipped = report.skipped,
        retained = report.candidates.len(),
        "Scan complete"
    );

    for candidate in &report.candidates {
        sink.emit(candidate)?;
    }
    sink.finish()?;

    Ok(report)
}
