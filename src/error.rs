//! Error types for ingestion and per-series analysis.

use thiserror::Error;

/// Why a single series produced no candidate.
///
/// These never abort a scan: the series is logged and counted as skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("series too short: need at least 2 samples, have {len}")]
    TooShort { len: usize },

    #[error("non-finite sample at index {index}")]
    NonFiniteSample { index: usize },

    #[error("constant series has zero amplitude range")]
    ConstantSeries,

    #[error("no spectrum left after discarding {offset} low-frequency bins of {len}")]
    SpectrumExhausted { len: usize, offset: usize },

    #[error("retained spectrum carries no energy")]
    ZeroEnergy,
}

/// Failures while retrieving series. Any of these ends the run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("chart request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chart API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed chart response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read series file: {0}")]
    Io(#[from] std::io::Error),
}
