//! periodscan -- find the metric series that oscillate the most.
//!
//! Each series is normalized to zero mean and unit range, transformed into a
//! power spectrum, stripped of its lowest-frequency bins, and scored by the
//! share of spectral energy held by its strongest sub-Nyquist peak. Series
//! scoring above a threshold are ranked, best first, with the period of the
//! peak expressed in sampling-granularity units.

pub mod analysis;
pub mod config;
pub mod error;
pub mod rank;
pub mod series;
pub mod sink;
pub mod source;
pub mod spectral;

pub use analysis::{analyze, run, ScanReport};
pub use config::{AnalysisConfig, ScanConfig};
pub use error::{SkipReason, SourceError};
pub use rank::{rank, Candidate};
pub use series::{normalize, Sample, TimeSeries};
pub use spectral::{power_spectrum, SpectralPeak, SpectralScorer};
