//! Retained candidates and their final ordering.

use serde::Serialize;

/// A series whose spectral peak cleared the retention threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub score: f64,
    /// Period of the dominant oscillation, in granularity units.
    pub period: f64,
    pub label: String,
    /// DC-truncated power spectrum, kept only for plotting.
    #[serde(skip)]
    pub spectrum: Option<Vec<f64>>,
}

/// Order candidates by score, highest first.
///
/// The sort is stable, so equal scores keep the order in which the series
/// were encountered.
pub fn rank(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}
