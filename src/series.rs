//! Named metric series and amplitude normalization.

use crate::error::SkipReason;
use serde::{Deserialize, Serialize};

/// One observation: epoch timestamp (seconds) and value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

/// A chronologically ordered series from one source (host).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    label: String,
    samples: Vec<Sample>,
}

impl TimeSeries {
    pub fn new(label: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            label: label.into(),
            samples,
        }
    }

    /// Build a series from bare values, stamping them `step_secs` apart.
    pub fn from_values(label: impl Into<String>, values: &[f64], step_secs: i64) -> Self {
        let samples = values
            .iter()
            .enumerate()
            .map(|(i, &value)| Sample {
                timestamp: i as i64 * step_secs,
                value,
            })
            .collect();
        Self::new(label, samples)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }
}

/// Shift values to zero mean and scale them by their peak-to-peak range.
///
/// `out[i] = (v[i] - mean) / (max - min)`. Series shorter than two samples,
/// series containing NaN/inf, and constant series are rejected.
pub fn normalize(values: &[f64]) -> Result<Vec<f64>, SkipReason> {
    if values.len() < 2 {
        return Err(SkipReason::TooShort { len: values.len() });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(SkipReason::NonFiniteSample { index });
    }

    let top = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bottom = values.iter().copied().fold(f64::INFINITY, f64::min);
    let range = top - bottom;
    if range == 0.0 {
        return Err(SkipReason::ConstantSeries);
    }

    let mid = values.iter().sum::<f64>() / values.len() as f64;
    Ok(values.iter().map(|v| (v - mid) / range).collect())
}
