//! Power spectrum and peak scoring.
//!
//! A series is scored by how much of its retained spectral energy sits in
//! the single strongest bin below the Nyquist bound. The lowest `dc_offset`
//! bins are dropped first since the mean level and slow drift otherwise
//! dominate every metric.

use rustfft::{num_complex::Complex64, FftPlanner};

use crate::config::AnalysisConfig;
use crate::error::SkipReason;
use crate::rank::Candidate;
use crate::series::{normalize, TimeSeries};

/// Squared magnitude of every DFT coefficient of `signal` (all `n` bins).
pub fn power_spectrum(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    buffer.iter().map(|c| c.norm_sqr()).collect()
}

/// Index of the largest value; the first one wins on ties.
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, top)) if v <= top => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Outcome of scoring one normalized series, before thresholding.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralPeak {
    /// Peak position within the truncated spectrum.
    pub index: usize,
    /// Peak power over total retained power.
    pub score: f64,
    /// Period in granularity units (minutes by default).
    pub period: f64,
    /// Spectrum with the first `dc_offset` bins removed.
    pub spectrum: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct SpectralScorer {
    offset: usize,
    granularity: f64,
    threshold: f64,
}

impl SpectralScorer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            offset: config.dc_offset,
            granularity: config.granularity_minutes,
            threshold: config.threshold,
        }
    }

    /// Score an already normalized series.
    pub fn score(&self, normalized: &[f64]) -> Result<SpectralPeak, SkipReason> {
        let n = normalized.len();
        if n < 2 {
            return Err(SkipReason::TooShort { len: n });
        }
        if n <= self.offset {
            return Err(SkipReason::SpectrumExhausted {
                len: n,
                offset: self.offset,
            });
        }

        let mut spectrum = power_spectrum(normalized);
        spectrum.drain(..self.offset);

        // The Nyquist bound is taken against the full length n, not the
        // truncated one, so the searched window is bins offset..=offset+n/2.
        let search_end = (n / 2 + 1).min(spectrum.len());
        let index = argmax(&spectrum[..search_end]).ok_or(SkipReason::SpectrumExhausted {
            len: n,
            offset: self.offset,
        })?;

        let energy: f64 = spectrum.iter().sum();
        if !(energy > 0.0 && energy.is_finite()) {
            return Err(SkipReason::ZeroEnergy);
        }

        let score = spectrum[index] / energy;
        let period = self.granularity * n as f64 / (index + self.offset) as f64;

        Ok(SpectralPeak {
            index,
            score,
            period,
            spectrum,
        })
    }

    /// Normalize, score and threshold one series.
    ///
    /// `Ok(None)` means the series was analyzable but not periodic enough.
    pub fn evaluate(
        &self,
        series: &TimeSeries,
        keep_spectrum: bool,
    ) -> Result<Option<Candidate>, SkipReason> {
        let normalized = normalize(&series.values())?;
        let peak = self.score(&normalized)?;

        if peak.score <= self.threshold {
            return Ok(None);
        }

        Ok(Some(Candidate {
            score: peak.score,
            period: peak.period,
            label: series.label().to_string(),
            spectrum: keep_spectrum.then_some(peak.spectrum),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn sine(n: usize, cycles: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * cycles * i as f64 / n as f64).sin())
            .collect()
    }

    fn scorer() -> SpectralScorer {
        SpectralScorer::new(&AnalysisConfig::default())
    }

    #[test]
    fn test_power_spectrum_of_impulse_is_flat() {
        let spectrum = power_spectrum(&[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(spectrum.len(), 4);
        for p in spectrum {
            assert_relative_eq!(p, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_power_spectrum_matches_parseval() {
        let signal = [0.3, -1.2, 0.5, 2.0, -0.7, 0.1];
        let time_energy: f64 = signal.iter().map(|x| x * x).sum();
        let freq_energy: f64 = power_spectrum(&signal).iter().sum();
        assert_relative_eq!(freq_energy / signal.len() as f64, time_energy, epsilon = 1e-9);
    }

    #[test]
    fn test_power_spectrum_empty() {
        assert!(power_spectrum(&[]).is_empty());
    }

    #[test]
    fn test_argmax_first_index_wins() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[0.0]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_sine_peak_and_period() {
        // 10 cycles over 100 samples: bin 10, i.e. index 5 after the offset.
        let peak = scorer().score(&sine(100, 10.0)).unwrap();
        assert_eq!(peak.index, 5);
        assert_relative_eq!(peak.period, 50.0, epsilon = 1e-9);
        // The mirrored bin 90 is part of the retained energy.
        assert_relative_eq!(peak.score, 0.5, epsilon = 1e-6);
        assert_eq!(peak.spectrum.len(), 95);
    }

    #[test]
    fn test_search_stops_at_nyquist_of_full_length() {
        // n = 20 searches bins 5..=15. The dominant component sits in bin 16
        // (mirror of bin 4), so it only counts towards the energy.
        let n = 20;
        let mut signal = sine(n, 8.0);
        for (i, v) in sine(n, 16.0).iter().enumerate() {
            signal[i] += 3.0 * v;
        }
        let peak = scorer().score(&signal).unwrap();
        let bin = peak.index + 5;
        assert!(bin == 8 || bin == 12, "unexpected peak bin {bin}");
        assert_relative_eq!(peak.score, 100.0 / 1100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_short_series_exhausts_spectrum() {
        let s = scorer();
        assert_eq!(
            s.score(&[0.1, -0.1, 0.2, -0.2, 0.0]),
            Err(SkipReason::SpectrumExhausted { len: 5, offset: 5 })
        );
        assert_eq!(s.score(&[0.5]), Err(SkipReason::TooShort { len: 1 }));
    }

    #[test]
    fn test_six_samples_leave_one_bin() {
        // One cycle over six samples: bin 5 mirrors bin 1 and is all that remains.
        let peak = scorer().score(&sine(6, 1.0)).unwrap();
        assert_eq!(peak.spectrum.len(), 1);
        assert_eq!(peak.index, 0);
        assert_relative_eq!(peak.score, 1.0);
        assert_relative_eq!(peak.period, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_energy_is_skipped() {
        let config = AnalysisConfig {
            dc_offset: 1,
            ..AnalysisConfig::default()
        };
        let s = SpectralScorer::new(&config);
        assert_eq!(s.score(&[0.0, 0.0, 0.0, 0.0]), Err(SkipReason::ZeroEnergy));
    }

    #[test]
    fn test_evaluate_thresholds_and_keeps_spectrum_on_request() {
        let values: Vec<f64> = sine(100, 10.0).iter().map(|v| 40.0 + 10.0 * v).collect();
        let series = TimeSeries::from_values("db-01", &values, 300);

        let with = scorer().evaluate(&series, true).unwrap().unwrap();
        assert_eq!(with.label, "db-01");
        assert_relative_eq!(with.period, 50.0, epsilon = 1e-9);
        assert_eq!(with.spectrum.as_ref().map(Vec::len), Some(95));

        let without = scorer().evaluate(&series, false).unwrap().unwrap();
        assert!(without.spectrum.is_none());

        let strict = SpectralScorer::new(&AnalysisConfig {
            threshold: 0.6,
            ..AnalysisConfig::default()
        });
        assert_eq!(strict.evaluate(&series, false), Ok(None));
    }

    #[test]
    fn test_score_equal_to_threshold_is_dropped() {
        let values: Vec<f64> = sine(100, 10.0).iter().map(|v| 40.0 + 10.0 * v).collect();
        let series = TimeSeries::from_values("db-02", &values, 300);
        let normalized = normalize(&series.values()).unwrap();
        let peak = scorer().score(&normalized).unwrap();

        let at_score = SpectralScorer::new(&AnalysisConfig {
            threshold: peak.score,
            ..AnalysisConfig::default()
        });
        assert_eq!(at_score.evaluate(&series, false), Ok(None));

        let just_below = SpectralScorer::new(&AnalysisConfig {
            threshold: peak.score - 1e-9,
            ..AnalysisConfig::default()
        });
        assert!(just_below.evaluate(&series, false).unwrap().is_some());
    }

    #[test]
    fn test_evaluate_propagates_skip_reasons() {
        let flat = TimeSeries::from_values("flat", &[3.0; 50], 300);
        assert_eq!(scorer().evaluate(&flat, false), Err(SkipReason::ConstantSeries));

        let single = TimeSeries::from_values("one", &[3.0], 300);
        assert_eq!(
            scorer().evaluate(&single, false),
            Err(SkipReason::TooShort { len: 1 })
        );
    }
}
