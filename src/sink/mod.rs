//! Where ranked candidates go.

use std::io::Write;

use anyhow::Result;

use crate::rank::Candidate;

pub mod plot;

pub use plot::{render_spectrum_plot, PlotSink};

/// Receives ranked candidates, best first.
pub trait ResultSink {
    fn emit(&mut self, candidate: &Candidate) -> Result<()>;

    /// Called once after the last candidate.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Shortest representation that round-trips, always with a fractional
/// part or exponent (`50.0`, `0.25`, `1e-7`).
pub fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

/// `label,period,score` per candidate, no header.
pub struct LineSink<W: Write> {
    out: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for LineSink<W> {
    fn emit(&mut self, candidate: &Candidate) -> Result<()> {
        writeln!(
            self.out,
            "{},{},{}",
            candidate.label,
            format_float(candidate.period),
            format_float(candidate.score)
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Collects candidates and writes them as one JSON array on `finish`.
pub struct JsonSink<W: Write> {
    out: W,
    buffered: Vec<Candidate>,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buffered: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for JsonSink<W> {
    fn emit(&mut self, candidate: &Candidate) -> Result<()> {
        self.buffered.push(Candidate {
            spectrum: None,
            ..candidate.clone()
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, &self.buffered)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
