//! Terminal line plot of a candidate's power spectrum.

use std::io::{BufRead, Write};

use anyhow::Result;

use super::{format_float, ResultSink};
use crate::rank::Candidate;

pub const DEFAULT_WIDTH: usize = 72;
pub const DEFAULT_HEIGHT: usize = 17;

const LABEL_WIDTH: usize = 10;

/// Render `spectrum` as a character plot, `height` rows tall and at most
/// `width` columns wide. Horizontal grid lines sit at quarter heights and
/// vertical ones every ten columns. Wider spectra are bucketed by maximum.
pub fn render_spectrum_plot(spectrum: &[f64], width: usize, height: usize) -> String {
    if spectrum.is_empty() {
        return "(empty spectrum)\n".to_string();
    }
    let width = width.max(1);
    let height = height.max(2);

    let len = spectrum.len();
    let columns = len.min(width);
    let points: Vec<f64> = (0..columns)
        .map(|c| {
            let start = c * len / columns;
            let end = ((c + 1) * len / columns).max(start + 1);
            spectrum[start..end].iter().copied().fold(0.0, f64::max)
        })
        .collect();

    let top = points.iter().copied().fold(0.0, f64::max);
    let scale = if top > 0.0 { top } else { 1.0 };
    let rows: Vec<usize> = points
        .iter()
        .map(|v| ((v / scale) * (height - 1) as f64).round() as usize)
        .collect();

    let grid_step = ((height - 1) / 4).max(1);
    let mut out = String::new();

    for row in (0..height).rev() {
        let on_grid = row % grid_step == 0;
        if on_grid {
            let level = scale * row as f64 / (height - 1) as f64;
            out.push_str(&format!("{:>w$.3e} |", level, w = LABEL_WIDTH));
        } else {
            out.push_str(&format!("{:>w$} |", "", w = LABEL_WIDTH));
        }

        for (col, &r) in rows.iter().enumerate() {
            let joins = col > 0 && {
                let prev = rows[col - 1];
                row > prev.min(r) && row < prev.max(r)
            };
            let ch = if r == row {
                '*'
            } else if joins {
                '|'
            } else if on_grid {
                '-'
            } else if col % 10 == 0 {
                ':'
            } else {
                ' '
            };
            out.push(ch);
        }
        out.push('\n');
    }

    out.push_str(&format!("{:>w$} +{}\n", "", "-".repeat(columns), w = LABEL_WIDTH));
    let last = (len - 1).to_string();
    let axis = if columns > last.len() {
        format!("0{:>w$}", last, w = columns - 1)
    } else {
        "0".to_string()
    };
    out.push_str(&format!("{:>w$}  {}\n", "", axis, w = LABEL_WIDTH));
    out
}

/// Wraps another sink and, after each candidate, draws its spectrum and
/// waits for the viewer to press Enter before moving on.
pub struct PlotSink<S, R, W> {
    inner: S,
    input: R,
    output: W,
    width: usize,
    height: usize,
}

impl<S: ResultSink, R: BufRead, W: Write> PlotSink<S, R, W> {
    pub fn new(inner: S, input: R, output: W) -> Self {
        Self {
            inner,
            input,
            output,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn into_parts(self) -> (S, W) {
        (self.inner, self.output)
    }
}

impl<S: ResultSink, R: BufRead, W: Write> ResultSink for PlotSink<S, R, W> {
    fn emit(&mut self, candidate: &Candidate) -> Result<()> {
        self.inner.emit(candidate)?;

        let Some(spectrum) = candidate.spectrum.as_deref() else {
            return Ok(());
        };

        writeln!(
            self.output,
            "{} (period {}, score {})",
            candidate.label,
            format_float(candidate.period),
            format_float(candidate.score)
        )?;
        self.output
            .write_all(render_spectrum_plot(spectrum, self.width, self.height).as_bytes())?;
        write!(self.output, "Press Enter to continue...")?;
        self.output.flush()?;

        // EOF dismisses as well, so a closed stdin never hangs the run.
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        writeln!(self.output)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.inner.finish()?;
        self.output.flush()?;
        Ok(())
    }
}
