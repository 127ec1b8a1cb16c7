//! Command-line interface definitions for the freqrespgraph binary.
//!
//! Configuration errors (malformed filter specs, invalid smoothing
//! fractions, bad delimiters) are rejected here, before any curve is
//! processed.

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::iir::{Biquad, BiquadFilterType};

/// CLI arguments for the freqrespgraph binary.
#[derive(Parser, Debug, Clone)]
#[command(author, about, long_about = None)]
pub struct Args {
    /// Y-Axis minimum in dB.
    #[arg(long, default_value_t = -30.0, allow_hyphen_values = true)]
    pub ymin: f64,

    /// Y-Axis maximum in dB.
    #[arg(long, default_value_t = 20.0, allow_hyphen_values = true)]
    pub ymax: f64,

    /// X-Axis minimum in Hz.
    #[arg(long, default_value_t = 20.0)]
    pub xmin: f64,

    /// X-Axis maximum in Hz.
    #[arg(long, default_value_t = 20000.0)]
    pub xmax: f64,

    /// Align curves to 0 dB at the given frequency (negative disables).
    /// Together with --alignmax this selects a frequency range instead.
    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    pub alignmin: f64,

    /// Upper bound of the alignment frequency range (negative disables).
    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    pub alignmax: f64,

    /// Do not mention the alignment in the Y-Axis label.
    #[arg(long, default_value_t = false)]
    pub hidealignment: bool,

    /// Plot the given file as a dotted reference curve.
    #[arg(long)]
    pub refcurve: Option<PathBuf>,

    /// Subtract the given reference curve from every input curve.
    #[arg(long)]
    pub refcompensate: Option<PathBuf>,

    /// Smooth curves by this fraction of an octave, e.g. `1`, `0.33` or `1/12`.
    #[arg(long, value_parser = Fraction::from_str)]
    pub smooth: Option<Fraction>,

    /// Only plot the smoothed curves, not the raw ones.
    #[arg(long, default_value_t = false)]
    pub smoothonly: bool,

    /// Impedance measurement used to derive an EQ correction.
    #[arg(long)]
    pub impedance: Option<PathBuf>,

    /// Field delimiter of the impedance data file.
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub impedance_delimiter: u8,

    /// Source resistance in Ohm for the impedance EQ.
    #[arg(long, default_value_t = 1.0, value_parser = parse_strictly_positive_f64)]
    pub source_resistance: f64,

    /// Parametric EQ filter to simulate, `TYPE,freq,Q,gainDb` with TYPE one
    /// of PEAK, LOWSHELF, HIGHSHELF, LOWPASS, HIGHPASS, BANDPASS, NOTCH.
    /// May be given multiple times.
    #[arg(long = "peq", value_parser = FilterSpec::from_str)]
    pub peq: Vec<FilterSpec>,

    /// Sample rate in Hz assumed for the simulated filters.
    #[arg(long, default_value_t = crate::iir::SRATE, value_parser = parse_strictly_positive_f64)]
    pub sample_rate: f64,

    /// Field delimiter of the curve data files.
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Do not show the curves legend.
    #[arg(long, default_value_t = false)]
    pub nolegend: bool,

    /// Graph title.
    #[arg(long, default_value = "")]
    pub title: String,

    /// Write the graph to this HTML file instead of opening a browser.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Curve data files to plot.
    #[arg(long, required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,
}

/// Error for a malformed `TYPE,freq,Q,gainDb` filter specification.
#[derive(Debug, Clone, Error)]
pub enum FilterSpecError {
    #[error("expected 4 fields TYPE,freq,Q,gainDb but got {0}")]
    FieldCount(usize),
    #[error(transparent)]
    UnknownType(#[from] crate::iir::UnknownFilterType),
    #[error("invalid number '{0}' in filter spec")]
    InvalidNumber(String),
    #[error("filter {0} must be strictly positive, got {1}")]
    NotPositive(&'static str, f64),
}

/// A parametric EQ filter parsed from the command line.
///
/// The sample rate is configured separately, so the spec is combined with
/// it into a [`Biquad`] only when the run configuration is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub kind: BiquadFilterType,
    pub freq: f64,
    pub q: f64,
    pub gain_db: f64,
}

impl FilterSpec {
    /// Build the biquad filter for the configured sample rate.
    pub fn to_biquad(&self, srate: f64) -> Biquad {
        Biquad::new(self.kind, self.freq, srate, self.q, self.gain_db)
    }
}

impl FromStr for FilterSpec {
    type Err = FilterSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').collect();
        if fields.len() != 4 {
            return Err(FilterSpecError::FieldCount(fields.len()));
        }
        let kind = fields[0].parse::<BiquadFilterType>()?;
        let number = |f: &str| {
            f.trim()
                .parse::<f64>()
                .map_err(|_| FilterSpecError::InvalidNumber(f.to_string()))
        };
        let freq = number(fields[1])?;
        let q = number(fields[2])?;
        let gain_db = number(fields[3])?;
        if freq <= 0.0 {
            return Err(FilterSpecError::NotPositive("frequency", freq));
        }
        if q <= 0.0 {
            return Err(FilterSpecError::NotPositive("Q", q));
        }
        Ok(FilterSpec {
            kind,
            freq,
            q,
            gain_db,
        })
    }
}

/// Error for an invalid smoothing fraction expression.
#[derive(Debug, Clone, Error)]
pub enum FractionError {
    #[error("invalid numeric expression '{0}'")]
    Invalid(String),
    #[error("smoothing fraction must be strictly positive, got '{0}'")]
    NotPositive(String),
}

/// A positive number given either plainly (`0.33`) or as a ratio (`1/12`).
///
/// The original text is kept for curve labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Fraction {
    pub value: f64,
    pub text: String,
}

impl FromStr for Fraction {
    type Err = FractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_string();
        let value = match text.split_once('/') {
            Some((num, den)) => {
                let num: f64 = num
                    .trim()
                    .parse()
                    .map_err(|_| FractionError::Invalid(text.clone()))?;
                let den: f64 = den
                    .trim()
                    .parse()
                    .map_err(|_| FractionError::Invalid(text.clone()))?;
                if den == 0.0 {
                    return Err(FractionError::Invalid(text.clone()));
                }
                num / den
            }
            None => text
                .parse()
                .map_err(|_| FractionError::Invalid(text.clone()))?,
        };
        if !value.is_finite() || value <= 0.0 {
            return Err(FractionError::NotPositive(text));
        }
        Ok(Fraction { value, text })
    }
}

fn parse_strictly_positive_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("invalid float: {s}"))?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err("value must be strictly positive (> 0)".to_string())
    }
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] => Ok(*b),
        [b'\\', b't'] => Ok(b'\t'),
        _ => Err(format!("delimiter must be a single character, got '{s}'")),
    }
}
