//! FreqRespGraph - plot and compare frequency response measurements
//!
//! This crate implements the processing pipeline behind the `freqrespgraph`
//! binary: reading (frequency, SPL) curves from delimited text, aligning
//! them to 0 dB, compensating against a reference curve, deriving an EQ
//! correction from an impedance measurement, simulating a parametric EQ and
//! smoothing by a fraction of an octave. The plotting layer only consumes
//! the labeled curves produced here.

use ndarray::Array1;

/// Curve alignment to 0 dB
pub mod align;
/// Common command-line interface definitions
pub mod cli;
/// Reference curve compensation
pub mod compensate;
/// EQ correction derived from an impedance measurement
pub mod impedance;
/// Per-curve processing pipeline
pub mod pipeline;
/// Plotting and visualization functions
pub mod plot;
/// Data reading and parsing functions
pub mod read;
/// Fractional octave smoothing
pub mod smooth;

// Re-export the filter crate the way callers expect it
pub use freqrespgraph_iir as iir;

/// A frequency response curve.
///
/// Samples are kept in the order they were read; all processing assumes
/// frequencies are increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    /// Frequency points in Hz
    pub freq: Array1<f64>,
    /// Sound pressure level in dB
    pub spl: Array1<f64>,
}

impl Curve {
    /// Build a curve from plain vectors.
    pub fn from_vecs(freq: Vec<f64>, spl: Vec<f64>) -> Self {
        Curve {
            freq: Array1::from_vec(freq),
            spl: Array1::from_vec(spl),
        }
    }

    /// Number of samples in the curve.
    pub fn len(&self) -> usize {
        self.freq.len()
    }

    /// True when the curve holds no samples.
    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }
}
