//! Align curves to read 0 dB at a frequency point or over a range.

use crate::Curve;

/// How a curve should be aligned to 0 dB.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Alignment {
    /// Leave the curve untouched
    #[default]
    None,
    /// Align the sample closest to the given frequency to 0 dB
    Point(f64),
    /// Align the mean level strictly inside (lo, hi) to 0 dB
    Range(f64, f64),
}

impl Alignment {
    /// Derive the alignment mode from the two raw CLI thresholds.
    ///
    /// Both bounds positive selects a range, only the minimum positive
    /// selects a point, anything else disables alignment.
    pub fn from_bounds(align_min: f64, align_max: f64) -> Self {
        if align_min > 0.0 {
            if align_max > 0.0 {
                Alignment::Range(align_min, align_max)
            } else {
                Alignment::Point(align_min)
            }
        } else {
            Alignment::None
        }
    }
}

/// Compute the vertical offset that brings the curve to 0 dB under the
/// given alignment.
///
/// For a point alignment ties are broken by the first sample encountered
/// (strictly smaller distance wins). For a range alignment with no sample
/// strictly inside the bounds the offset is 0.
pub fn compute_offset(curve: &Curve, alignment: &Alignment) -> f64 {
    match *alignment {
        Alignment::None => 0.0,
        Alignment::Point(target) => {
            let mut min_distance = f64::INFINITY;
            let mut offset = 0.0;
            for i in 0..curve.len() {
                let distance = (curve.freq[i] - target).abs();
                if distance < min_distance {
                    min_distance = distance;
                    offset = curve.spl[i];
                }
            }
            offset
        }
        Alignment::Range(lo, hi) => {
            let mut sum = 0.0;
            let mut count = 0usize;
            for i in 0..curve.len() {
                if curve.freq[i] > lo && curve.freq[i] < hi {
                    sum += curve.spl[i];
                    count += 1;
                }
            }
            // No sample inside the range: do not divide by zero
            if count > 0 { sum / count as f64 } else { 0.0 }
        }
    }
}

/// Subtract the offset from every level of the curve.
pub fn apply_offset(curve: &Curve, offset: f64) -> Curve {
    Curve {
        freq: curve.freq.clone(),
        spl: &curve.spl - offset,
    }
}
