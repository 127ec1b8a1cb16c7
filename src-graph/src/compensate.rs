//! Subtract a reference curve from a measurement.
//!
//! The reference is treated as a sorted-by-frequency lookup table. Samples
//! of the measurement that fall outside the frequency range covered by the
//! reference are dropped, so the compensated curve can be shorter than the
//! input.

use crate::Curve;

/// Insertion index of `x` in the sorted frequency slice.
fn insertion_index(freqs: &[f64], x: f64) -> usize {
    let mut lo = 0usize;
    let mut hi = freqs.len();
    while lo < hi {
        let mid = (lo + hi) / 2;
        if freqs[mid] < x {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Reference level at frequency `x`, or None when `x` lies outside the
/// reference range.
fn reference_level(freqs: &[f64], spls: &[f64], x: f64) -> Option<f64> {
    let i = insertion_index(freqs, x);
    if i >= freqs.len() {
        // Above the reference range
        return None;
    }
    if freqs[i] == x {
        return Some(spls[i]);
    }
    if i == 0 {
        // Below the reference range
        return None;
    }
    let slope = (spls[i] - spls[i - 1]) / (freqs[i] - freqs[i - 1]);
    Some(spls[i - 1] + slope * (x - freqs[i - 1]))
}

/// Subtract the reference level from every sample of the curve.
///
/// While the curve and the reference share identical frequencies
/// index-for-index the reference level is looked up directly; once the
/// sequences diverge each sample falls back to binary search with linear
/// interpolation. The fast path only matters for output fidelity when both
/// curves were sampled on the same grid, not for correctness.
pub fn compensate(curve: &Curve, reference: &Curve) -> Curve {
    let ref_freq = reference.freq.as_slice().unwrap_or(&[]);
    let ref_spl = reference.spl.as_slice().unwrap_or(&[]);

    let mut freq = Vec::with_capacity(curve.len());
    let mut spl = Vec::with_capacity(curve.len());
    let mut in_lockstep = true;

    for i in 0..curve.len() {
        let x = curve.freq[i];
        in_lockstep = in_lockstep && i < ref_freq.len() && ref_freq[i] == x;

        let level = if in_lockstep {
            Some(ref_spl[i])
        } else {
            reference_level(ref_freq, ref_spl, x)
        };

        if let Some(level) = level {
            freq.push(x);
            spl.push(curve.spl[i] - level);
        }
    }

    Curve::from_vecs(freq, spl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_against_itself_is_flat_zero() {
        let curve = Curve::from_vecs(
            vec![20.0, 100.0, 1000.0, 20000.0],
            vec![1.0, -2.0, 3.5, 0.25],
        );
        let out = compensate(&curve, &curve);
        assert_eq!(out.len(), curve.len());
        for v in out.spl.iter() {
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn interpolates_between_reference_points() {
        let reference = Curve::from_vecs(vec![100.0, 200.0, 300.0], vec![0.0, 2.0, 6.0]);
        let curve = Curve::from_vecs(vec![250.0], vec![10.0]);
        let out = compensate(&curve, &reference);
        // Midpoint of the reference levels at 200 and 300
        assert_eq!(out.spl.to_vec(), vec![10.0 - 4.0]);
    }

    #[test]
    fn drops_samples_below_reference_range() {
        let reference = Curve::from_vecs(vec![100.0, 200.0], vec![0.0, 0.0]);
        let curve = Curve::from_vecs(vec![50.0, 150.0], vec![1.0, 2.0]);
        let out = compensate(&curve, &reference);
        assert_eq!(out.freq.to_vec(), vec![150.0]);
    }

    #[test]
    fn drops_samples_above_reference_range() {
        let reference = Curve::from_vecs(vec![100.0, 200.0], vec![0.0, 0.0]);
        let curve = Curve::from_vecs(vec![150.0, 500.0], vec![2.0, 1.0]);
        let out = compensate(&curve, &reference);
        assert_eq!(out.freq.to_vec(), vec![150.0]);
    }

    #[test]
    fn exact_upper_bound_is_kept() {
        let reference = Curve::from_vecs(vec![100.0, 200.0], vec![0.0, 3.0]);
        let curve = Curve::from_vecs(vec![200.0], vec![5.0]);
        let out = compensate(&curve, &reference);
        assert_eq!(out.spl.to_vec(), vec![2.0]);
    }

    #[test]
    fn lockstep_breaks_once_then_searches() {
        let reference = Curve::from_vecs(vec![100.0, 200.0, 300.0], vec![1.0, 2.0, 3.0]);
        // Identical up to index 1, then diverges
        let curve = Curve::from_vecs(vec![100.0, 200.0, 250.0], vec![1.0, 2.0, 2.5]);
        let out = compensate(&curve, &reference);
        assert_eq!(out.len(), 3);
        assert!((out.spl[2] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn empty_curve_stays_empty() {
        let reference = Curve::from_vecs(vec![100.0, 200.0], vec![0.0, 0.0]);
        let curve = Curve::from_vecs(vec![], vec![]);
        assert!(compensate(&curve, &reference).is_empty());
    }
}
