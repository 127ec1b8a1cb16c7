//! Derive an EQ correction from an impedance measurement.
//!
//! Driving a speaker from a non-zero source resistance turns its impedance
//! curve into a frequency dependent voltage divider. The correction below
//! expresses that divider in dB, normalized so the minimum-impedance point
//! reads 0 dB, and exposes it as a continuous function of frequency.

use crate::Curve;

/// Continuous EQ correction in dB built from an impedance curve.
///
/// Between measured points the level is interpolated linearly; beyond the
/// measured range it is extrapolated linearly from the two end samples.
/// Built once per run and passed explicitly into the pipeline.
#[derive(Debug, Clone)]
pub struct ImpedanceEq {
    freq: Vec<f64>,
    level: Vec<f64>,
}

impl ImpedanceEq {
    /// Build the correction from measured impedance and a source resistance.
    ///
    /// For each impedance sample `z`:
    /// `level = 20 * log10(z / (R + z) * (R + z_min) / z_min)`
    /// with `z_min` the minimum impedance observed in the curve.
    pub fn from_curve(impedance: &Curve, source_resistance: f64) -> Self {
        let z_min = impedance.spl.iter().cloned().fold(f64::INFINITY, f64::min);
        if !z_min.is_finite() || z_min <= 0.0 {
            return ImpedanceEq {
                freq: Vec::new(),
                level: Vec::new(),
            };
        }

        let normalize = (source_resistance + z_min) / z_min;
        let level = impedance
            .spl
            .iter()
            .map(|&z| 20.0 * (z / (source_resistance + z) * normalize).log10())
            .collect();

        ImpedanceEq {
            freq: impedance.freq.to_vec(),
            level,
        }
    }

    /// Correction level in dB at an arbitrary frequency.
    pub fn level_at(&self, f: f64) -> f64 {
        let n = self.freq.len();
        match n {
            0 => 0.0,
            1 => self.level[0],
            _ => {
                if f <= self.freq[0] {
                    // Extrapolate from the first two points
                    let slope = (self.level[1] - self.level[0]) / (self.freq[1] - self.freq[0]);
                    self.level[0] + slope * (f - self.freq[0])
                } else if f >= self.freq[n - 1] {
                    // Extrapolate from the last two points
                    let slope = (self.level[n - 1] - self.level[n - 2])
                        / (self.freq[n - 1] - self.freq[n - 2]);
                    self.level[n - 1] + slope * (f - self.freq[n - 1])
                } else {
                    let mut j = 0;
                    while j < n - 1 && self.freq[j + 1] < f {
                        j += 1;
                    }
                    let t = (f - self.freq[j]) / (self.freq[j + 1] - self.freq[j]);
                    self.level[j] * (1.0 - t) + self.level[j + 1] * t
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_impedance_point_reads_zero() {
        let imp = Curve::from_vecs(vec![20.0, 100.0, 1000.0], vec![8.0, 4.0, 16.0]);
        let eq = ImpedanceEq::from_curve(&imp, 2.0);
        assert!(eq.level_at(100.0).abs() < 1e-12);
    }

    #[test]
    fn higher_impedance_boosts_level() {
        // z/(R+z) grows with z, so any point above z_min maps above 0 dB
        let imp = Curve::from_vecs(vec![20.0, 100.0, 1000.0], vec![8.0, 4.0, 16.0]);
        let eq = ImpedanceEq::from_curve(&imp, 2.0);
        assert!(eq.level_at(20.0) > 0.0);
        assert!(eq.level_at(1000.0) > eq.level_at(20.0));
    }

    #[test]
    fn interpolates_between_samples() {
        let imp = Curve::from_vecs(vec![100.0, 200.0], vec![4.0, 4.0]);
        let eq = ImpedanceEq::from_curve(&imp, 2.0);
        // Flat impedance: correction is 0 dB everywhere inside the range
        assert!(eq.level_at(150.0).abs() < 1e-12);
    }

    #[test]
    fn extrapolates_beyond_measured_range() {
        let imp = Curve::from_vecs(vec![100.0, 200.0, 300.0], vec![4.0, 6.0, 8.0]);
        let eq = ImpedanceEq::from_curve(&imp, 2.0);
        let inside = eq.level_at(300.0);
        let beyond = eq.level_at(400.0);
        assert!(beyond.is_finite());
        // End slope is positive, extrapolation keeps climbing
        assert!(beyond > inside);
        let below = eq.level_at(50.0);
        assert!(below.is_finite());
        assert!(below < eq.level_at(100.0));
    }

    #[test]
    fn empty_curve_is_flat_zero() {
        let eq = ImpedanceEq::from_curve(&Curve::from_vecs(vec![], vec![]), 2.0);
        assert_eq!(eq.level_at(1000.0), 0.0);
    }

    #[test]
    fn single_sample_is_flat() {
        let imp = Curve::from_vecs(vec![100.0], vec![4.0]);
        let eq = ImpedanceEq::from_curve(&imp, 2.0);
        assert_eq!(eq.level_at(50.0), eq.level_at(5000.0));
    }
}
