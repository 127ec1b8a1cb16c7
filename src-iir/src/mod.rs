#![doc = include_str!("../README.md")]

use ndarray::Array1;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default sample rate used when none is configured (Hz).
pub const SRATE: f64 = 48000.0;

/// Response in dB reported when the magnitude underflows to zero.
pub const SILENCE_DB: f64 = -200.0;

/// A parametric EQ: a collection of weighted biquad filters.
/// Each tuple contains (weight, biquad_filter).
pub type Peq = Vec<(f64, Biquad)>;

/// Filter types for biquad filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiquadFilterType {
    /// Low-pass filter
    Lowpass,
    /// High-pass filter
    Highpass,
    /// Band-pass filter
    Bandpass,
    /// Peaking filter
    Peak,
    /// Notch filter
    Notch,
    /// Low-shelf filter
    Lowshelf,
    /// High-shelf filter
    Highshelf,
}

impl BiquadFilterType {
    /// Returns the short string representation of the filter type (e.g., "LP").
    pub fn short_name(&self) -> &'static str {
        match self {
            BiquadFilterType::Lowpass => "LP",
            BiquadFilterType::Highpass => "HP",
            BiquadFilterType::Bandpass => "BP",
            BiquadFilterType::Peak => "PK",
            BiquadFilterType::Notch => "NO",
            BiquadFilterType::Lowshelf => "LS",
            BiquadFilterType::Highshelf => "HS",
        }
    }

    /// Returns the long string representation of the filter type (e.g., "Lowpass").
    pub fn long_name(&self) -> &'static str {
        match self {
            BiquadFilterType::Lowpass => "Lowpass",
            BiquadFilterType::Highpass => "Highpass",
            BiquadFilterType::Bandpass => "Bandpass",
            BiquadFilterType::Peak => "Peak",
            BiquadFilterType::Notch => "Notch",
            BiquadFilterType::Lowshelf => "Lowshelf",
            BiquadFilterType::Highshelf => "Highshelf",
        }
    }
}

/// Error returned when parsing a filter type name fails.
#[derive(Debug, Clone, Error)]
#[error("unknown filter type '{0}' (expected one of PEAK, LOWSHELF, HIGHSHELF, LOWPASS, HIGHPASS, BANDPASS, NOTCH)")]
pub struct UnknownFilterType(pub String);

impl FromStr for BiquadFilterType {
    type Err = UnknownFilterType;

    /// Parse the uppercase type names used in filter specification strings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOWPASS" | "LP" => Ok(BiquadFilterType::Lowpass),
            "HIGHPASS" | "HP" => Ok(BiquadFilterType::Highpass),
            "BANDPASS" | "BP" => Ok(BiquadFilterType::Bandpass),
            "PEAK" | "PK" => Ok(BiquadFilterType::Peak),
            "NOTCH" | "NO" => Ok(BiquadFilterType::Notch),
            "LOWSHELF" | "LS" => Ok(BiquadFilterType::Lowshelf),
            "HIGHSHELF" | "HS" => Ok(BiquadFilterType::Highshelf),
            _ => Err(UnknownFilterType(s.to_string())),
        }
    }
}

/// A single biquad IIR filter, evaluated analytically.
///
/// Coefficients follow the RBJ audio EQ cookbook and are normalized by a0
/// at construction time, so the stored a0 is implicitly 1.
#[derive(Debug, Clone)]
pub struct Biquad {
    /// The type of filter
    pub filter_type: BiquadFilterType,
    /// Center frequency in Hz
    pub freq: f64,
    /// Sample rate in Hz
    pub srate: f64,
    /// Q factor (quality factor)
    pub q: f64,
    /// Gain in dB (for peaking and shelving filters)
    pub db_gain: f64,
    /// Normalized filter coefficients
    a1: f64,
    a2: f64,
    b0: f64,
    b1: f64,
    b2: f64,
    /// Pre-computed coefficients for fast frequency response calculation
    r_up0: f64,
    r_up1: f64,
    r_up2: f64,
    r_dw0: f64,
    r_dw1: f64,
    r_dw2: f64,
}

impl Biquad {
    /// Creates and initializes a new Biquad filter.
    pub fn new(filter_type: BiquadFilterType, freq: f64, srate: f64, q: f64, db_gain: f64) -> Self {
        let mut biquad = Biquad {
            filter_type,
            freq,
            srate,
            q,
            db_gain,
            a1: 0.0,
            a2: 0.0,
            b0: 0.0,
            b1: 0.0,
            b2: 0.0,
            r_up0: 0.0,
            r_up1: 0.0,
            r_up2: 0.0,
            r_dw0: 0.0,
            r_dw1: 0.0,
            r_dw2: 0.0,
        };

        // Safety clamp: ensure strictly positive Q to avoid division by zero
        // in alpha = sn/(2*q)
        if biquad.q <= 0.0 {
            biquad.q = 1.0e-2;
        }

        biquad.compute_coeffs();
        biquad
    }

    fn compute_coeffs(&mut self) {
        // Intermediate variables
        let a = 10.0_f64.powf(self.db_gain / 40.0);
        let omega = 2.0 * PI * self.freq / self.srate;
        let sn = omega.sin();
        let cs = omega.cos();
        let alpha = sn / (2.0 * self.q);
        let beta = (a + a).sqrt();

        // Raw coefficients
        let (b0, b1, b2, a0, a1, a2);

        match self.filter_type {
            BiquadFilterType::Lowpass => {
                b0 = (1.0 - cs) / 2.0;
                b1 = 1.0 - cs;
                b2 = (1.0 - cs) / 2.0;
                a0 = 1.0 + alpha;
                a1 = -2.0 * cs;
                a2 = 1.0 - alpha;
            }
            BiquadFilterType::Highpass => {
                b0 = (1.0 + cs) / 2.0;
                b1 = -(1.0 + cs);
                b2 = (1.0 + cs) / 2.0;
                a0 = 1.0 + alpha;
                a1 = -2.0 * cs;
                a2 = 1.0 - alpha;
            }
            BiquadFilterType::Bandpass => {
                b0 = alpha;
                b1 = 0.0;
                b2 = -alpha;
                a0 = 1.0 + alpha;
                a1 = -2.0 * cs;
                a2 = 1.0 - alpha;
            }
            BiquadFilterType::Notch => {
                b0 = 1.0;
                b1 = -2.0 * cs;
                b2 = 1.0;
                a0 = 1.0 + alpha;
                a1 = -2.0 * cs;
                a2 = 1.0 - alpha;
            }
            BiquadFilterType::Peak => {
                b0 = 1.0 + (alpha * a);
                b1 = -2.0 * cs;
                b2 = 1.0 - (alpha * a);
                a0 = 1.0 + (alpha / a);
                a1 = -2.0 * cs;
                a2 = 1.0 - (alpha / a);
            }
            BiquadFilterType::Lowshelf => {
                b0 = a * ((a + 1.0) - (a - 1.0) * cs + beta * sn);
                b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cs);
                b2 = a * ((a + 1.0) - (a - 1.0) * cs - beta * sn);
                a0 = (a + 1.0) + (a - 1.0) * cs + beta * sn;
                a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cs);
                a2 = (a + 1.0) + (a - 1.0) * cs - beta * sn;
            }
            BiquadFilterType::Highshelf => {
                b0 = a * ((a + 1.0) + (a - 1.0) * cs + beta * sn);
                b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cs);
                b2 = a * ((a + 1.0) + (a - 1.0) * cs - beta * sn);
                a0 = (a + 1.0) - (a - 1.0) * cs + beta * sn;
                a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cs);
                a2 = (a + 1.0) - (a - 1.0) * cs - beta * sn;
            }
        }

        // Normalize coefficients
        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;

        // Pre-compute for result()
        self.r_up0 = (self.b0 + self.b1 + self.b2).powi(2);
        self.r_up1 = -4.0 * (self.b0 * self.b1 + 4.0 * self.b0 * self.b2 + self.b1 * self.b2);
        self.r_up2 = 16.0 * self.b0 * self.b2;
        self.r_dw0 = (1.0 + self.a1 + self.a2).powi(2);
        self.r_dw1 = -4.0 * (self.a1 + 4.0 * self.a2 + self.a1 * self.a2);
        self.r_dw2 = 16.0 * self.a2;
    }

    /// Calculates the filter's magnitude response at a single frequency `f`.
    ///
    /// The squared magnitude can go slightly negative from floating point
    /// cancellation; it is clamped to zero before the square root.
    pub fn result(&self, f: f64) -> f64 {
        let phi = (PI * f / self.srate).sin().powi(2);
        let phi2 = phi * phi;

        let numerator = self.r_up0 + self.r_up1 * phi + self.r_up2 * phi2;
        let denominator = self.r_dw0 + self.r_dw1 * phi + self.r_dw2 * phi2;

        let result = (numerator / denominator).max(0.0);
        result.sqrt()
    }

    /// Calculates the filter's response in dB at a single frequency `f`.
    ///
    /// Returns [`SILENCE_DB`] instead of negative infinity when the
    /// magnitude is zero.
    pub fn log_result(&self, f: f64) -> f64 {
        let result = self.result(f);
        if result > 0.0 {
            20.0 * result.log10()
        } else {
            SILENCE_DB
        }
    }

    /// Vectorized version to compute the dB response for a vector of frequencies.
    pub fn np_log_result(&self, freq: &Array1<f64>) -> Array1<f64> {
        let coeff = PI / self.srate;
        let phi = (freq * coeff).mapv(f64::sin).mapv(|x| x.powi(2));
        let phi2 = &phi * &phi;

        let r_up = self.r_up0 + self.r_up1 * &phi + self.r_up2 * &phi2;
        let r_dw = self.r_dw0 + self.r_dw1 * &phi + self.r_dw2 * &phi2;
        let r = r_up / r_dw;

        // Clip to a minimum value to avoid log(0), then calculate dB
        let min_val = 1.0e-20;

        r.mapv(|val| val.max(min_val))
            .mapv(f64::sqrt)
            .mapv(f64::log10)
            * 20.0
    }

    /// Returns the normalized filter coefficients as (a1, a2, b0, b1, b2).
    pub fn constants(&self) -> (f64, f64, f64, f64, f64) {
        (self.a1, self.a2, self.b0, self.b1, self.b2)
    }
}

impl fmt::Display for Biquad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type:{},Freq:{:.1},Rate:{:.1},Q:{:.1},Gain:{:.1}",
            self.filter_type.short_name(),
            self.freq,
            self.srate,
            self.q,
            self.db_gain
        )
    }
}

/// Compute the combined response in dB of a filter bank at a single frequency.
///
/// Filters combine additively in dB (multiplicatively in linear magnitude),
/// an approximation valid for well-separated or low-Q filters rather than
/// an exact cascade.
pub fn peq_log_result(peq: &Peq, f: f64) -> f64 {
    peq.iter()
        .map(|(weight, iir)| weight * iir.log_result(f))
        .sum()
}

/// Compute dB response for each frequency given a PEQ
///
/// # Arguments
/// * `freq` - Array of frequencies to compute response for
/// * `peq` - PEQ vector containing weighted biquad filters
///
/// # Returns
/// * Array of dB values for each frequency
pub fn peq_spl(freq: &Array1<f64>, peq: &Peq) -> Array1<f64> {
    let mut current_filter = Array1::zeros(freq.len());

    for (weight, iir) in peq {
        current_filter += &(iir.np_log_result(freq) * *weight);
    }

    current_filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn lowpass_corner_is_minus_3db() {
        // Butterworth-Q lowpass reads -3 dB at its corner frequency
        let bq = Biquad::new(
            BiquadFilterType::Lowpass,
            1_000.0,
            48_000.0,
            std::f64::consts::FRAC_1_SQRT_2,
            0.0,
        );
        let db = bq.log_result(1_000.0);
        assert!(approx_eq(db, -3.0, 0.05), "corner response {} dB", db);
    }

    #[test]
    fn peak_gain_at_center() {
        let bq = Biquad::new(BiquadFilterType::Peak, 1_000.0, 48_000.0, 1.0, 6.0);
        let db = bq.log_result(1_000.0);
        assert!(db > 5.0 && db < 7.0, "center response {} dB", db);
    }

    #[test]
    fn log_result_finite_or_sentinel() {
        let types = [
            BiquadFilterType::Lowpass,
            BiquadFilterType::Highpass,
            BiquadFilterType::Bandpass,
            BiquadFilterType::Peak,
            BiquadFilterType::Notch,
            BiquadFilterType::Lowshelf,
            BiquadFilterType::Highshelf,
        ];
        for t in types {
            let bq = Biquad::new(t, 1_000.0, 48_000.0, 0.707, 3.0);
            for f in [1.0, 20.0, 100.0, 1_000.0, 10_000.0, 20_000.0, 24_000.0] {
                let db = bq.log_result(f);
                assert!(
                    db.is_finite() || db == SILENCE_DB,
                    "{:?} at {} Hz gave {}",
                    t,
                    f,
                    db
                );
                assert!(!db.is_nan());
            }
        }
    }

    #[test]
    fn notch_kills_center_frequency() {
        // The squared magnitude cancels to ~0 at the center; depending on
        // rounding this is either the sentinel or a very deep notch
        let bq = Biquad::new(BiquadFilterType::Notch, 1_000.0, 48_000.0, 10.0, 0.0);
        let db = bq.log_result(1_000.0);
        assert!(db < -80.0, "notch center {} dB", db);
        assert!(!db.is_nan());
    }

    #[test]
    fn coefficients_are_normalized() {
        // After normalization the numerator and denominator at DC must agree
        // with the analytic response, i.e. a0 is implicitly 1.
        let bq = Biquad::new(BiquadFilterType::Peak, 1_000.0, 48_000.0, 1.0, 6.0);
        let (a1, a2, b0, b1, b2) = bq.constants();
        let dc = (b0 + b1 + b2) / (1.0 + a1 + a2);
        assert!(approx_eq(20.0 * dc.abs().log10(), bq.log_result(0.0), 1e-9));
    }

    #[test]
    fn zero_q_is_safely_clamped() {
        let bq = Biquad::new(BiquadFilterType::Peak, 1_000.0, 48_000.0, 0.0, 3.0);
        let freqs = array![20.0, 100.0, 1_000.0, 10_000.0, 20_000.0];
        let resp = bq.np_log_result(&freqs);
        for (i, v) in resp.iter().enumerate() {
            assert!(v.is_finite(), "response at idx {} not finite: {}", i, v);
        }
    }

    #[test]
    fn peq_combines_additively() {
        let bq1 = Biquad::new(BiquadFilterType::Peak, 100.0, 48_000.0, 1.0, 3.0);
        let bq2 = Biquad::new(BiquadFilterType::Peak, 10_000.0, 48_000.0, 1.0, -2.0);
        let peq: Peq = vec![(1.0, bq1.clone()), (1.0, bq2.clone())];

        for f in [50.0, 100.0, 1_000.0, 10_000.0] {
            let combined = peq_log_result(&peq, f);
            let expected = bq1.log_result(f) + bq2.log_result(f);
            assert!(approx_eq(combined, expected, 1e-12));
        }
    }

    #[test]
    fn peq_spl_matches_scalar_path() {
        let bq = Biquad::new(BiquadFilterType::Peak, 1_000.0, 48_000.0, 1.0, 6.0);
        let peq: Peq = vec![(1.0, bq.clone())];
        let freq = array![100.0, 1_000.0, 10_000.0];

        let spl = peq_spl(&freq, &peq);
        for (i, f) in freq.iter().enumerate() {
            assert!(approx_eq(spl[i], bq.log_result(*f), 1e-9));
        }
    }

    #[test]
    fn filter_type_parsing() {
        assert_eq!(
            "PEAK".parse::<BiquadFilterType>().unwrap(),
            BiquadFilterType::Peak
        );
        assert_eq!(
            "lowshelf".parse::<BiquadFilterType>().unwrap(),
            BiquadFilterType::Lowshelf
        );
        assert_eq!(
            "HP".parse::<BiquadFilterType>().unwrap(),
            BiquadFilterType::Highpass
        );
        assert!("WAVELET".parse::<BiquadFilterType>().is_err());
    }
}
