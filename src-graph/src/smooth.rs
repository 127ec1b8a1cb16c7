//! Fractional octave smoothing on a logarithmic frequency grid.
//!
//! The window length is derived from the curve's own grid spacing so that
//! it spans the requested fraction of an octave. Curves that are not
//! log-uniform are first resampled onto a synthetic logarithmic grid with
//! the same sample count.

use std::f64::consts::LN_2;

use ndarray::Array1;

use crate::Curve;

/// Relative deviation above which the grid is considered non log-uniform.
const UNIFORMITY_TOLERANCE: f64 = 0.2;

/// Linear interpolation of (xs, ys) at x, clamped to the end values.
fn interp_linear(xs: &Array1<f64>, ys: &Array1<f64>, x: f64) -> f64 {
    let n = xs.len();
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    let mut j = 0;
    while j < n - 1 && xs[j + 1] < x {
        j += 1;
    }
    let t = (x - xs[j]) / (xs[j + 1] - xs[j]);
    ys[j] * (1.0 - t) + ys[j + 1] * t
}

/// One first-order Savitzky-Golay pass: a moving average over `window`
/// samples with nearest-value boundary handling. An even window is biased
/// half a sample to the right; the bidirectional caller cancels that bias.
fn savgol_pass(values: &Array1<f64>, window: usize) -> Array1<f64> {
    let n = values.len();
    let half_left = ((window - 1) / 2) as isize;

    Array1::from_shape_fn(n, |i| {
        let mut sum = 0.0;
        for j in 0..window {
            let idx = (i as isize + j as isize - half_left).clamp(0, n as isize - 1);
            sum += values[idx as usize];
        }
        sum / window as f64
    })
}

/// Bidirectional smoothing: once forward, once over the reversed sequence,
/// re-reversed, to avoid edge bias.
fn savgol_bidirectional(values: &Array1<f64>, window: usize) -> Array1<f64> {
    let forward = savgol_pass(values, window);
    let mut reversed = forward.to_vec();
    reversed.reverse();
    let mut back = savgol_pass(&Array1::from_vec(reversed), window).to_vec();
    back.reverse();
    Array1::from_vec(back)
}

/// Number of samples spanning `octaves` at the given per-sample ratio.
fn window_for(octaves: f64, ln_step: f64) -> usize {
    let w = (octaves * LN_2 / ln_step).round();
    if w.is_finite() && w > 0.0 { w as usize } else { 0 }
}

/// Check that the grid doubles in frequency every `octave_samples` samples.
///
/// Probes the largest whole-octave index within the curve and compares it
/// against the expected power-of-two multiple of the first frequency.
fn is_log_uniform(freq: &Array1<f64>, octave_samples: usize) -> bool {
    let n = freq.len();
    if octave_samples == 0 {
        return false;
    }
    let mut k = n / octave_samples;
    while k > 0 && k * octave_samples >= n {
        k -= 1;
    }
    let idx = k * octave_samples;
    let expected = freq[0] * 2.0_f64.powi(k as i32);
    (freq[idx] / expected - 1.0).abs() <= UNIFORMITY_TOLERANCE
}

/// Smooth a curve by the given fraction of an octave.
///
/// Returns the input unchanged when it has fewer than 2 samples or a
/// degenerate frequency spacing, and unsmoothed (but possibly resampled)
/// when the derived window does not exceed one sample.
pub fn smooth(curve: &Curve, octave_fraction: f64) -> Curve {
    let n = curve.len();
    if n < 2 {
        return curve.clone();
    }

    // Geometric mean of the per-sample frequency ratios
    let step = (curve.freq[n - 1] / curve.freq[0]).powf(1.0 / (n - 1) as f64);
    if !step.is_finite() || step <= 1.0 {
        return curve.clone();
    }

    let mut freq = curve.freq.clone();
    let mut spl = curve.spl.clone();
    let mut ln_step = step.ln();

    let octave_samples = window_for(1.0, ln_step);
    if !is_log_uniform(&freq, octave_samples) {
        // Resample onto a logarithmic grid with the same sample count
        let ratio = curve.freq[n - 1] / curve.freq[0];
        freq = Array1::from_shape_fn(n, |i| {
            curve.freq[0] * ratio.powf(i as f64 / (n - 1) as f64)
        });
        spl = freq.mapv(|f| interp_linear(&curve.freq, &curve.spl, f));
        ln_step = ratio.powf(1.0 / (n - 1) as f64).ln();
    }

    let window = window_for(octave_fraction, ln_step);
    if window > 1 {
        spl = savgol_bidirectional(&spl, window);
    }

    Curve { freq, spl }
}
