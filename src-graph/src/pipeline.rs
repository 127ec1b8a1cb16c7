//! Per-curve processing pipeline.
//!
//! Each input curve runs through the fixed stage order
//! compensate -> align -> smooth, then the equalized variants are derived.
//! Every emitted variant owns independent storage so later stages can never
//! corrupt curves already handed to the presentation layer.

use ndarray::Array1;

use crate::align::{self, Alignment};
use crate::compensate::compensate;
use crate::iir::{self, Peq};
use crate::impedance::ImpedanceEq;
use crate::smooth::smooth;
use crate::Curve;

/// Smoothing requested for a run.
#[derive(Debug, Clone)]
pub struct SmoothSpec {
    /// Fraction of an octave the smoothing window spans
    pub octave_fraction: f64,
    /// Text used in curve labels, e.g. "1" or "1/12"
    pub display: String,
    /// Suppress the unsmoothed curve
    pub smoothed_only: bool,
}

impl SmoothSpec {
    pub fn new(octave_fraction: f64, smoothed_only: bool) -> Self {
        SmoothSpec {
            octave_fraction,
            display: format!("{}", octave_fraction),
            smoothed_only,
        }
    }
}

/// Configuration shared by every curve of a run.
///
/// The reference table and the impedance EQ are built once and passed in
/// read-only; curves are processed independently of each other.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Alignment applied after compensation
    pub alignment: Alignment,
    /// Reference curve subtracted from each input curve
    pub reference: Option<Curve>,
    /// Optional fractional octave smoothing
    pub smoothing: Option<SmoothSpec>,
    /// Optional EQ correction derived from an impedance measurement
    pub impedance: Option<ImpedanceEq>,
    /// Parametric EQ simulated on top of each curve
    pub peq: Peq,
}

/// A processed curve ready for presentation.
#[derive(Debug, Clone)]
pub struct LabeledCurve {
    /// Legend label, base name plus variant suffixes
    pub label: String,
    pub curve: Curve,
    /// Drawn dashed (the reference curve)
    pub dotted: bool,
}

fn apply_impedance(curve: &Curve, eq: &ImpedanceEq) -> Curve {
    Curve {
        freq: curve.freq.clone(),
        spl: Array1::from_shape_fn(curve.len(), |i| curve.spl[i] + eq.level_at(curve.freq[i])),
    }
}

fn apply_peq(curve: &Curve, peq: &Peq) -> Curve {
    Curve {
        freq: curve.freq.clone(),
        spl: &curve.spl + &iir::peq_spl(&curve.freq, peq),
    }
}

/// Emit a curve plus its equalized variants under the naming convention
/// consumed by the legend.
fn emit_variants(
    out: &mut Vec<LabeledCurve>,
    base: &str,
    curve: &Curve,
    config: &PipelineConfig,
    dotted: bool,
) {
    out.push(LabeledCurve {
        label: base.to_string(),
        curve: curve.clone(),
        dotted,
    });
    if let Some(eq) = &config.impedance {
        out.push(LabeledCurve {
            label: format!("{} (Impedance equalized)", base),
            curve: apply_impedance(curve, eq),
            dotted,
        });
    }
    if !config.peq.is_empty() {
        out.push(LabeledCurve {
            label: format!("{} (Equalized)", base),
            curve: apply_peq(curve, &config.peq),
            dotted,
        });
    }
}

/// Process one input curve into its named output curves.
///
/// `is_reference` marks the dotted reference curve, which is never
/// smoothed. Output order is deterministic: unsmoothed variants first,
/// then the smoothed ones.
pub fn process_curve(
    name: &str,
    raw: Curve,
    config: &PipelineConfig,
    is_reference: bool,
) -> Vec<LabeledCurve> {
    let compensated = match &config.reference {
        Some(reference) => compensate(&raw, reference),
        None => raw,
    };

    let offset = align::compute_offset(&compensated, &config.alignment);
    let aligned = align::apply_offset(&compensated, offset);

    let smoothed = match &config.smoothing {
        Some(spec) if !is_reference => Some((spec, smooth(&aligned, spec.octave_fraction))),
        _ => None,
    };

    let mut out = Vec::new();

    let smoothed_only = smoothed.is_some()
        && config
            .smoothing
            .as_ref()
            .is_some_and(|spec| spec.smoothed_only);
    if !smoothed_only {
        emit_variants(&mut out, name, &aligned, config, is_reference);
    }

    if let Some((spec, curve)) = smoothed {
        let base = format!("{} ({} oct smoothed)", name, spec.display);
        emit_variants(&mut out, &base, &curve, config, is_reference);
    }

    out
}
