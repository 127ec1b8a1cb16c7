//! FreqRespGraph - plot single or multiple frequency response graphs given
//! as delimited data files in a single interactive graph.
//!
//! Data can be aligned to 0 dB at a frequency or frequency range,
//! compensated against a reference curve, smoothed by a fraction of an
//! octave, and overlaid with simulated parametric EQ or impedance-derived
//! corrections.

use std::error::Error;
use std::path::Path;

use clap::Parser;

use freqrespgraph::align::Alignment;
use freqrespgraph::cli::Args;
use freqrespgraph::impedance::ImpedanceEq;
use freqrespgraph::pipeline::{process_curve, PipelineConfig, SmoothSpec};
use freqrespgraph::plot::{render, GraphLayout};
use freqrespgraph::read::read_curve;

/// Legend label for a file, its base name like the original tool.
fn curve_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn alignment_note(args: &Args) -> Option<String> {
    if args.hidealignment || args.alignmin <= 0.0 {
        return None;
    }
    if args.alignmax > 0.0 {
        Some(format!(
            "(Aligned to 0db at {}...{} Hz)",
            args.alignmin as i64, args.alignmax as i64
        ))
    } else {
        Some(format!("(Aligned to 0db at {} Hz)", args.alignmin as i64))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let reference = match &args.refcompensate {
        Some(path) => Some(read_curve(path, args.delimiter)?),
        None => None,
    };

    let impedance = match &args.impedance {
        Some(path) => {
            let curve = read_curve(path, args.impedance_delimiter)?;
            Some(ImpedanceEq::from_curve(&curve, args.source_resistance))
        }
        None => None,
    };

    let config = PipelineConfig {
        alignment: Alignment::from_bounds(args.alignmin, args.alignmax),
        reference,
        smoothing: args.smooth.as_ref().map(|fraction| SmoothSpec {
            octave_fraction: fraction.value,
            display: fraction.text.clone(),
            smoothed_only: args.smoothonly,
        }),
        impedance,
        peq: args
            .peq
            .iter()
            .map(|spec| (1.0, spec.to_biquad(args.sample_rate)))
            .collect(),
    };

    let mut curves = Vec::new();
    for file in &args.files {
        let curve = read_curve(file, args.delimiter)?;
        curves.extend(process_curve(&curve_label(file), curve, &config, false));
    }
    if let Some(path) = &args.refcurve {
        let curve = read_curve(path, args.delimiter)?;
        curves.extend(process_curve(&curve_label(path), curve, &config, true));
    }

    let layout = GraphLayout {
        xmin: args.xmin,
        xmax: args.xmax,
        ymin: args.ymin,
        ymax: args.ymax,
        ylabel_note: alignment_note(&args),
        title: args.title.clone(),
        show_legend: !args.nolegend,
    };

    let plot = render(&curves, &layout);
    match &args.output {
        Some(path) => plot.write_html(path),
        None => plot.show(),
    }

    Ok(())
}
