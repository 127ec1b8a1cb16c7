//! Presentation glue: turn labeled curves into a plotly figure.
//!
//! Everything here is thin by design; the processing pipeline knows nothing
//! about plotting.

use plotly::common::{DashType, Line, Mode, Title};
use plotly::layout::{Axis, AxisType};
use plotly::{Layout, Plot, Scatter};

use crate::pipeline::LabeledCurve;

/// Axis ranges and labeling handed over by the CLI layer.
#[derive(Debug, Clone)]
pub struct GraphLayout {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    /// Annotation appended to the Y-Axis label, e.g. the alignment note
    pub ylabel_note: Option<String>,
    pub title: String,
    pub show_legend: bool,
}

/// Build the frequency response plot from the processed curves.
///
/// The x axis is logarithmic; plotly expects log-axis ranges as log10
/// exponents. Reference curves are drawn dashed black like the original
/// matplotlib `--k` style.
pub fn render(curves: &[LabeledCurve], layout: &GraphLayout) -> Plot {
    let mut plot = Plot::new();

    for labeled in curves {
        let mut trace = Scatter::new(
            labeled.curve.freq.to_vec(),
            labeled.curve.spl.to_vec(),
        )
        .mode(Mode::Lines)
        .name(labeled.label.as_str());
        if labeled.dotted {
            trace = trace.line(Line::new().color("#000000").dash(DashType::Dash));
        }
        plot.add_trace(trace);
    }

    let mut ylabel = "SPL [dB]".to_string();
    if let Some(note) = &layout.ylabel_note {
        ylabel = format!("{}<br>{}", ylabel, note);
    }

    let mut figure_layout = Layout::new()
        .width(1024)
        .height(600)
        .show_legend(layout.show_legend)
        .x_axis(
            Axis::new()
                .title(Title::with_text("Frequency [Hz]"))
                .type_(AxisType::Log)
                .range(vec![layout.xmin.log10(), layout.xmax.log10()])
                .show_grid(true),
        )
        .y_axis(
            Axis::new()
                .title(Title::with_text(ylabel))
                .range(vec![layout.ymin, layout.ymax])
                .show_grid(true),
        );
    if !layout.title.is_empty() {
        figure_layout = figure_layout.title(Title::with_text(layout.title.as_str()));
    }
    plot.set_layout(figure_layout);

    plot
}
