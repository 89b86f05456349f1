use eframe::egui::{Color32, RichText, ScrollArea, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points,
};

use crate::charts::{BoxSummary, ChartSpec, HistogramBin, ScatterGroup};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Visualizations page (central panel)
// ---------------------------------------------------------------------------

/// Render the charts page: all four charts stacked in a scroll area.
pub fn charts_page(ui: &mut Ui, state: &AppState) {
    ui.heading("Drug Overdose Deaths Visualizations");
    ui.separator();

    if let Some(message) = &state.schema_error {
        ui.label(RichText::new(message).color(Color32::RED));
        return;
    }

    let Some(charts) = &state.charts else {
        ui.label(
            RichText::new("No data available to display. Please check your dataset.")
                .color(Color32::YELLOW),
        );
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            chart_section(ui, "trend_plot", &charts.trend);
            chart_section(ui, "state_plot", &charts.by_state);
            chart_section(ui, "cause_plot", &charts.causes);
            chart_section(ui, "distribution_plot", &charts.distribution);
        });
}

/// One titled chart section; an empty view gets a placeholder label.
fn chart_section(ui: &mut Ui, id: &str, chart: &ChartSpec) {
    ui.add_space(12.0);
    ui.strong(chart.title());
    ui.add_space(4.0);

    if chart.is_empty() {
        ui.label("No data available for the selected filters.");
        return;
    }

    match chart {
        ChartSpec::Line {
            x_label,
            y_label,
            points,
            ..
        } => render_line(ui, id, x_label, y_label, points),
        ChartSpec::Bar {
            x_label,
            y_label,
            categories,
            values,
            ..
        } => render_bar(ui, id, x_label, y_label, categories, values),
        ChartSpec::Scatter {
            x_label,
            y_label,
            categories,
            groups,
            ..
        } => render_scatter(ui, id, x_label, y_label, categories, groups),
        ChartSpec::Histogram {
            x_label,
            y_label,
            states,
            bins,
            summaries,
            ..
        } => render_histogram(ui, id, x_label, y_label, states, bins, summaries),
    }
}

// ---------------------------------------------------------------------------
// Individual chart renderers
// ---------------------------------------------------------------------------

fn render_line(ui: &mut Ui, id: &str, x_label: &str, y_label: &str, points: &[[f64; 2]]) {
    Plot::new(id)
        .height(260.0)
        .allow_scroll(false)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        // Years are integers; hide labels at fractional grid marks.
        .x_axis_formatter(|mark, _range| {
            if mark.value.fract() == 0.0 {
                format!("{:.0}", mark.value)
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            let series: PlotPoints = points.iter().copied().collect();
            plot_ui.line(Line::new(series).color(Color32::LIGHT_BLUE).width(2.0));
        });
}

fn render_bar(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    categories: &[String],
    values: &[u64],
) {
    let bars: Vec<Bar> = values
        .iter()
        .enumerate()
        .map(|(slot, &value)| Bar::new(slot as f64, value as f64).width(0.6))
        .collect();

    Plot::new(id)
        .height(260.0)
        .allow_scroll(false)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(category_formatter(categories))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
        });
}

fn render_scatter(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    categories: &[String],
    groups: &[ScatterGroup],
) {
    Plot::new(id)
        .height(260.0)
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(category_formatter(categories))
        .show(ui, |plot_ui| {
            for group in groups {
                let series: PlotPoints = group.points.iter().copied().collect();
                plot_ui.points(
                    Points::new(series)
                        .name(&group.state)
                        .color(group.color)
                        .radius(3.0),
                );
            }
        });
}

fn render_histogram(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    states: &[(String, Color32)],
    bins: &[HistogramBin],
    summaries: &[BoxSummary],
) {
    // The marginal box summaries sit above the histogram, sharing the
    // death-count axis.
    if !summaries.is_empty() {
        render_box_summaries(ui, states, summaries);
    }

    // One bar chart per state so each layer gets its own legend entry;
    // base offsets stack the layers within a bin.
    let mut layer_bars: Vec<Vec<Bar>> = vec![Vec::new(); states.len()];
    for bin in bins {
        let center = (bin.start + bin.end) / 2.0;
        let width = bin.end - bin.start;
        let mut base = 0.0;
        for (layer, &count) in bin.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let height = count as f64;
            layer_bars[layer].push(Bar::new(center, height).width(width).base_offset(base));
            base += height;
        }
    }

    Plot::new(id)
        .height(260.0)
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            for ((state, color), bars) in states.iter().zip(layer_bars) {
                plot_ui.bar_chart(BarChart::new(bars).color(*color).name(state));
            }
        });
}

/// One horizontal box per state, stacked on the value axis the
/// histogram uses below.
fn render_box_summaries(ui: &mut Ui, states: &[(String, Color32)], summaries: &[BoxSummary]) {
    let height = (40.0 + 22.0 * summaries.len() as f32).min(220.0);

    Plot::new("distribution_box")
        .height(height)
        .allow_scroll(false)
        .show_axes([true, false])
        .show(ui, |plot_ui| {
            for (slot, ((state, color), summary)) in states.iter().zip(summaries).enumerate() {
                let element = BoxElem::new(
                    slot as f64,
                    BoxSpread::new(
                        summary.min,
                        summary.q1,
                        summary.median,
                        summary.q3,
                        summary.max,
                    ),
                )
                .box_width(0.5)
                .fill(color.gamma_multiply(0.3))
                .stroke(Stroke::new(1.5, *color));

                plot_ui.box_plot(BoxPlot::new(vec![element]).horizontal().name(state));
            }
        });
}

/// Axis formatter mapping integer grid marks back to category labels.
fn category_formatter(
    categories: &[String],
) -> impl Fn(egui_plot::GridMark, &std::ops::RangeInclusive<f64>) -> String + 'static {
    let categories = categories.to_vec();
    move |mark, _range| {
        let slot = mark.value.round();
        if (mark.value - slot).abs() > 0.25 || slot < 0.0 {
            return String::new();
        }
        categories
            .get(slot as usize)
            .cloned()
            .unwrap_or_default()
    }
}
