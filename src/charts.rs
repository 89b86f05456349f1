use std::collections::HashMap;

use eframe::egui::Color32;

use crate::color::StateColors;
use crate::data::aggregate;
use crate::data::model::Dataset;

/// Bin count for the death-count distribution histogram.
pub const DISTRIBUTION_BINS: usize = 30;

// ---------------------------------------------------------------------------
// Chart descriptions
// ---------------------------------------------------------------------------

/// One scatter series: every visible record of a single state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterGroup {
    pub state: String,
    pub color: Color32,
    /// `[cause slot, death count]` pairs; the slot indexes `categories`.
    pub points: Vec<[f64; 2]>,
}

/// One histogram bin over the half-open range `start..end` (the last
/// bin also takes the maximum value).
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    /// Per-state counts, parallel to the chart's state series.
    pub counts: Vec<u64>,
}

impl HistogramBin {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Five-number summary of one state's visible death counts. Whiskers
/// stop at the farthest samples inside the 1.5 × IQR fences.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// A fully prepared chart: everything the plot panel needs to draw,
/// with no dataset access left to do at paint time.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    /// Yearly totals, ascending by year.
    Line {
        title: &'static str,
        x_label: &'static str,
        y_label: &'static str,
        points: Vec<[f64; 2]>,
    },
    /// Per-state totals in first-seen order.
    Bar {
        title: &'static str,
        x_label: &'static str,
        y_label: &'static str,
        categories: Vec<String>,
        values: Vec<u64>,
    },
    /// Raw records over a categorical cause axis, one series per state.
    Scatter {
        title: &'static str,
        x_label: &'static str,
        y_label: &'static str,
        categories: Vec<String>,
        groups: Vec<ScatterGroup>,
    },
    /// Death-count distribution stacked by state, plus one marginal
    /// box summary per state.
    Histogram {
        title: &'static str,
        x_label: &'static str,
        y_label: &'static str,
        /// State layers in first-seen order.
        states: Vec<(String, Color32)>,
        bins: Vec<HistogramBin>,
        /// Five-number summaries, parallel to `states`.
        summaries: Vec<BoxSummary>,
    },
}

impl ChartSpec {
    pub fn title(&self) -> &'static str {
        match self {
            ChartSpec::Line { title, .. }
            | ChartSpec::Bar { title, .. }
            | ChartSpec::Scatter { title, .. }
            | ChartSpec::Histogram { title, .. } => title,
        }
    }

    /// True when the active filters left nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            ChartSpec::Line { points, .. } => points.is_empty(),
            ChartSpec::Bar { values, .. } => values.is_empty(),
            ChartSpec::Scatter { groups, .. } => groups.is_empty(),
            ChartSpec::Histogram { bins, .. } => bins.is_empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart builders
// ---------------------------------------------------------------------------

/// Yearly totals as a line chart.
pub fn trend_chart(dataset: &Dataset, indices: &[usize]) -> ChartSpec {
    let points = aggregate::sum_by_year(dataset, indices)
        .into_iter()
        .map(|(year, total)| [f64::from(year), total as f64])
        .collect();

    ChartSpec::Line {
        title: "Trends of Drug Overdose Deaths Over the Years",
        x_label: "Year",
        y_label: "Number of Deaths",
        points,
    }
}

/// Per-state totals as a bar chart.
pub fn state_chart(dataset: &Dataset, indices: &[usize]) -> ChartSpec {
    let (categories, values) = aggregate::sum_by_state(dataset, indices)
        .into_iter()
        .unzip();

    ChartSpec::Bar {
        title: "State-wise Drug Overdose Deaths",
        x_label: "State",
        y_label: "Number of Deaths",
        categories,
        values,
    }
}

/// Raw death counts against their cause, coloured by state. Both the
/// cause axis and the state series follow first-seen order among the
/// visible records.
pub fn cause_chart(dataset: &Dataset, indices: &[usize], colors: &StateColors) -> ChartSpec {
    let mut categories: Vec<String> = Vec::new();
    let mut cause_slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<ScatterGroup> = Vec::new();
    let mut group_slots: HashMap<&str, usize> = HashMap::new();

    for record in aggregate::survivors(dataset, indices) {
        let cause_slot = match cause_slots.get(record.cause.as_str()) {
            Some(&slot) => slot,
            None => {
                let slot = categories.len();
                categories.push(record.cause.clone());
                cause_slots.insert(record.cause.as_str(), slot);
                slot
            }
        };

        let group_slot = match group_slots.get(record.state.as_str()) {
            Some(&slot) => slot,
            None => {
                let slot = groups.len();
                groups.push(ScatterGroup {
                    state: record.state.clone(),
                    color: colors.color(&record.state),
                    points: Vec::new(),
                });
                group_slots.insert(record.state.as_str(), slot);
                slot
            }
        };

        groups[group_slot]
            .points
            .push([cause_slot as f64, record.deaths as f64]);
    }

    ChartSpec::Scatter {
        title: "Deaths vs Cause of Death",
        x_label: "Cause of Death Description",
        y_label: "Number of Deaths",
        categories,
        groups,
    }
}

/// Histogram of the visible death counts, one stacked layer per state,
/// with a marginal box summary for every state layer.
pub fn distribution_chart(dataset: &Dataset, indices: &[usize], colors: &StateColors) -> ChartSpec {
    let mut states: Vec<(String, Color32)> = Vec::new();
    let mut state_slots: HashMap<&str, usize> = HashMap::new();
    let mut samples: Vec<(f64, usize)> = Vec::with_capacity(indices.len());
    let mut state_values: Vec<Vec<f64>> = Vec::new();

    for record in aggregate::survivors(dataset, indices) {
        let slot = match state_slots.get(record.state.as_str()) {
            Some(&slot) => slot,
            None => {
                let slot = states.len();
                states.push((record.state.clone(), colors.color(&record.state)));
                state_values.push(Vec::new());
                state_slots.insert(record.state.as_str(), slot);
                slot
            }
        };
        let value = record.deaths as f64;
        samples.push((value, slot));
        state_values[slot].push(value);
    }

    let bins = bin_samples(&samples, states.len(), DISTRIBUTION_BINS);
    // Every slot holds at least the sample that created it, so the
    // summaries stay parallel to `states`.
    let summaries = state_values
        .iter()
        .filter_map(|values| box_summary(values))
        .collect();

    ChartSpec::Histogram {
        title: "Distribution of Death Counts",
        x_label: "Number of Deaths",
        y_label: "Count",
        states,
        bins,
        summaries,
    }
}

// ---------------------------------------------------------------------------
// Distribution helpers
// ---------------------------------------------------------------------------

/// Split the samples into `bin_count` equal-width bins over their
/// span, keeping one count per state layer in each bin. A degenerate
/// span (all values equal) still gets unit-width bins so every value
/// lands somewhere.
fn bin_samples(samples: &[(f64, usize)], layers: usize, bin_count: usize) -> Vec<HistogramBin> {
    if samples.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let min = samples.iter().map(|&(v, _)| v).fold(f64::INFINITY, f64::min);
    let max = samples
        .iter()
        .map(|&(v, _)| v)
        .fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min {
        (max - min) / bin_count as f64
    } else {
        1.0
    };

    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            counts: vec![0; layers],
        })
        .collect();

    for &(value, layer) in samples {
        // The maximum would index one past the end; clamp it into the
        // last bin.
        let slot = (((value - min) / width) as usize).min(bin_count - 1);
        bins[slot].counts[layer] += 1;
    }

    bins
}

/// Five-number summary of `values`, or `None` when empty.
fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();

    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let q1 = sorted[n / 4];
    let q3 = sorted[(3 * n / 4).min(n - 1)];

    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let min = sorted
        .iter()
        .copied()
        .find(|&v| v >= lower_fence)
        .unwrap_or(q1);
    let max = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= upper_fence)
        .unwrap_or(q3);

    Some(BoxSummary {
        min,
        q1,
        median,
        q3,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, Selection};
    use crate::data::model::Record;

    fn record(year: i32, state: &str, cause: &str, deaths: u64) -> Record {
        Record {
            year,
            state: state.to_string(),
            cause: cause.to_string(),
            deaths,
        }
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            record(1999, "OH", "Opioid", 10),
            record(1999, "OH", "Heroin", 5),
            record(2000, "CA", "Opioid", 7),
            record(2000, "OH", "Cocaine", 3),
        ])
    }

    fn all_indices(dataset: &Dataset) -> Vec<usize> {
        filtered_indices(dataset, &Selection::default())
    }

    #[test]
    fn trend_chart_points_follow_yearly_totals() {
        let dataset = sample();
        let chart = trend_chart(&dataset, &all_indices(&dataset));

        match chart {
            ChartSpec::Line { points, .. } => {
                assert_eq!(points, vec![[1999.0, 15.0], [2000.0, 10.0]]);
            }
            other => panic!("expected a line chart, got {other:?}"),
        }
    }

    #[test]
    fn state_chart_keeps_first_seen_order() {
        let dataset = sample();
        let chart = state_chart(&dataset, &all_indices(&dataset));

        match chart {
            ChartSpec::Bar {
                categories, values, ..
            } => {
                assert_eq!(categories, vec!["OH".to_string(), "CA".to_string()]);
                assert_eq!(values, vec![18, 7]);
            }
            other => panic!("expected a bar chart, got {other:?}"),
        }
    }

    #[test]
    fn cause_chart_groups_by_state_over_a_shared_cause_axis() {
        let dataset = sample();
        let colors = StateColors::new(&dataset.states);
        let chart = cause_chart(&dataset, &all_indices(&dataset), &colors);

        match chart {
            ChartSpec::Scatter {
                categories, groups, ..
            } => {
                assert_eq!(
                    categories,
                    vec![
                        "Opioid".to_string(),
                        "Heroin".to_string(),
                        "Cocaine".to_string()
                    ]
                );
                assert_eq!(groups.len(), 2);
                assert_eq!(groups[0].state, "OH");
                assert_eq!(
                    groups[0].points,
                    vec![[0.0, 10.0], [1.0, 5.0], [2.0, 3.0]]
                );
                assert_eq!(groups[1].state, "CA");
                assert_eq!(groups[1].points, vec![[0.0, 7.0]]);
                assert_ne!(groups[0].color, groups[1].color);
            }
            other => panic!("expected a scatter chart, got {other:?}"),
        }
    }

    #[test]
    fn histogram_layers_account_for_every_visible_record() {
        let dataset = sample();
        let colors = StateColors::new(&dataset.states);
        let indices = all_indices(&dataset);
        let chart = distribution_chart(&dataset, &indices, &colors);

        match chart {
            ChartSpec::Histogram {
                states,
                bins,
                summaries,
                ..
            } => {
                assert_eq!(bins.len(), DISTRIBUTION_BINS);
                assert_eq!(states.len(), 2);
                assert_eq!(states[0].0, "OH");

                let total: u64 = bins.iter().map(HistogramBin::total).sum();
                assert_eq!(total as usize, indices.len());

                // Per-layer totals match each state's record count.
                let oh: u64 = bins.iter().map(|b| b.counts[0]).sum();
                let ca: u64 = bins.iter().map(|b| b.counts[1]).sum();
                assert_eq!(oh, 3);
                assert_eq!(ca, 1);

                // One summary per state layer, CA's single record
                // collapsing to a flat box.
                assert_eq!(summaries.len(), 2);
                assert_eq!(summaries[1].min, summaries[1].max);
            }
            other => panic!("expected a histogram, got {other:?}"),
        }
    }

    #[test]
    fn identical_values_all_land_in_the_first_bin() {
        let samples = vec![(4.0, 0), (4.0, 0), (4.0, 0)];
        let bins = bin_samples(&samples, 1, DISTRIBUTION_BINS);
        assert_eq!(bins[0].counts[0], 3);
        assert!(bins[1..].iter().all(|b| b.total() == 0));
    }

    #[test]
    fn box_summary_of_one_through_nine() {
        let values: Vec<f64> = (1..=9).map(f64::from).collect();
        let summary = box_summary(&values).unwrap();

        assert_eq!(summary.q1, 3.0);
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.q3, 7.0);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 9.0);
    }

    #[test]
    fn box_whiskers_exclude_outliers() {
        let mut values: Vec<f64> = (1..=9).map(f64::from).collect();
        values.push(100.0);
        let summary = box_summary(&values).unwrap();

        // 100 sits far beyond the upper fence, so the whisker stops at
        // the largest inlier.
        assert!(summary.max < 100.0);
    }

    #[test]
    fn empty_view_yields_empty_charts() {
        let dataset = sample();
        let none: Vec<usize> = Vec::new();
        let colors = StateColors::new(&dataset.states);

        assert!(trend_chart(&dataset, &none).is_empty());
        assert!(state_chart(&dataset, &none).is_empty());
        assert!(cause_chart(&dataset, &none, &colors).is_empty());
        assert!(distribution_chart(&dataset, &none, &colors).is_empty());
    }
}
