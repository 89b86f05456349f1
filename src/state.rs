use std::path::Path;
use std::sync::Arc;

use crate::charts::{self, ChartSpec};
use crate::color::StateColors;
use crate::data::filter::{filtered_indices, Selection};
use crate::data::loader::{DataStore, LoadReport};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which page the side-panel navigation has selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Visualizations,
}

/// The four charts rebuilt together on every filter change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub trend: ChartSpec,
    pub by_state: ChartSpec,
    pub causes: ChartSpec,
    pub distribution: ChartSpec,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loader with its per-path cache.
    pub store: DataStore,

    /// Loaded dataset plus load diagnostics (None until a file loads).
    pub report: Option<Arc<LoadReport>>,

    /// Set when the last load failed the schema check; blocks the
    /// charts page until a conforming file is loaded.
    pub schema_error: Option<String>,

    /// Current page selection.
    pub page: Page,

    /// Active year / state / cause filters.
    pub selection: Selection,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Charts prepared from the visible records.
    pub charts: Option<ChartSet>,

    /// Stable state → colour assignment for the scatter chart.
    pub state_colors: StateColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            store: DataStore::new(),
            report: None,
            schema_error: None,
            page: Page::default(),
            selection: Selection::default(),
            visible_indices: Vec::new(),
            charts: None,
            state_colors: StateColors::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Load a dataset file and ingest it. A schema failure tears the
    /// session down to the degraded state; any other failure leaves
    /// the previous dataset in place and reports the error.
    pub fn load_dataset(&mut self, path: &Path) {
        match self.store.load(path) {
            Ok(report) => self.set_report(report),
            Err(err) if err.is_schema_failure() => {
                log::error!("schema check failed for {}: {err}", path.display());
                self.report = None;
                self.charts = None;
                self.visible_indices = Vec::new();
                self.schema_error = Some(err.to_string());
                self.status_message = None;
            }
            Err(err) => {
                log::error!("failed to load {}: {err}", path.display());
                self.status_message = Some(err.to_string());
            }
        }
    }

    /// Ingest a freshly loaded dataset: reset filters, rebuild the
    /// colour assignment, and prepare the charts.
    pub fn set_report(&mut self, report: Arc<LoadReport>) {
        self.state_colors = StateColors::new(&report.dataset.states);
        self.selection = Selection::default();
        self.schema_error = None;
        self.status_message = None;
        self.report = Some(report);
        self.refilter();
    }

    /// The loaded dataset, if any.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.report.as_deref().map(|report| &report.dataset)
    }

    /// Recompute `visible_indices` and the charts after a filter
    /// change.
    pub fn refilter(&mut self) {
        let Some(report) = self.report.clone() else {
            self.visible_indices = Vec::new();
            self.charts = None;
            return;
        };
        let dataset = &report.dataset;

        self.visible_indices = filtered_indices(dataset, &self.selection);
        self.charts = Some(ChartSet {
            trend: charts::trend_chart(dataset, &self.visible_indices),
            by_state: charts::state_chart(dataset, &self.visible_indices),
            causes: charts::cause_chart(dataset, &self.visible_indices, &self.state_colors),
            distribution: charts::distribution_chart(
                dataset,
                &self.visible_indices,
                &self.state_colors,
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Selector;

    const SAMPLE_CSV: &str = "\
Report Date,State,Cause of Death Description,Drug Overdose Death Count
01/01/1999 12:00:00 AM,OH,Opioid,10
01/01/1999 12:00:00 AM,OH,Heroin,5
01/01/2000 12:00:00 AM,CA,Opioid,7
";

    fn load_sample(state: &mut AppState) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deaths.csv");
        std::fs::write(&path, SAMPLE_CSV).unwrap();
        state.load_dataset(&path);
        dir
    }

    #[test]
    fn loading_resets_filters_and_prepares_charts() {
        let mut state = AppState::default();
        let _dir = load_sample(&mut state);

        assert!(state.schema_error.is_none());
        assert!(state.status_message.is_none());
        assert_eq!(state.selection, Selection::default());
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert!(state.charts.is_some());
    }

    #[test]
    fn refilter_narrows_the_view_and_rebuilds_charts() {
        let mut state = AppState::default();
        let _dir = load_sample(&mut state);

        state.selection.state = Selector::Only("CA".to_string());
        state.refilter();

        assert_eq!(state.visible_indices, vec![2]);
        let charts = state.charts.as_ref().unwrap();
        match &charts.trend {
            ChartSpec::Line { points, .. } => assert_eq!(points, &vec![[2000.0, 7.0]]),
            other => panic!("expected a line chart, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_reports_but_keeps_the_session() {
        let mut state = AppState::default();
        let _dir = load_sample(&mut state);

        state.load_dataset(Path::new("/no/such/deaths.csv"));

        assert!(state.status_message.is_some());
        assert!(state.report.is_some());
        assert!(state.schema_error.is_none());
    }

    #[test]
    fn schema_failure_tears_the_session_down() {
        let mut state = AppState::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deaths.csv");
        std::fs::write(&path, "State,Count\nOH,1\n").unwrap();

        state.load_dataset(&path);

        assert!(state.report.is_none());
        assert!(state.charts.is_none());
        let message = state.schema_error.unwrap();
        assert!(message.contains("missing the required columns"));
    }
}
