use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::Selector;
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: page navigation, then the filter combos
/// when the charts page is active.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.separator();
    ui.selectable_value(&mut state.page, Page::Home, "Home");
    ui.selectable_value(&mut state.page, Page::Visualizations, "Visualizations");

    if state.page != Page::Visualizations {
        return;
    }

    ui.add_space(8.0);
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset() else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone the domains so we can mutate the selection inside the
    // combo closures.
    let years = dataset.years.clone();
    let state_names = dataset.states.clone();
    let causes = dataset.causes.clone();

    let mut changed = false;

    ui.strong("Select Year");
    let year_text = match &state.selection.year {
        Selector::All => "All".to_string(),
        Selector::Only(year) => year.to_string(),
    };
    egui::ComboBox::from_id_salt("year_filter")
        .selected_text(year_text)
        .show_ui(ui, |ui: &mut Ui| {
            if ui
                .selectable_label(state.selection.year.is_all(), "All")
                .clicked()
            {
                state.selection.year = Selector::All;
                changed = true;
            }
            for &year in &years {
                let active = state.selection.year == Selector::Only(year);
                if ui.selectable_label(active, year.to_string()).clicked() {
                    state.selection.year = Selector::Only(year);
                    changed = true;
                }
            }
        });

    ui.add_space(4.0);
    ui.strong("Select State");
    changed |= value_combo(ui, "state_filter", &mut state.selection.state, &state_names);

    ui.add_space(4.0);
    ui.strong("Select Cause of Death");
    changed |= value_combo(ui, "cause_filter", &mut state.selection.cause, &causes);

    if changed {
        state.refilter();
    }
}

/// One combo box over `All` plus a column's distinct values.
fn value_combo(ui: &mut Ui, id: &str, selector: &mut Selector<String>, values: &[String]) -> bool {
    let mut changed = false;
    let current = match selector {
        Selector::All => "All".to_string(),
        Selector::Only(value) => value.clone(),
    };

    egui::ComboBox::from_id_salt(id)
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(selector.is_all(), "All").clicked() {
                *selector = Selector::All;
                changed = true;
            }
            for value in values {
                let active = matches!(&selector, Selector::Only(v) if v == value);
                if ui.selectable_label(active, value).clicked() {
                    *selector = Selector::Only(value.clone());
                    changed = true;
                }
            }
        });

    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(report) = &state.report {
            ui.label(format!(
                "{} records loaded, {} visible",
                report.dataset.len(),
                state.visible_indices.len()
            ));
            if report.skipped_rows > 0 {
                ui.label(
                    RichText::new(format!("{} malformed rows skipped", report.skipped_rows))
                        .color(Color32::YELLOW),
                );
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Home page
// ---------------------------------------------------------------------------

/// Render the Home page in the central panel.
pub fn home_page(ui: &mut Ui) {
    ui.heading("Welcome to the Drug Overdose Deaths Analysis App!");
    ui.add_space(8.0);
    ui.label(
        "This app provides insights into drug overdose deaths in the United States \
         from 1999 to 2018.",
    );

    ui.add_space(8.0);
    ui.strong("Features:");
    ui.label("• Explore trends over the years for different states.");
    ui.label("• Visualize deaths by drug type and demographics.");
    ui.label("• Analyze state-wise comparisons and trends.");

    ui.add_space(8.0);
    ui.strong("Data Source:");
    ui.label("The data used in this app is publicly available from the CDC Wonder Database.");

    ui.add_space(8.0);
    ui.strong("How to Use:");
    ui.label("Navigate to the Visualizations page to explore interactive charts.");
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open overdose data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_dataset(&path);
    }
}
