use std::path::Path;

use eframe::egui;

use crate::state::{AppState, Page};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

/// Dataset loaded at startup; the sample generator writes it.
pub const DEFAULT_DATA_PATH: &str = "data/drug_overdose_deaths.csv";

pub struct OverdoseViewerApp {
    pub state: AppState,
}

impl Default for OverdoseViewerApp {
    fn default() -> Self {
        let mut state = AppState::default();
        // The bundled dataset may be absent; the session then starts
        // degraded and a file can still be opened manually.
        state.load_dataset(Path::new(DEFAULT_DATA_PATH));
        Self { state }
    }
}

impl eframe::App for OverdoseViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation and filters ----
        egui::SidePanel::left("nav_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active page ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::Home => panels::home_page(ui),
            Page::Visualizations => plot::charts_page(ui, &self.state),
        });
    }
}
