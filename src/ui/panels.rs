use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, Ui};

use crate::refresh::{DashboardEvent, YearChoice};
use crate::state::AppState;

/// What the user asked for in the top bar this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    Open(PathBuf),
    Dashboard(DashboardEvent),
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar: file menu, year selector, reset button and
/// status line.
pub fn top_bar(ui: &mut Ui, state: &AppState) -> Option<PanelAction> {
    let mut action = None;

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                action = pick_file().map(PanelAction::Open);
                ui.close_menu();
            }
        });

        ui.separator();

        let Some(store) = &state.store else {
            if state.loading {
                ui.spinner();
                ui.label("Loading…");
            } else {
                ui.label("No dataset loaded.");
            }
            show_status(ui, state);
            return;
        };

        // ---- Year selector ----
        let current = state.year_choice();
        ui.label("Model Year");
        egui::ComboBox::from_id_salt("year_selector")
            .selected_text(year_label(current))
            .show_ui(ui, |ui: &mut Ui| {
                let choices = std::iter::once(YearChoice::All)
                    .chain(store.model_years().into_iter().map(YearChoice::Year));
                for choice in choices {
                    if ui
                        .selectable_label(current == choice, year_label(choice))
                        .clicked()
                        && current != choice
                    {
                        action = Some(PanelAction::Dashboard(DashboardEvent::YearChanged(choice)));
                    }
                }
            });

        if state.reset_visible() && ui.button("Reset").clicked() {
            action = Some(PanelAction::Dashboard(DashboardEvent::ResetClicked));
        }

        ui.separator();

        let visible = state.refresh().map(|r| r.detail.len()).unwrap_or(0);
        let source = state.source_name.as_deref().unwrap_or("dataset");
        ui.label(format!(
            "{source}: {} cars, {visible} shown ({})",
            store.len(),
            state.predicate()
        ));

        if state.loading {
            ui.spinner();
        }
        show_status(ui, state);
    });

    action
}

fn show_status(ui: &mut Ui, state: &AppState) {
    if let Some(msg) = &state.status_message {
        ui.separator();
        ui.label(RichText::new(msg).color(Color32::RED));
    }
}

fn year_label(choice: YearChoice) -> String {
    match choice {
        YearChoice::All => "All".to_string(),
        YearChoice::Year(y) => y.to_string(),
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

fn pick_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open vehicle data")
        .add_filter("Supported files", &["csv", "tsv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}
