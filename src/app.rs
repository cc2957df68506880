use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::anyhow;
use eframe::egui;

use crate::config::DashboardConfig;
use crate::data::loader;
use crate::data::model::{NumericPolicy, RecordStore};
use crate::state::{AppState, LoadTicket};
use crate::ui::charts;
use crate::ui::panels::{self, PanelAction};

/// A load running on a worker thread. The ticket and name stay on the UI
/// side so a worker that dies without answering can still be reported.
struct PendingLoad {
    ticket: LoadTicket,
    source_name: String,
    rx: Receiver<anyhow::Result<RecordStore>>,
}

/// Hand finished loads to the state; it drops the stale ones.
fn drain_loads(loads: &mut Vec<PendingLoad>, state: &mut AppState) {
    loads.retain(|load| match load.rx.try_recv() {
        Ok(result) => {
            state.finish_load(load.ticket, &load.source_name, result);
            false
        }
        Err(TryRecvError::Empty) => true,
        Err(TryRecvError::Disconnected) => {
            state.finish_load(
                load.ticket,
                &load.source_name,
                Err(anyhow!("loader stopped unexpectedly")),
            );
            false
        }
    });
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    policy: NumericPolicy,
    loads: Vec<PendingLoad>,
}

impl DashboardApp {
    pub fn new(config: &DashboardConfig) -> Self {
        let mut app = Self {
            state: AppState::default(),
            policy: config.numeric_policy,
            loads: Vec::new(),
        };
        if let Some(path) = &config.data_path {
            app.start_load(path.clone());
        }
        app
    }

    /// Parse `path` on a worker thread; the UI keeps running meanwhile.
    fn start_load(&mut self, path: PathBuf) {
        let ticket = self.state.begin_load();
        let policy = self.policy;
        let (tx, rx) = mpsc::channel();
        log::info!("Loading {}", path.display());

        let source_name = display_name(&path);
        thread::spawn(move || {
            // The receiver is gone only if the app has shut down.
            let _ = tx.send(loader::load_file(&path, policy));
        });
        self.loads.push(PendingLoad {
            ticket,
            source_name,
            rx,
        });
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        drain_loads(&mut self.loads, &mut self.state);
        if !self.loads.is_empty() {
            ctx.request_repaint();
        }

        // ---- Top panel: menu bar, year selector, reset ----
        let action = egui::TopBottomPanel::top("top_bar")
            .show(ctx, |ui| panels::top_bar(ui, &self.state))
            .inner;

        // ---- Central panel: the five charts ----
        let clicked = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let Some(refresh) = self.state.refresh() else {
                    ui.centered_and_justified(|ui| {
                        ui.heading("Open a dataset to start  (File → Open…)");
                    });
                    return None;
                };

                let height = (ui.available_height() / 2.0 - 24.0).max(120.0);
                let mut clicked = None;
                ui.columns(3, |cols| {
                    cols[0].strong(format!("Cars by Origin ({})", refresh.categorical.len()));
                    clicked = charts::pie_chart(&mut cols[0], refresh, height);
                    cols[1].strong("Average MPG by Model Year");
                    charts::line_chart(&mut cols[1], &refresh.series, height);
                    cols[2].strong("Horsepower vs Weight");
                    charts::scatter_chart(&mut cols[2], &refresh.series, height);
                });
                ui.columns(2, |cols| {
                    cols[0].strong("Cars by Cylinders");
                    charts::bar_chart(&mut cols[0], &refresh.series, height);
                    cols[1].strong("Average MPG by Region and Year");
                    charts::heatmap_chart(&mut cols[1], &refresh.series, height);
                });
                clicked
            })
            .inner;

        let event = match action {
            Some(PanelAction::Open(path)) => {
                self.start_load(path);
                None
            }
            Some(PanelAction::Dashboard(event)) => Some(event),
            None => clicked,
        };
        if let Some(event) = event {
            self.state.handle(event);
        }
    }
}
