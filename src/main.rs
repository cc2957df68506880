mod app;
mod color;
mod config;
mod data;
mod refresh;
mod state;
mod ui;

use app::DashboardApp;
use clap::Parser;
use config::{Args, DashboardConfig};
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = DashboardConfig::from_args(&args)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "MPG Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(&config)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
