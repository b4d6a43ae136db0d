mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use std::path::Path;

use app::DashboardApp;
use config::{CONFIG_FILE, DashboardConfig};
use data::boundary::BoundaryFetch;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load(Path::new(CONFIG_FILE));

    let boundaries = match config.boundary_source() {
        Some(source) => BoundaryFetch::spawn(source),
        None => BoundaryFetch::disabled(),
    };

    // The dataset is loaded once here and only read afterwards.
    let mut state = AppState::new(&config, boundaries);
    ui::panels::load_into(&mut state, &config.data_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SF Airbnb Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
}
