mod app;
mod color;
mod config;
mod data;
mod error;
mod geocode;
mod report;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use app::FuelAnalyzerApp;
use config::Cli;
use data::loader::DataLoader;
use geocode::NominatimGeocoder;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let loader = DataLoader::new(&cli.data);
    let dataset = match loader.load() {
        Ok(ds) => ds,
        Err(e) => {
            log::error!("Failed to load {}: {e}", loader.path().display());
            return Err(e).with_context(|| format!("loading {}", loader.path().display()));
        }
    };

    if cli.summary {
        let state = state::AppState::new(Arc::clone(&dataset));
        print!("{}", report::build_summary(&state));
        return Ok(());
    }

    let geocoder = NominatimGeocoder::new(&cli.geocoder).context("building geocoding client")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Fuel Price Analyzer",
        options,
        Box::new(move |_cc| Ok(Box::new(FuelAnalyzerApp::new(dataset, Box::new(geocoder))))),
    )
    .map_err(|e| anyhow::anyhow!("dashboard exited with an error: {e}"))
}
