use std::sync::Arc;

use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::model::FuelDataset;
use crate::geocode::Geocoder;
use crate::state::AppState;
use crate::ui::{map, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FuelAnalyzerApp {
    pub state: AppState,
    geocoder: Box<dyn Geocoder>,
}

impl FuelAnalyzerApp {
    pub fn new(dataset: Arc<FuelDataset>, geocoder: Box<dyn Geocoder>) -> Self {
        Self {
            state: AppState::new(dataset),
            geocoder,
        }
    }
}

impl eframe::App for FuelAnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: fuel descriptions ----
        egui::SidePanel::right("info_panel")
            .default_width(180.0)
            .show(ctx, |ui| {
                panels::info_panel(ui);
            });

        // ---- Central panel: table, insights, map, trend ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    table::price_table(ui, &self.state);
                    ui.separator();

                    egui::CollapsingHeader::new(RichText::new("Detailed Fuel Price Analysis").strong())
                        .default_open(false)
                        .show(ui, |ui: &mut Ui| {
                            plot::insights(ui, &self.state);
                        });

                    map::station_map(ui, &mut self.state, self.geocoder.as_ref());
                    ui.separator();

                    egui::CollapsingHeader::new(RichText::new("View Fuel Price Trends").strong())
                        .default_open(true)
                        .show(ui, |ui: &mut Ui| {
                            plot::trend(ui, &mut self.state);
                        });
                });
        });
    }
}
