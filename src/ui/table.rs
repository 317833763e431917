use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::REQUIRED_COLUMNS;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// The filtered, sorted price table, or a "no data" notice.
pub fn price_table(ui: &mut Ui, state: &AppState) {
    if let Some((start, end)) = state.criteria.date_range {
        ui.label(format!("Fuel prices from {start} to {end}:"));
    }

    if state.visible_rows.is_empty() {
        ui.label(RichText::new("No fuel prices match the selected filters.").italics());
        return;
    }

    let dataset = &state.dataset;
    let rows = &state.visible_rows;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(320.0)
        .column(Column::auto().at_least(80.0))
        .column(Column::auto())
        .column(Column::initial(220.0).clip(true))
        .columns(Column::auto(), 4)
        .header(22.0, |mut header| {
            for name in REQUIRED_COLUMNS {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let Some(rec) = dataset.records.get(rows[row.index()]) else {
                    return;
                };
                row.col(|ui: &mut Ui| {
                    ui.label(RichText::new(&rec.brand).color(state.brand_colors.color_for(&rec.brand)));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.fuel_code);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.address);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.suburb);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&rec.postcode);
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.1}", rec.price));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(rec.price_updated_at.format("%Y-%m-%d %H:%M").to_string());
                });
            });
        });
}
