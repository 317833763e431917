use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::default_date_range;
use crate::data::sort::SortKey;
use crate::state::{AppState, Dimension};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter options");
    ui.separator();

    let dataset = state.dataset.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Multi-selects (collapsible) ----
            for dim in Dimension::ALL {
                let options = dim.options(&dataset);
                let n_selected = dim.selection(&state.criteria).len();
                let header_text = if n_selected == 0 {
                    format!("{}  (all)", dim.label())
                } else {
                    format!("{}  ({n_selected}/{})", dim.label(), options.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(dim == Dimension::Suburb || dim == Dimension::Fuel)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("Clear").clicked() {
                            state.clear_filter(dim);
                        }

                        ScrollArea::vertical()
                            .id_salt(dim.label())
                            .max_height(180.0)
                            .show(ui, |ui: &mut Ui| {
                                for value in options {
                                    let mut checked = dim.selection(&state.criteria).contains(value);
                                    let mut text = RichText::new(value);
                                    if dim == Dimension::Brand {
                                        text = text.color(state.brand_colors.color_for(value));
                                    }
                                    if ui.checkbox(&mut checked, text).changed() {
                                        state.toggle_filter_value(dim, value);
                                    }
                                }
                            });
                    });
            }
            ui.separator();

            // ---- Date range ----
            ui.strong("Select Date Range");
            if let Some((mut start, mut end)) = state.criteria.date_range.or_else(default_date_range) {
                let mut changed = false;
                ui.horizontal(|ui: &mut Ui| {
                    changed |= ui
                        .add(DatePickerButton::new(&mut start).id_salt("date_start"))
                        .changed();
                    ui.label("to");
                    changed |= ui
                        .add(DatePickerButton::new(&mut end).id_salt("date_end"))
                        .changed();
                });
                if changed {
                    state.set_date_range(start, end);
                }
            }
            ui.separator();

            // ---- Sort order ----
            ui.strong("Sort by");
            egui::ComboBox::from_id_salt("sort_by")
                .selected_text(state.sort_key.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for key in SortKey::ALL {
                        if ui.selectable_label(state.sort_key == key, key.label()).clicked() {
                            state.set_sort_key(key);
                        }
                    }
                });
            ui.separator();

            // ---- Price range ----
            if let Some((lo, hi)) = dataset.price_bounds {
                ui.strong("Select Price Range");
                let (mut min, mut max) = state.criteria.price_range.unwrap_or((lo, hi));
                let mut changed = ui
                    .add(egui::Slider::new(&mut min, lo..=hi).text("min"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut max, lo..=hi).text("max"))
                    .changed();
                if changed {
                    state.set_price_range(min, max);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Right side panel – fuel descriptions
// ---------------------------------------------------------------------------

const FUEL_INFO: &[(&str, &[&str], Color32)] = &[
    (
        "E10 (E85 / U91)",
        &[
            "Blend of ethanol and regular unleaded petrol.",
            "Suitable for vehicles designed for E10.",
        ],
        Color32::from_rgb(0x29, 0x80, 0xb9),
    ),
    (
        "Premium Unleaded (P95 / P98 / PDL)",
        &[
            "Higher octane fuel, better for high-performance engines.",
            "Improves engine efficiency and performance.",
        ],
        Color32::from_rgb(0x27, 0xae, 0x60),
    ),
    (
        "Diesel (DL)",
        &["Used in diesel engines, more efficient over long distances."],
        Color32::from_rgb(0xf3, 0x9c, 0x12),
    ),
    (
        "LPG (Liquefied Petroleum Gas)",
        &["A mixture of propane and butane, a cheaper alternative to petrol."],
        Color32::from_rgb(0x8e, 0x44, 0xad),
    ),
];

pub fn info_panel(ui: &mut Ui) {
    ui.heading("Fuel Types Info");
    ui.separator();
    for (title, lines, color) in FUEL_INFO {
        ui.label(RichText::new(*title).strong().color(*color));
        for line in *lines {
            ui.label(RichText::new(format!("- {line}")).small().color(*color));
        }
        ui.add_space(6.0);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export CSV…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(RichText::new("NSW Fuel Price Analyzer ⛽").strong());
        ui.separator();

        ui.label(format!(
            "{} price updates loaded, {} visible",
            state.dataset.len(),
            state.visible_rows.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered fuel prices")
        .add_filter("CSV", &["csv"])
        .set_file_name("fuel_prices.csv")
        .save_file();

    if let Some(path) = file {
        match state.export_csv(&path) {
            Ok(_) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
