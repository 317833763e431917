use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Plot, PlotPoint, Points, Text};

use crate::geocode::{Geocoder, MapReport};
use crate::state::AppState;

/// "Show Map" button plus the markers from the last press.
pub fn station_map(ui: &mut Ui, state: &mut AppState, geocoder: &dyn Geocoder) {
    if ui.button("Show Map").clicked() {
        state.show_map(geocoder);
    }

    let Some(report) = &state.map else {
        return;
    };

    for warning in &report.warnings {
        ui.label(RichText::new(warning).color(Color32::RED));
    }
    if report.markers.is_empty() {
        ui.label("No station locations to show.");
        return;
    }

    marker_plot(ui, report);
}

fn marker_plot(ui: &mut Ui, report: &MapReport) {
    for marker in &report.markers {
        ui.label(format!(
            "Location of Fuelstation with postcode {}: {:.4}, {:.4}",
            marker.postcode, marker.position.latitude, marker.position.longitude
        ));
    }

    Plot::new("station_map")
        .height(360.0)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let points: Vec<[f64; 2]> = report
                .markers
                .iter()
                .map(|m| [m.position.longitude, m.position.latitude])
                .collect();
            plot_ui.points(
                Points::new(points)
                    .radius(6.0)
                    .color(Color32::from_rgb(0xd3, 0x2f, 0x2f))
                    .name("Stations"),
            );
            for m in &report.markers {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(m.position.longitude, m.position.latitude + 0.004),
                        format!("Postcode: {}", m.postcode),
                    )
                    .color(Color32::WHITE),
                );
            }
        });
}
