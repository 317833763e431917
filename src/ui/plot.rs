use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points};

use crate::data::stats::{GroupStat, TRAILING_WINDOW, weekday_name};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 240.0;

/// Axis labels for charts whose x values are category indices.
fn category_formatter(
    names: Vec<String>,
) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        names.get(idx as usize).cloned().unwrap_or_default()
    }
}

fn timestamp_formatter(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    DateTime::<Utc>::from_timestamp(mark.value as i64, 0)
        .map(|dt| dt.format("%d %b %H:%M").to_string())
        .unwrap_or_default()
}

fn chart<'a>(id: &'a str) -> Plot<'a> {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .allow_drag(false)
        .allow_zoom(false)
}

// ---------------------------------------------------------------------------
// Detailed analysis (full dataset)
// ---------------------------------------------------------------------------

/// Bar chart for one group-by statistic. Groups without a value are drawn as
/// empty slots so the category axis stays complete.
fn group_bars(ui: &mut Ui, id: &str, title: &str, groups: &[GroupStat], colors: impl Fn(&str) -> Color32) {
    ui.strong(title);
    if groups.is_empty() {
        ui.label("No data.");
        return;
    }

    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| {
            let value = g.value?;
            Some(Bar::new(i as f64, value).name(&g.key).fill(colors(&g.key)))
        })
        .collect();
    let names = groups.iter().map(|g| g.key.clone()).collect();

    chart(id)
        .x_axis_formatter(category_formatter(names))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.7));
        });
}

pub fn insights(ui: &mut Ui, state: &AppState) {
    let insights = &state.insights;

    group_bars(
        ui,
        "avg_by_brand",
        "Average Fuel Price by Brand",
        &insights.by_brand,
        |brand| state.brand_colors.color_for(brand),
    );
    ui.add_space(8.0);

    group_bars(
        ui,
        "volatility_by_suburb",
        "Fuel Price Volatility by Suburb",
        &insights.volatility_by_suburb,
        |_| Color32::LIGHT_BLUE,
    );
    let undefined = insights
        .volatility_by_suburb
        .iter()
        .filter(|g| g.value.is_none())
        .count();
    if undefined > 0 {
        ui.label(
            RichText::new(format!("{undefined} suburbs have a single price update and no volatility."))
                .small(),
        );
    }
    ui.add_space(8.0);

    // ---- Weekday line with gaps for missing days ----
    ui.strong("Average Fuel Price by Weekday");
    let names = insights
        .by_weekday
        .iter()
        .map(|w| weekday_name(w.weekday).to_string())
        .collect();
    chart("avg_by_weekday")
        .x_axis_formatter(category_formatter(names))
        .show(ui, |plot_ui| {
            let mut segment: Vec<[f64; 2]> = Vec::new();
            for (i, w) in insights.by_weekday.iter().enumerate() {
                match w.mean {
                    Some(mean) => segment.push([i as f64, mean]),
                    None if !segment.is_empty() => {
                        let pts = std::mem::take(&mut segment);
                        plot_ui.line(Line::new(PlotPoints::from(pts)).width(2.0));
                    }
                    None => {}
                }
            }
            if !segment.is_empty() {
                plot_ui.line(Line::new(PlotPoints::from(segment)).width(2.0));
            }
            let markers: PlotPoints = insights
                .by_weekday
                .iter()
                .enumerate()
                .filter_map(|(i, w)| w.mean.map(|m| [i as f64, m]))
                .collect();
            plot_ui.points(Points::new(markers).radius(3.0));
        });
    ui.add_space(8.0);

    // ---- Histogram ----
    ui.strong("Distribution of Fuel Prices");
    match &insights.histogram {
        Some(hist) => {
            let width = hist.bin_width();
            let bars: Vec<Bar> = hist
                .edges
                .windows(2)
                .zip(&hist.counts)
                .map(|(edge, &count)| Bar::new((edge[0] + edge[1]) / 2.0, count as f64).width(width))
                .collect();
            chart("price_histogram").show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(0x18, 0x9a, 0xd3)));
            });
        }
        None => {
            ui.label("No data.");
        }
    }
}

// ---------------------------------------------------------------------------
// Trend panel
// ---------------------------------------------------------------------------

pub fn trend(ui: &mut Ui, state: &mut AppState) {
    ui.label("Fuel Price Trends Over Time");

    let current = state.trend_fuel.clone().unwrap_or_default();
    let options = state.dataset.fuel_codes.clone();
    egui::ComboBox::from_id_salt("trend_fuel")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for fuel in options {
                if ui.selectable_label(current == fuel, &fuel).clicked() {
                    state.set_trend_fuel(fuel);
                }
            }
        });

    let Some(average) = state.trend_average else {
        ui.label("No trend data available for selected fuel type in the chosen suburbs.");
        return;
    };

    let suburbs: Vec<&str> = state.criteria.suburbs.iter().map(String::as_str).collect();
    ui.label(
        RichText::new(format!(
            "The current price of {current} at {} is: {average:.2}",
            suburbs.join(", ")
        ))
        .size(20.0),
    );

    let points: Vec<[f64; 2]> = state
        .trend
        .iter()
        .map(|p| [p.at.and_utc().timestamp() as f64, p.mean_price])
        .collect();
    chart("price_trend")
        .x_axis_formatter(timestamp_formatter)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(points.clone())).width(2.0).name(&current));
            plot_ui.points(Points::new(PlotPoints::from(points)).radius(3.0));
        });

    gauge(ui, state, average);
}

/// Where the trailing average sits between the cheapest and dearest price
/// in the dataset.
fn gauge(ui: &mut Ui, state: &AppState, average: f64) {
    let Some((lo, hi)) = state.dataset.price_bounds else {
        return;
    };
    let fraction = if hi > lo {
        ((average - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    ui.strong(format!("Average Price (last {TRAILING_WINDOW} updates)"));
    ui.add(
        egui::ProgressBar::new(fraction as f32)
            .text(format!("{average:.2}  (range {lo:.1} to {hi:.1})")),
    );
}
