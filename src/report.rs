use std::fmt::Write;

use crate::data::stats::{TRAILING_WINDOW, weekday_name};
use crate::state::AppState;

/// Rows listed in the "Current Selection" section.
const TABLE_PREVIEW: usize = 10;

fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}

fn fmt_set(values: &std::collections::BTreeSet<String>) -> String {
    if values.is_empty() {
        "all".to_string()
    } else {
        values.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Markdown rendition of the dashboard for `--summary`.
pub fn build_summary(state: &AppState) -> String {
    let ds = &state.dataset;
    let c = &state.criteria;
    let mut output = String::new();

    let _ = writeln!(output, "# NSW Fuel Price Summary");
    let _ = writeln!(
        output,
        "{} price updates, {} suburbs, {} brands, {} fuel types",
        ds.len(),
        ds.suburbs.len(),
        ds.brands.len(),
        ds.fuel_codes.len()
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Current Selection");
    let _ = writeln!(
        output,
        "Suburbs: {}; postcodes: {}; brands: {}; fuel: {}",
        fmt_set(&c.suburbs),
        fmt_set(&c.postcodes),
        fmt_set(&c.brands),
        fmt_set(&c.fuel_codes)
    );
    if let Some((start, end)) = c.date_range {
        let _ = writeln!(output, "Fuel prices from {start} to {end} ({}):", state.sort_key);
    }
    if state.visible_rows.is_empty() {
        let _ = writeln!(output, "No fuel prices match the selected filters.");
    } else {
        for rec in ds.rows(&state.visible_rows).take(TABLE_PREVIEW) {
            let _ = writeln!(
                output,
                "- {} {} at {}, {} {}: {:.1} ({})",
                rec.brand,
                rec.fuel_code,
                rec.address,
                rec.suburb,
                rec.postcode,
                rec.price,
                rec.price_updated_at
            );
        }
        if state.visible_rows.len() > TABLE_PREVIEW {
            let _ = writeln!(
                output,
                "... and {} more",
                state.visible_rows.len() - TABLE_PREVIEW
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Average Fuel Price by Brand");
    if state.insights.by_brand.is_empty() {
        let _ = writeln!(output, "No data.");
    }
    for g in &state.insights.by_brand {
        let _ = writeln!(output, "- {}: {} ({} updates)", g.key, fmt_value(g.value), g.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Fuel Price Volatility by Suburb");
    if state.insights.volatility_by_suburb.is_empty() {
        let _ = writeln!(output, "No data.");
    }
    for g in &state.insights.volatility_by_suburb {
        let _ = writeln!(output, "- {}: {}", g.key, fmt_value(g.value));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Average Fuel Price by Weekday");
    for w in &state.insights.by_weekday {
        let _ = writeln!(output, "- {}: {}", weekday_name(w.weekday), fmt_value(w.mean));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Distribution of Fuel Prices");
    match &state.insights.histogram {
        Some(hist) => {
            for (edge, count) in hist.edges.windows(2).zip(&hist.counts) {
                if *count > 0 {
                    let _ = writeln!(output, "- {:.1} to {:.1}: {}", edge[0], edge[1], count);
                }
            }
        }
        None => {
            let _ = writeln!(output, "No data.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Fuel Price Trend");
    match (&state.trend_fuel, state.trend_average) {
        (Some(fuel), Some(avg)) => {
            let _ = writeln!(
                output,
                "Average price of {fuel} at {} over the last {} updates: {avg:.2}",
                fmt_set(&c.suburbs),
                state.trend.len().min(TRAILING_WINDOW)
            );
        }
        _ => {
            let _ = writeln!(
                output,
                "No trend data available for selected fuel type in the chosen suburbs."
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::model::FuelDataset;
    use crate::data::model::fixtures::{at, record};

    #[test]
    fn summary_covers_every_section() {
        let ds = FuelDataset::from_records(vec![
            record("Ampol", "E10", "Lidcombe", "2141", 185.9, at(2024, 1, 1, 8)),
            record("BP", "E10", "Lidcombe", "2141", 189.9, at(2024, 1, 3, 8)),
            record("BP", "DL", "Auburn", "2144", 199.9, at(2024, 1, 3, 8)),
        ]);
        let state = AppState::new(Arc::new(ds));
        let text = build_summary(&state);

        assert!(text.contains("3 price updates, 2 suburbs, 2 brands, 2 fuel types"));
        assert!(text.contains("Suburbs: Lidcombe;"));
        assert!(text.contains("- BP E10 at"));
        assert!(text.contains("- Ampol: 185.90 (1 updates)"));
        assert!(text.contains("- Auburn: n/a"));
        assert!(text.contains("- Monday: 185.90"));
        assert!(text.contains("- Tuesday: n/a"));
        assert!(text.contains("over the last 2 updates: 187.90"));
    }

    #[test]
    fn empty_dataset_reports_no_data() {
        let state = AppState::new(Arc::new(FuelDataset::default()));
        let text = build_summary(&state);
        assert!(text.contains("No fuel prices match the selected filters."));
        assert!(text.contains("No trend data available"));
    }
}
