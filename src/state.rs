use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::export::write_csv;
use crate::data::filter::{FilterCriteria, filtered_indices};
use crate::data::model::FuelDataset;
use crate::data::sort::{SortKey, sort_indices};
use crate::data::stats::{
    self, GroupStat, HISTOGRAM_BINS, Histogram, TRAILING_WINDOW, TrendPoint, TrendQuery,
    WeekdayStat,
};
use crate::geocode::{Geocoder, MapReport, distinct_postcodes, locate_postcodes};

// ---------------------------------------------------------------------------
// Filter dimensions shown as multi-selects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Suburb,
    Postcode,
    Brand,
    Fuel,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Suburb,
        Dimension::Postcode,
        Dimension::Brand,
        Dimension::Fuel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Suburb => "Suburbs",
            Dimension::Postcode => "Postcodes",
            Dimension::Brand => "Brands",
            Dimension::Fuel => "Fuel Types",
        }
    }

    pub fn options(self, dataset: &FuelDataset) -> &[String] {
        match self {
            Dimension::Suburb => &dataset.suburbs,
            Dimension::Postcode => &dataset.postcodes,
            Dimension::Brand => &dataset.brands,
            Dimension::Fuel => &dataset.fuel_codes,
        }
    }

    pub fn selection(self, criteria: &FilterCriteria) -> &BTreeSet<String> {
        match self {
            Dimension::Suburb => &criteria.suburbs,
            Dimension::Postcode => &criteria.postcodes,
            Dimension::Brand => &criteria.brands,
            Dimension::Fuel => &criteria.fuel_codes,
        }
    }

    fn selection_mut(self, criteria: &mut FilterCriteria) -> &mut BTreeSet<String> {
        match self {
            Dimension::Suburb => &mut criteria.suburbs,
            Dimension::Postcode => &mut criteria.postcodes,
            Dimension::Brand => &mut criteria.brands,
            Dimension::Fuel => &mut criteria.fuel_codes,
        }
    }
}

// ---------------------------------------------------------------------------
// Full-dataset statistics
// ---------------------------------------------------------------------------

/// Charts in the "Detailed Fuel Price Analysis" section. These always cover
/// the whole dataset, not the filtered view.
#[derive(Debug, Clone)]
pub struct Insights {
    pub by_brand: Vec<GroupStat>,
    pub volatility_by_suburb: Vec<GroupStat>,
    pub by_weekday: [WeekdayStat; 7],
    pub histogram: Option<Histogram>,
}

impl Insights {
    pub fn compute(dataset: &FuelDataset) -> Self {
        Insights {
            by_brand: stats::average_price_by_brand(&dataset.records),
            volatility_by_suburb: stats::price_volatility_by_suburb(&dataset.records),
            by_weekday: stats::average_price_by_weekday(&dataset.records),
            histogram: stats::price_histogram(&dataset.records, HISTOGRAM_BINS),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded once at startup, never mutated.
    pub dataset: Arc<FuelDataset>,

    /// Current sidebar selections.
    pub criteria: FilterCriteria,

    pub sort_key: SortKey,

    /// Filtered then sorted row indices (cached).
    pub visible_rows: Vec<usize>,

    pub insights: Insights,

    /// Fuel code for the trend panel.
    pub trend_fuel: Option<String>,

    pub trend: Vec<TrendPoint>,

    /// Mean of the last seven trend points.
    pub trend_average: Option<f64>,

    /// Result of the last "Show Map" press.
    pub map: Option<MapReport>,

    pub brand_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: Arc<FuelDataset>) -> Self {
        let mut state = Self {
            criteria: FilterCriteria::defaults_for(&dataset),
            sort_key: SortKey::default(),
            visible_rows: Vec::new(),
            insights: Insights::compute(&dataset),
            trend_fuel: stats::default_trend_fuel(&dataset),
            trend: Vec::new(),
            trend_average: None,
            map: None,
            brand_colors: ColorMap::new(&dataset.brands),
            status_message: None,
            dataset,
        };
        state.refresh();
        state
    }

    /// Recompute the table view and the trend after any selection change.
    pub fn refresh(&mut self) {
        let filtered = filtered_indices(&self.dataset, &self.criteria);
        self.visible_rows = sort_indices(&self.dataset, &filtered, self.sort_key);

        self.trend = match &self.trend_fuel {
            Some(fuel) => {
                let query = TrendQuery {
                    fuel_code: fuel,
                    suburbs: &self.criteria.suburbs,
                    date_range: self.criteria.date_range,
                };
                stats::trend_series(&self.dataset.records, &query)
            }
            None => Vec::new(),
        };
        self.trend_average = stats::trailing_average(&self.trend, TRAILING_WINDOW);

        log::debug!(
            "{} of {} rows visible ({}), {} trend points",
            self.visible_rows.len(),
            self.dataset.len(),
            self.sort_key,
            self.trend.len()
        );
    }

    /// Toggle a single value in a multi-select.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        let selected = dim.selection_mut(&mut self.criteria);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refresh();
    }

    /// Drop every selection for a dimension, which lifts its restriction.
    pub fn clear_filter(&mut self, dim: Dimension) {
        dim.selection_mut(&mut self.criteria).clear();
        self.refresh();
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        if self.sort_key != key {
            self.sort_key = key;
            self.refresh();
        }
    }

    pub fn set_date_range(&mut self, a: NaiveDate, b: NaiveDate) {
        self.criteria.date_range = Some((a.min(b), a.max(b)));
        self.refresh();
    }

    pub fn set_price_range(&mut self, a: f64, b: f64) {
        self.criteria.price_range = Some((a.min(b), a.max(b)));
        self.refresh();
    }

    pub fn set_trend_fuel(&mut self, fuel: String) {
        self.trend_fuel = Some(fuel);
        self.refresh();
    }

    /// Geocode every distinct postcode of the current view, one at a time.
    pub fn show_map(&mut self, geocoder: &dyn Geocoder) {
        let postcodes = distinct_postcodes(&self.dataset, &self.visible_rows);
        self.map = Some(locate_postcodes(geocoder, &postcodes));
    }

    /// Write the current view to a CSV file.
    pub fn export_csv(&self, path: &Path) -> Result<usize> {
        let file = File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        let written = write_csv(&self.dataset, &self.visible_rows, BufWriter::new(file))
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported {written} rows to {}", path.display());
        Ok(written)
    }
}
