use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use super::model::{FuelDataset, FuelRecord};

/// Bins in the price distribution chart.
pub const HISTOGRAM_BINS: usize = 30;
/// Points averaged for the "current price" gauge.
pub const TRAILING_WINDOW: usize = 7;

/// Fixed chart order, not alphabetical.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One group of a group-by aggregate. `value` is `None` when the statistic is
/// undefined for the group (e.g. the std-dev of a single observation).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStat {
    pub key: String,
    pub value: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekdayStat {
    pub weekday: Weekday,
    pub mean: Option<f64>,
}

/// Equal-width bins: `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub at: NaiveDateTime,
    pub mean_price: f64,
}

// ---------------------------------------------------------------------------
// Group-by aggregates
// ---------------------------------------------------------------------------

fn group_prices<'a>(
    records: &'a [FuelRecord],
    key: impl Fn(&'a FuelRecord) -> &'a str,
) -> BTreeMap<&'a str, Vec<f64>> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for rec in records {
        groups.entry(key(rec)).or_default().push(rec.price);
    }
    groups
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n − 1 denominator). Undefined below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Mean price per brand, ordered by brand name.
pub fn average_price_by_brand(records: &[FuelRecord]) -> Vec<GroupStat> {
    group_prices(records, |r| r.brand.as_str())
        .into_iter()
        .map(|(brand, prices)| GroupStat {
            key: brand.to_string(),
            value: mean(&prices),
            count: prices.len(),
        })
        .collect()
}

/// Price standard deviation per suburb. Suburbs with a single observation
/// stay in the output with `value: None`.
pub fn price_volatility_by_suburb(records: &[FuelRecord]) -> Vec<GroupStat> {
    group_prices(records, |r| r.suburb.as_str())
        .into_iter()
        .map(|(suburb, prices)| GroupStat {
            key: suburb.to_string(),
            value: sample_std(&prices),
            count: prices.len(),
        })
        .collect()
}

/// Mean price per weekday, always seven slots from Monday to Sunday.
pub fn average_price_by_weekday(records: &[FuelRecord]) -> [WeekdayStat; 7] {
    let mut sums = [(0.0f64, 0usize); 7];
    for rec in records {
        let slot = rec.price_updated_at.weekday().num_days_from_monday() as usize;
        sums[slot].0 += rec.price;
        sums[slot].1 += 1;
    }
    WEEK.map(|weekday| {
        let (sum, n) = sums[weekday.num_days_from_monday() as usize];
        WeekdayStat {
            weekday,
            mean: (n > 0).then(|| sum / n as f64),
        }
    })
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Bucket prices into `bins` equal-width bins spanning the observed range.
/// The maximum lands in the last bin. A zero-width range is widened by 0.5
/// on each side.
pub fn price_histogram(records: &[FuelRecord], bins: usize) -> Option<Histogram> {
    if records.is_empty() || bins == 0 {
        return None;
    }

    let (mut lo, mut hi) = records
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r.price), hi.max(r.price))
        });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for rec in records {
        let slot = (((rec.price - lo) / width) as usize).min(bins - 1);
        counts[slot] += 1;
    }

    Some(Histogram { edges, counts })
}

// ---------------------------------------------------------------------------
// Price trend
// ---------------------------------------------------------------------------

/// Rows feeding the trend panel.
///
/// Unlike the table filter, an empty suburb set matches nothing here: no
/// suburb selected means no trend.
#[derive(Debug, Clone, Copy)]
pub struct TrendQuery<'a> {
    pub fuel_code: &'a str,
    pub suburbs: &'a BTreeSet<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl TrendQuery<'_> {
    fn matches(&self, rec: &FuelRecord) -> bool {
        if rec.fuel_code != self.fuel_code || !self.suburbs.contains(&rec.suburb) {
            return false;
        }
        match self.date_range {
            Some((start, end)) => {
                let day = rec.price_updated_at.date();
                day >= start && day <= end
            }
            None => true,
        }
    }
}

/// Mean price per update timestamp, ascending.
pub fn trend_series(records: &[FuelRecord], query: &TrendQuery<'_>) -> Vec<TrendPoint> {
    let mut by_time: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();
    for rec in records.iter().filter(|r| query.matches(r)) {
        let entry = by_time.entry(rec.price_updated_at).or_insert((0.0, 0));
        entry.0 += rec.price;
        entry.1 += 1;
    }
    by_time
        .into_iter()
        .map(|(at, (sum, n))| TrendPoint {
            at,
            mean_price: sum / n as f64,
        })
        .collect()
}

/// Mean of the last `window` points of the series. Position based: these are
/// the last entries, not the last calendar days. Shorter series average what
/// they have.
pub fn trailing_average(series: &[TrendPoint], window: usize) -> Option<f64> {
    let start = series.len().saturating_sub(window);
    let tail: Vec<f64> = series[start..].iter().map(|p| p.mean_price).collect();
    mean(&tail)
}

/// Trend selector default: the second fuel option, or the only one.
pub fn default_trend_fuel(dataset: &FuelDataset) -> Option<String> {
    dataset
        .fuel_codes
        .get(1)
        .or_else(|| dataset.fuel_codes.first())
        .cloned()
}
