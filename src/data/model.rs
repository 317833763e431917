use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDateTime;

/// The columns every input file must carry, in display order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Brand",
    "FuelCode",
    "Address",
    "Suburb",
    "Postcode",
    "Price",
    "PriceUpdatedDate",
];

// ---------------------------------------------------------------------------
// FuelRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single price observation for one fuel at one station.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelRecord {
    pub brand: String,
    /// Open set: E10, U91, P95, P98, DL, PDL, LPG, ...
    pub fuel_code: String,
    pub address: String,
    pub suburb: String,
    /// Integer postcodes in the source are kept as their decimal text.
    pub postcode: String,
    /// Price in source units (NSW exports use cents per litre).
    pub price: f64,
    pub price_updated_at: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// FuelDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed option lists for the filter
/// widgets. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct FuelDataset {
    pub records: Vec<FuelRecord>,
    pub suburbs: Vec<String>,
    /// Numeric order when every postcode parses as a number.
    pub postcodes: Vec<String>,
    pub brands: Vec<String>,
    pub fuel_codes: Vec<String>,
    /// Observed `(min, max)` price, `None` for an empty dataset.
    pub price_bounds: Option<(f64, f64)>,
}

impl FuelDataset {
    /// Build option indices from the loaded records.
    pub fn from_records(records: Vec<FuelRecord>) -> Self {
        let mut suburbs = BTreeSet::new();
        let mut postcodes = BTreeSet::new();
        let mut brands = BTreeSet::new();
        let mut fuel_codes = BTreeSet::new();
        let mut price_bounds: Option<(f64, f64)> = None;

        for rec in &records {
            suburbs.insert(rec.suburb.clone());
            postcodes.insert(rec.postcode.clone());
            brands.insert(rec.brand.clone());
            fuel_codes.insert(rec.fuel_code.clone());
            price_bounds = Some(match price_bounds {
                None => (rec.price, rec.price),
                Some((lo, hi)) => (lo.min(rec.price), hi.max(rec.price)),
            });
        }

        let mut postcodes: Vec<String> = postcodes.into_iter().collect();
        postcodes.sort_by(|a, b| compare_postcodes(a, b));

        FuelDataset {
            records,
            suburbs: suburbs.into_iter().collect(),
            postcodes,
            brands: brands.into_iter().collect(),
            fuel_codes: fuel_codes.into_iter().collect(),
            price_bounds,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve a list of row indices into records.
    pub fn rows<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = &'a FuelRecord> + 'a {
        indices.iter().filter_map(move |&i| self.records.get(i))
    }
}

/// Numeric postcodes sort by value, anything else falls back to text order
/// after the numeric ones.
fn compare_postcodes(a: &str, b: &str) -> Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::FuelRecord;

    pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .expect("valid test timestamp")
    }

    pub fn record(
        brand: &str,
        fuel: &str,
        suburb: &str,
        postcode: &str,
        price: f64,
        when: NaiveDateTime,
    ) -> FuelRecord {
        FuelRecord {
            brand: brand.to_string(),
            fuel_code: fuel.to_string(),
            address: format!("1 {suburb} Rd, {suburb} NSW {postcode}"),
            suburb: suburb.to_string(),
            postcode: postcode.to_string(),
            price,
            price_updated_at: when,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{at, record};
    use super::*;

    #[test]
    fn option_lists_are_sorted_and_deduplicated() {
        let ds = FuelDataset::from_records(vec![
            record("Shell", "P98", "Lidcombe", "2141", 210.9, at(2024, 1, 2, 9)),
            record("BP", "E10", "Auburn", "2144", 189.9, at(2024, 1, 1, 9)),
            record("Ampol", "E10", "Lidcombe", "2141", 185.5, at(2024, 1, 3, 9)),
            record("BP", "DL", "Sydney", "2000", 199.0, at(2024, 1, 4, 9)),
        ]);

        assert_eq!(ds.brands, vec!["Ampol", "BP", "Shell"]);
        assert_eq!(ds.suburbs, vec!["Auburn", "Lidcombe", "Sydney"]);
        assert_eq!(ds.fuel_codes, vec!["DL", "E10", "P98"]);
        assert_eq!(ds.postcodes, vec!["2000", "2141", "2144"]);
        assert_eq!(ds.price_bounds, Some((185.5, 210.9)));
    }

    #[test]
    fn postcodes_sort_numerically_not_lexically() {
        let ds = FuelDataset::from_records(vec![
            record("BP", "E10", "A", "870", 1.0, at(2024, 1, 1, 0)),
            record("BP", "E10", "B", "2000", 1.0, at(2024, 1, 1, 0)),
            record("BP", "E10", "C", "unknown", 1.0, at(2024, 1, 1, 0)),
        ]);
        assert_eq!(ds.postcodes, vec!["870", "2000", "unknown"]);
    }

    #[test]
    fn empty_dataset_has_no_price_bounds() {
        let ds = FuelDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.price_bounds, None);
    }
}
