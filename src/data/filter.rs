use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{FuelDataset, FuelRecord};

/// Suburb selected on first load when the dataset contains it.
pub const DEFAULT_SUBURB: &str = "Lidcombe";
/// Fuel code selected on first load when the dataset contains it.
pub const DEFAULT_FUEL: &str = "E10";

/// Default date window: 2024-01-01 through 2024-01-08, plus one day.
pub fn default_date_range() -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(2024, 1, 1)?,
        NaiveDate::from_ymd_opt(2024, 1, 9)?,
    ))
}

// ---------------------------------------------------------------------------
// Filter predicate: one restriction per dimension
// ---------------------------------------------------------------------------

/// User selections for one interaction.
///
/// An empty set means "no restriction" on that dimension (show all), and a
/// `None` range likewise passes every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub suburbs: BTreeSet<String>,
    pub postcodes: BTreeSet<String>,
    pub brands: BTreeSet<String>,
    pub fuel_codes: BTreeSet<String>,
    /// Inclusive, compared on the calendar date only.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Inclusive on both bounds.
    pub price_range: Option<(f64, f64)>,
}

impl FilterCriteria {
    /// Initial selections shown when the dashboard opens.
    pub fn defaults_for(dataset: &FuelDataset) -> Self {
        fn pick(options: &[String], wanted: &str) -> BTreeSet<String> {
            options
                .iter()
                .filter(|o| o.as_str() == wanted)
                .cloned()
                .collect()
        }

        FilterCriteria {
            suburbs: pick(&dataset.suburbs, DEFAULT_SUBURB),
            postcodes: BTreeSet::new(),
            brands: BTreeSet::new(),
            fuel_codes: pick(&dataset.fuel_codes, DEFAULT_FUEL),
            date_range: default_date_range(),
            price_range: dataset.price_bounds,
        }
    }

    /// Whether a single row passes every active restriction.
    pub fn matches(&self, rec: &FuelRecord) -> bool {
        fn allowed(set: &BTreeSet<String>, value: &str) -> bool {
            set.is_empty() || set.contains(value)
        }

        if !allowed(&self.suburbs, &rec.suburb)
            || !allowed(&self.postcodes, &rec.postcode)
            || !allowed(&self.brands, &rec.brand)
            || !allowed(&self.fuel_codes, &rec.fuel_code)
        {
            return false;
        }

        if let Some((start, end)) = self.date_range {
            let day = rec.price_updated_at.date();
            if day < start || day > end {
                return false;
            }
        }

        if let Some((min, max)) = self.price_range {
            if rec.price < min || rec.price > max {
                return false;
            }
        }

        true
    }
}

/// Return indices of rows that pass all active filters, in table order.
/// An empty result is a valid state, not an error.
pub fn filtered_indices(dataset: &FuelDataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{at, record};

    fn sample() -> FuelDataset {
        FuelDataset::from_records(vec![
            record("Ampol", "E10", "Lidcombe", "2141", 185.9, at(2024, 1, 1, 8)),
            record("BP", "E10", "Auburn", "2144", 189.9, at(2024, 1, 2, 9)),
            record("Shell", "P98", "Lidcombe", "2141", 215.0, at(2024, 1, 3, 23)),
            record("Metro", "U91", "Yagoona", "2199", 179.9, at(2024, 1, 8, 23)),
            record("BP", "DL", "Auburn", "2144", 199.0, at(2024, 1, 9, 0)),
            record("Ampol", "E10", "Lidcombe", "2141", 187.5, at(2024, 1, 10, 7)),
        ])
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn empty_criteria_is_identity() {
        let ds = sample();
        let rows = filtered_indices(&ds, &FilterCriteria::default());
        assert_eq!(rows, (0..ds.len()).collect::<Vec<_>>());
    }

    #[test]
    fn empty_set_means_no_restriction() {
        let ds = sample();
        let criteria = FilterCriteria {
            brands: set(&["BP"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &criteria), vec![1, 4]);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let ds = sample();
        let criteria = FilterCriteria {
            suburbs: set(&["Lidcombe", "Auburn"]),
            fuel_codes: set(&["E10"]),
            price_range: Some((186.0, 190.0)),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &criteria), vec![1, 5]);
    }

    #[test]
    fn date_range_ignores_time_of_day_and_is_inclusive() {
        let ds = sample();
        let criteria = FilterCriteria {
            date_range: Some((
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            )),
            ..Default::default()
        };
        // 2024-01-03 23:00 and 2024-01-08 23:00 both fall inside.
        assert_eq!(filtered_indices(&ds, &criteria), vec![2, 3]);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let ds = sample();
        let criteria = FilterCriteria {
            price_range: Some((179.9, 185.9)),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &criteria), vec![0, 3]);
    }

    #[test]
    fn no_match_yields_empty_view() {
        let ds = sample();
        let criteria = FilterCriteria {
            suburbs: set(&["Newcastle"]),
            ..Default::default()
        };
        assert!(filtered_indices(&ds, &criteria).is_empty());
    }

    #[test]
    fn result_is_sound_and_complete() {
        let ds = sample();
        let criteria = FilterCriteria {
            brands: set(&["Ampol", "BP"]),
            date_range: default_date_range(),
            ..Default::default()
        };
        let rows = filtered_indices(&ds, &criteria);
        for (i, rec) in ds.records.iter().enumerate() {
            assert_eq!(rows.contains(&i), criteria.matches(rec), "row {i}");
        }
    }

    #[test]
    fn defaults_pick_lidcombe_e10_and_full_price_range() {
        let ds = sample();
        let criteria = FilterCriteria::defaults_for(&ds);
        assert_eq!(criteria.suburbs, set(&["Lidcombe"]));
        assert_eq!(criteria.fuel_codes, set(&["E10"]));
        assert!(criteria.brands.is_empty());
        assert_eq!(criteria.price_range, Some((179.9, 215.0)));
        assert_eq!(
            criteria.date_range,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()
            ))
        );
        // The 2024-01-10 row falls outside the default window.
        assert_eq!(filtered_indices(&ds, &criteria), vec![0]);
    }

    #[test]
    fn defaults_stay_empty_when_values_are_absent() {
        let ds = FuelDataset::from_records(vec![record(
            "BP",
            "DL",
            "Auburn",
            "2144",
            199.0,
            at(2024, 1, 2, 0),
        )]);
        let criteria = FilterCriteria::defaults_for(&ds);
        assert!(criteria.suburbs.is_empty());
        assert!(criteria.fuel_codes.is_empty());
    }
}
