use std::fmt;

use super::model::FuelDataset;

/// Row order for the table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    PriceDesc,
    PriceAsc,
    DateDesc,
    DateAsc,
}

impl SortKey {
    /// Selector order in the sidebar.
    pub const ALL: [SortKey; 4] = [
        SortKey::PriceDesc,
        SortKey::PriceAsc,
        SortKey::DateDesc,
        SortKey::DateAsc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::PriceDesc => "Price: High to Low",
            SortKey::PriceAsc => "Price: Low to High",
            SortKey::DateDesc => "Date: Newest to Oldest",
            SortKey::DateAsc => "Date: Oldest to Newest",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reorder a filtered view. The sort is stable, so rows with equal keys keep
/// their relative input order.
pub fn sort_indices(dataset: &FuelDataset, rows: &[usize], key: SortKey) -> Vec<usize> {
    let mut sorted = rows.to_vec();
    let recs = &dataset.records;
    match key {
        SortKey::PriceDesc => sorted.sort_by(|&a, &b| recs[b].price.total_cmp(&recs[a].price)),
        SortKey::PriceAsc => sorted.sort_by(|&a, &b| recs[a].price.total_cmp(&recs[b].price)),
        SortKey::DateDesc => {
            sorted.sort_by(|&a, &b| recs[b].price_updated_at.cmp(&recs[a].price_updated_at))
        }
        SortKey::DateAsc => {
            sorted.sort_by(|&a, &b| recs[a].price_updated_at.cmp(&recs[b].price_updated_at))
        }
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{at, record};

    fn sample() -> FuelDataset {
        FuelDataset::from_records(vec![
            record("A", "E10", "Lidcombe", "2141", 1.80, at(2024, 1, 3, 0)),
            record("B", "E10", "Lidcombe", "2141", 1.95, at(2024, 1, 1, 0)),
            record("C", "E10", "Lidcombe", "2141", 1.80, at(2024, 1, 2, 0)),
            record("D", "E10", "Lidcombe", "2141", 1.85, at(2024, 1, 3, 0)),
        ])
    }

    #[test]
    fn price_descending_keeps_ties_in_input_order() {
        let ds = sample();
        assert_eq!(sort_indices(&ds, &[0, 1, 2, 3], SortKey::PriceDesc), vec![1, 3, 0, 2]);
        assert_eq!(sort_indices(&ds, &[2, 1, 0, 3], SortKey::PriceDesc), vec![1, 3, 2, 0]);
    }

    #[test]
    fn price_ascending() {
        let ds = sample();
        assert_eq!(sort_indices(&ds, &[0, 1, 2, 3], SortKey::PriceAsc), vec![0, 2, 3, 1]);
    }

    #[test]
    fn date_orders_are_stable() {
        let ds = sample();
        assert_eq!(sort_indices(&ds, &[0, 1, 2, 3], SortKey::DateAsc), vec![1, 2, 0, 3]);
        assert_eq!(sort_indices(&ds, &[0, 1, 2, 3], SortKey::DateDesc), vec![0, 3, 2, 1]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let ds = sample();
        for key in SortKey::ALL {
            let once = sort_indices(&ds, &[3, 2, 1, 0], key);
            let twice = sort_indices(&ds, &once, key);
            assert_eq!(once, twice, "{key}");
        }
    }

    #[test]
    fn only_the_given_view_is_sorted() {
        let ds = sample();
        assert_eq!(sort_indices(&ds, &[3, 1], SortKey::PriceAsc), vec![3, 1]);
        assert!(sort_indices(&ds, &[], SortKey::DateDesc).is_empty());
    }
}
