use std::io::Write;

use super::model::{FuelDataset, REQUIRED_COLUMNS};

/// Write the given rows, in order, with the same columns the dataset was
/// loaded from. Returns the number of rows written.
pub fn write_csv<W: Write>(dataset: &FuelDataset, rows: &[usize], out: W) -> csv::Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(REQUIRED_COLUMNS)?;

    let mut written = 0;
    for rec in dataset.rows(rows) {
        let price = rec.price.to_string();
        let updated = rec.price_updated_at.format("%Y-%m-%d %H:%M:%S").to_string();
        writer.write_record([
            rec.brand.as_str(),
            rec.fuel_code.as_str(),
            rec.address.as_str(),
            rec.suburb.as_str(),
            rec.postcode.as_str(),
            price.as_str(),
            updated.as_str(),
        ])?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{at, record};

    #[test]
    fn writes_rows_in_view_order() {
        let ds = FuelDataset::from_records(vec![
            record("Ampol", "E10", "Lidcombe", "2141", 185.9, at(2024, 1, 1, 8)),
            record("BP", "P98", "Auburn", "2144", 212.5, at(2024, 1, 2, 17)),
        ]);

        let mut buf = Vec::new();
        let n = write_csv(&ds, &[1, 0], &mut buf).unwrap();
        assert_eq!(n, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Brand,FuelCode,Address,Suburb,Postcode,Price,PriceUpdatedDate");
        assert!(lines[1].starts_with("BP,P98,"));
        assert!(lines[1].ends_with(",2144,212.5,2024-01-02 17:00:00"));
        assert!(lines[2].starts_with("Ampol,E10,"));
    }

    #[test]
    fn empty_view_writes_only_the_header() {
        let ds = FuelDataset::default();
        let mut buf = Vec::new();
        assert_eq!(write_csv(&ds, &[], &mut buf).unwrap(), 0);
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}
