//! Writes a deterministic synthetic NSW fuel price dataset to
//! `sample_fuel.csv` and `sample_fuel.parquet`.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

/// Small deterministic PRNG (splitmix64).
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

struct Station {
    brand: &'static str,
    address: &'static str,
    suburb: &'static str,
    postcode: i64,
}

const STATIONS: &[Station] = &[
    Station { brand: "Ampol", address: "1 Olympic Dr", suburb: "Lidcombe", postcode: 2141 },
    Station { brand: "BP", address: "52 Parramatta Rd", suburb: "Lidcombe", postcode: 2141 },
    Station { brand: "7-Eleven", address: "220 Parramatta Rd", suburb: "Auburn", postcode: 2144 },
    Station { brand: "Shell", address: "15 Rawson St", suburb: "Auburn", postcode: 2144 },
    Station { brand: "Metro Fuel", address: "400 Hume Hwy", suburb: "Yagoona", postcode: 2199 },
    Station { brand: "Costco", address: "17 Parramatta Rd", suburb: "Strathfield", postcode: 2135 },
    Station { brand: "Ampol", address: "77 George St", suburb: "Parramatta", postcode: 2150 },
    Station { brand: "Speedway", address: "9 Silverwater Rd", suburb: "Silverwater", postcode: 2128 },
];

/// Base price in cents per litre.
const FUELS: &[(&str, f64)] = &[
    ("E10", 186.0),
    ("U91", 189.0),
    ("P95", 203.0),
    ("P98", 211.0),
    ("DL", 199.0),
    ("LPG", 99.0),
];

fn main() -> Result<()> {
    let mut rng = SampleRng(42);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;

    let mut brand = Vec::new();
    let mut fuel = Vec::new();
    let mut address = Vec::new();
    let mut suburb = Vec::new();
    let mut postcode = Vec::new();
    let mut price = Vec::new();
    let mut updated = Vec::new();

    for day in 0..21 {
        // Weekly price cycle: cheapest mid-week.
        let cycle = [4.0, 1.0, -2.0, -3.0, 0.0, 3.0, 5.0][day as usize % 7];
        for station in STATIONS {
            for &(code, base) in FUELS {
                // Not every station updates every fuel every day.
                if rng.below(3) == 0 {
                    continue;
                }
                let minutes = rng.below(24 * 60) as i64;
                let noise = (rng.next_f64() - 0.5) * 6.0;
                let cents = ((base + cycle + noise) * 10.0).round() / 10.0;

                brand.push(station.brand);
                fuel.push(code);
                address.push(station.address);
                suburb.push(station.suburb);
                postcode.push(station.postcode);
                price.push(cents);
                updated.push(
                    (start + Duration::days(day) + Duration::minutes(minutes))
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string(),
                );
            }
        }
    }

    // CSV
    let csv_path = "sample_fuel.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV")?;
    writer.write_record(["Brand", "FuelCode", "Address", "Suburb", "Postcode", "Price", "PriceUpdatedDate"])?;
    for i in 0..brand.len() {
        writer.write_record([
            brand[i].to_string(),
            fuel[i].to_string(),
            address[i].to_string(),
            suburb[i].to_string(),
            postcode[i].to_string(),
            price[i].to_string(),
            updated[i].clone(),
        ])?;
    }
    writer.flush()?;

    let rows = brand.len();

    // Parquet, with an integer postcode column as pandas would write it.
    let schema = Arc::new(Schema::new(vec![
        Field::new("Brand", DataType::Utf8, false),
        Field::new("FuelCode", DataType::Utf8, false),
        Field::new("Address", DataType::Utf8, false),
        Field::new("Suburb", DataType::Utf8, false),
        Field::new("Postcode", DataType::Int64, false),
        Field::new("Price", DataType::Float64, false),
        Field::new("PriceUpdatedDate", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(brand)),
            Arc::new(StringArray::from(fuel)),
            Arc::new(StringArray::from(address)),
            Arc::new(StringArray::from(suburb)),
            Arc::new(Int64Array::from(postcode)),
            Arc::new(Float64Array::from(price)),
            Arc::new(StringArray::from(updated)),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "sample_fuel.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut pq = ArrowWriter::try_new(file, schema, None)?;
    pq.write(&batch)?;
    pq.close()?;

    println!("Wrote {rows} price updates to {csv_path} and {parquet_path}");
    Ok(())
}
