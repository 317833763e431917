use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{FuelDataset, FuelRecord, REQUIRED_COLUMNS};
use crate::error::DataLoadError;

type Result<T> = std::result::Result<T, DataLoadError>;

// ---------------------------------------------------------------------------
// DataLoader – read once, share everywhere
// ---------------------------------------------------------------------------

/// Owns the dataset location and the loaded table. The file is read on the
/// first successful `load()`; later calls hand out the cached table.
#[derive(Debug)]
pub struct DataLoader {
    path: PathBuf,
    cache: OnceLock<Arc<FuelDataset>>,
}

impl DataLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the dataset, reading it from disk only on the first call.
    pub fn load(&self) -> Result<Arc<FuelDataset>> {
        if let Some(dataset) = self.cache.get() {
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_file(&self.path)?);
        log::info!(
            "Loaded {} fuel price rows from {} ({} suburbs, {} brands, {} fuel codes)",
            dataset.len(),
            self.path.display(),
            dataset.suburbs.len(),
            dataset.brands.len(),
            dataset.fuel_codes.len()
        );
        Ok(Arc::clone(self.cache.get_or_init(|| dataset)))
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a fuel price dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming the required columns
/// * `.json`    – `[{ "Brand": ..., "Postcode": 2141, ... }, ...]`
/// * `.parquet` – flat schema with the required columns
pub fn load_file(path: &Path) -> Result<FuelDataset> {
    if !path.exists() {
        return Err(DataLoadError::Missing(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    Ok(FuelDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one price observation per row.
/// Columns beyond the required set are ignored.
fn load_csv(path: &Path) -> Result<Vec<FuelRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let idx = column_positions(|name| headers.iter().position(|h| h == name))?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let field = |i: usize| record.get(idx[i]).unwrap_or("").trim();

        records.push(FuelRecord {
            brand: field(0).to_string(),
            fuel_code: field(1).to_string(),
            address: field(2).to_string(),
            suburb: field(3).to_string(),
            postcode: normalize_postcode(field(4)),
            price: parse_price_text(row, field(5))?,
            price_updated_at: parse_timestamp_text(row, field(6))?,
        });
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Brand": "Ampol", "FuelCode": "E10", "Address": "...",
///     "Suburb": "Lidcombe", "Postcode": 2141, "Price": 189.9,
///     "PriceUpdatedDate": "2024-01-01 08:30:00"
///   }
/// ]
/// ```
///
/// `PriceUpdatedDate` may also be epoch milliseconds, which is what pandas
/// writes by default.
fn load_json(path: &Path) -> Result<Vec<FuelRecord>> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root
        .as_array()
        .ok_or_else(|| DataLoadError::malformed(0, "<root>", "expected top-level JSON array"))?;

    let mut records = Vec::with_capacity(rows.len());
    for (row, value) in rows.iter().enumerate() {
        let obj = value
            .as_object()
            .ok_or_else(|| DataLoadError::malformed(row, "<row>", "not a JSON object"))?;

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !obj.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns(missing));
        }

        let text = |column: &'static str| json_text(row, column, &obj[column]);

        let price = match &obj["Price"] {
            JsonValue::Number(n) => check_price(row, n.as_f64().unwrap_or(f64::NAN))?,
            JsonValue::String(s) => parse_price_text(row, s)?,
            other => return Err(DataLoadError::malformed(row, "Price", format!("not a number: {other}"))),
        };

        let price_updated_at = match &obj["PriceUpdatedDate"] {
            JsonValue::Number(n) => n
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| {
                    DataLoadError::malformed(row, "PriceUpdatedDate", format!("bad epoch value {n}"))
                })?,
            JsonValue::String(s) => parse_timestamp_text(row, s)?,
            other => {
                return Err(DataLoadError::malformed(
                    row,
                    "PriceUpdatedDate",
                    format!("not a timestamp: {other}"),
                ))
            }
        };

        records.push(FuelRecord {
            brand: text("Brand")?,
            fuel_code: text("FuelCode")?,
            address: text("Address")?,
            suburb: text("Suburb")?,
            postcode: normalize_postcode(&text("Postcode")?),
            price,
            price_updated_at,
        });
    }

    Ok(records)
}

fn json_text(row: usize, column: &'static str, val: &JsonValue) -> Result<String> {
    match val {
        JsonValue::String(s) => Ok(s.trim().to_string()),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Null => Err(DataLoadError::malformed(row, column, "null value")),
        other => Err(DataLoadError::malformed(row, column, format!("unexpected value {other}"))),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of fuel prices.
///
/// Text columns may be Utf8 or LargeUtf8; `Postcode` may be integer or text;
/// `Price` any numeric type; `PriceUpdatedDate` text, Date32 or Timestamp.
/// Everything is normalised through Arrow casts before extraction.
fn load_parquet(path: &Path) -> Result<Vec<FuelRecord>> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let idx = column_positions(|name| builder.schema().index_of(name).ok())?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let text_col = |i: usize| cast(batch.column(idx[i]), &DataType::Utf8);

        let brand = text_col(0)?;
        let fuel = text_col(1)?;
        let address = text_col(2)?;
        let suburb = text_col(3)?;
        let postcode = text_col(4)?;
        let price = cast(batch.column(idx[5]), &DataType::Float64)?;
        let updated = text_col(6)?;

        for i in 0..batch.num_rows() {
            let row = offset + i;
            let price_value = arrow_f64(&price, row, i)?;
            records.push(FuelRecord {
                brand: arrow_text(&brand, row, i, "Brand")?,
                fuel_code: arrow_text(&fuel, row, i, "FuelCode")?,
                address: arrow_text(&address, row, i, "Address")?,
                suburb: arrow_text(&suburb, row, i, "Suburb")?,
                postcode: normalize_postcode(&arrow_text(&postcode, row, i, "Postcode")?),
                price: check_price(row, price_value)?,
                price_updated_at: parse_timestamp_text(
                    row,
                    &arrow_text(&updated, row, i, "PriceUpdatedDate")?,
                )?,
            });
        }
        offset += batch.num_rows();
    }

    Ok(records)
}

// -- Arrow helpers --

fn arrow_text(col: &ArrayRef, row: usize, i: usize, column: &'static str) -> Result<String> {
    if col.is_null(i) {
        return Err(DataLoadError::malformed(row, column, "null value"));
    }
    let strings = col
        .as_string_opt::<i32>()
        .ok_or_else(|| DataLoadError::malformed(row, column, "expected a text column"))?;
    Ok(strings.value(i).trim().to_string())
}

fn arrow_f64(col: &ArrayRef, row: usize, i: usize) -> Result<f64> {
    if col.is_null(i) {
        return Err(DataLoadError::malformed(row, "Price", "null value"));
    }
    let values = col
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| DataLoadError::malformed(row, "Price", "expected a numeric column"))?;
    Ok(values.value(i))
}

// ---------------------------------------------------------------------------
// Shared field parsing
// ---------------------------------------------------------------------------

/// Locate every required column, reporting all missing ones at once.
fn column_positions(lookup: impl Fn(&str) -> Option<usize>) -> Result<[usize; 7]> {
    let mut positions = [0usize; 7];
    let mut missing = Vec::new();
    for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
        match lookup(name) {
            Some(i) => positions[slot] = i,
            None => missing.push(name.to_string()),
        }
    }
    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(DataLoadError::MissingColumns(missing))
    }
}

/// Spreadsheet exports often turn `2141` into `2141.0`.
fn normalize_postcode(raw: &str) -> String {
    let raw = raw.trim();
    match raw.strip_suffix(".0") {
        Some(int) if !int.is_empty() && int.chars().all(|c| c.is_ascii_digit()) => int.to_string(),
        _ => raw.to_string(),
    }
}

fn parse_price_text(row: usize, s: &str) -> Result<f64> {
    let value = s
        .trim()
        .parse::<f64>()
        .map_err(|_| DataLoadError::malformed(row, "Price", format!("'{s}' is not a number")))?;
    check_price(row, value)
}

fn check_price(row: usize, price: f64) -> Result<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(DataLoadError::malformed(
            row,
            "Price",
            format!("{price} is not a valid price"),
        ));
    }
    Ok(price)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    // NSW FuelCheck exports
    "%d/%m/%Y %I:%M:%S %p",
    "%d/%m/%Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse the timestamp layouts seen in fuel price exports. Offsets are
/// dropped, keeping the local wall-clock time.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_timestamp_text(row: usize, s: &str) -> Result<NaiveDateTime> {
    parse_timestamp(s).ok_or_else(|| {
        DataLoadError::malformed(row, "PriceUpdatedDate", format!("'{s}' is not a timestamp"))
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::Timelike;

    use super::*;

    const HEADER: &str = "Brand,FuelCode,Address,Suburb,Postcode,Price,PriceUpdatedDate";

    fn write_temp(ext: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_csv_with_extra_columns_and_float_postcodes() {
        let file = write_temp(
            "csv",
            &format!(
                "ServiceStationName,{HEADER}\n\
                 Ampol Lidcombe,Ampol,E10,1 Olympic Dr,Lidcombe,2141.0,185.9,01/01/2024 08:30:00 AM\n\
                 BP Auburn,BP,P98,2 Parramatta Rd,Auburn,2144,212.5,2024-01-02 17:05:00\n"
            ),
        );

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records[0];
        assert_eq!(first.brand, "Ampol");
        assert_eq!(first.postcode, "2141");
        assert_eq!(first.price, 185.9);
        assert_eq!(first.price_updated_at.hour(), 8);
        assert_eq!(ds.records[1].price_updated_at.minute(), 5);
    }

    #[test]
    fn missing_columns_are_reported_together() {
        let file = write_temp("csv", "Brand,FuelCode,Suburb\nBP,E10,Auburn\n");
        match load_file(file.path()) {
            Err(DataLoadError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["Address", "Postcode", "Price", "PriceUpdatedDate"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn negative_price_is_malformed() {
        let file = write_temp(
            "csv",
            &format!("{HEADER}\nBP,E10,1 Rd,Auburn,2144,-1.0,2024-01-01 00:00:00\n"),
        );
        assert!(matches!(
            load_file(file.path()),
            Err(DataLoadError::Malformed { column: "Price", .. })
        ));
    }

    #[test]
    fn unparseable_timestamp_is_malformed() {
        let file = write_temp("csv", &format!("{HEADER}\nBP,E10,1 Rd,Auburn,2144,180.0,yesterday\n"));
        assert!(matches!(
            load_file(file.path()),
            Err(DataLoadError::Malformed { row: 0, column: "PriceUpdatedDate", .. })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::Missing(_)));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = write_temp("xlsx", "not really a workbook");
        assert!(matches!(
            load_file(file.path()),
            Err(DataLoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn loads_json_with_numeric_postcode_and_epoch_dates() {
        let file = write_temp(
            "json",
            r#"[
                {"Brand": "Shell", "FuelCode": "DL", "Address": "3 Joseph St",
                 "Suburb": "Lidcombe", "Postcode": 2141, "Price": 199.9,
                 "PriceUpdatedDate": 1704067200000},
                {"Brand": "Metro", "FuelCode": "U91", "Address": "4 Rookwood Rd",
                 "Suburb": "Yagoona", "Postcode": "2199", "Price": "179.5",
                 "PriceUpdatedDate": "2024-01-03T06:00:00"}
            ]"#,
        );

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].postcode, "2141");
        assert_eq!(
            ds.records[0].price_updated_at.date(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(ds.records[1].price, 179.5);
    }

    #[test]
    fn json_rows_missing_fields_fail_schema_check() {
        let file = write_temp("json", r#"[{"Brand": "BP", "Price": 1.0}]"#);
        assert!(matches!(
            load_file(file.path()),
            Err(DataLoadError::MissingColumns(_))
        ));
    }

    #[test]
    fn loads_parquet_with_integer_postcodes_and_timestamps() {
        use arrow::array::{Float64Array, Int64Array, StringArray, TimestampSecondArray};
        use arrow::datatypes::{Field, Schema, TimeUnit};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Brand", DataType::Utf8, false),
            Field::new("FuelCode", DataType::Utf8, false),
            Field::new("Address", DataType::Utf8, false),
            Field::new("Suburb", DataType::Utf8, false),
            Field::new("Postcode", DataType::Int64, false),
            Field::new("Price", DataType::Float64, false),
            Field::new("PriceUpdatedDate", DataType::Timestamp(TimeUnit::Second, None), false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Ampol", "BP"])),
                Arc::new(StringArray::from(vec!["E10", "DL"])),
                Arc::new(StringArray::from(vec!["1 Olympic Dr", "2 Church St"])),
                Arc::new(StringArray::from(vec!["Lidcombe", "Parramatta"])),
                Arc::new(Int64Array::from(vec![2141, 2150])),
                Arc::new(Float64Array::from(vec![185.9, 201.5])),
                // 2024-01-01 08:30:00 and 2024-01-02 00:00:00 UTC
                Arc::new(TimestampSecondArray::from(vec![1_704_097_800, 1_704_153_600])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(std::fs::File::create(file.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].postcode, "2141");
        assert_eq!(ds.records[0].price_updated_at.hour(), 8);
        assert_eq!(ds.records[0].price_updated_at.minute(), 30);
        assert_eq!(ds.records[1].suburb, "Parramatta");
        assert_eq!(ds.postcodes, vec!["2141", "2150"]);
    }

    #[test]
    fn empty_parquet_with_wrong_columns_is_rejected() {
        use arrow::array::StringArray;
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![Field::new("Station", DataType::Utf8, false)]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(StringArray::from(Vec::<&str>::new()))],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(std::fs::File::create(file.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        match load_file(file.path()) {
            Err(DataLoadError::MissingColumns(missing)) => assert_eq!(missing.len(), 7),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn loader_reads_the_file_only_once() {
        let file = write_temp(
            "csv",
            &format!("{HEADER}\nBP,E10,1 Rd,Auburn,2144,180.0,2024-01-01 00:00:00\n"),
        );
        let path = file.path().to_path_buf();
        let loader = DataLoader::new(&path);

        let first = loader.load().unwrap();
        drop(file);
        assert!(!path.exists());

        let second = loader.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn timestamp_layouts() {
        for s in [
            "2024-01-05T10:15:00",
            "2024-01-05 10:15:00.250",
            "2024-01-05T10:15:00+11:00",
            "05/01/2024 10:15:00 AM",
            "5/01/2024 10:15",
        ] {
            let ts = parse_timestamp(s).unwrap_or_else(|| panic!("failed to parse {s}"));
            assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), "{s}");
            assert_eq!(ts.hour(), 10, "{s}");
        }
        assert_eq!(
            parse_timestamp("2024-01-05").map(|t| t.hour()),
            Some(0)
        );
        assert!(parse_timestamp("Jan 5th").is_none());
    }
}
