use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, RecordBatch};
use arrow::datatypes::{
    DataType, Date32Type, Float64Type, Int32Type, Int64Type, UInt32Type, UInt64Type,
};
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Required schema
// ---------------------------------------------------------------------------

/// Header names the source file must carry (after whitespace trimming).
pub const REPORT_DATE: &str = "Report Date";
pub const STATE: &str = "State";
pub const CAUSE: &str = "Cause of Death Description";
pub const DEATHS: &str = "Drug Overdose Death Count";

pub const REQUIRED_COLUMNS: [&str; 4] = [REPORT_DATE, STATE, CAUSE, DEATHS];

// ---------------------------------------------------------------------------
// Errors & load report
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("the dataset is missing the required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a top-level JSON array of row objects")]
    JsonShape,
    #[error("malformed Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("malformed Arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl LoadError {
    /// Schema failures disable the whole chart pipeline; every other
    /// load failure just degrades the session to an empty dataset.
    pub fn is_schema_failure(&self) -> bool {
        matches!(self, LoadError::MissingColumns(_))
    }
}

/// A successful load: the dataset plus load-time diagnostics.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub dataset: Dataset,
    /// Rows discarded because a field violated the record invariant
    /// (unparseable report date, empty state or cause, bad count).
    pub skipped_rows: usize,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an overdose dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – CDC CSV export with a header row (primary format)
/// * `.json`    – records-oriented array, `df.to_json(orient='records')`
/// * `.parquet` – flat scalar columns with the same column names
pub fn load_file(path: &Path) -> Result<LoadReport, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let report = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    if report.skipped_rows > 0 {
        log::warn!(
            "{} malformed rows dropped while loading {}",
            report.skipped_rows,
            path.display()
        );
    }
    log::info!(
        "loaded {} records ({} years, {} states, {} causes) from {}",
        report.dataset.len(),
        report.dataset.years.len(),
        report.dataset.states.len(),
        report.dataset.causes.len(),
        path.display()
    );
    Ok(report)
}

fn open_file(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Schema check: every required column must be present after trimming.
/// The error names all missing columns at once, not just the first.
fn check_required_columns(headers: &[String]) -> Result<(), LoadError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// Report Date → Year
// ---------------------------------------------------------------------------

/// Date shapes seen in exports of this table. The CDC form carries a
/// meaningless midnight timestamp; chrono drops the time components
/// when parsing into a `NaiveDate`.
const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y %I:%M:%S %p", "%m/%d/%Y", "%Y-%m-%d"];

/// Parse a `Report Date` cell and project out the calendar year.
fn parse_report_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|date| date.year())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// One CSV row as it appears in the file; `Report Date` is still text.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Report Date")]
    report_date: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Cause of Death Description")]
    cause: String,
    #[serde(rename = "Drug Overdose Death Count")]
    deaths: u64,
}

impl RawRow {
    /// Enforce the record invariant; the error names the bad field.
    fn into_record(self) -> Result<Record, String> {
        let year = parse_report_year(&self.report_date)
            .ok_or_else(|| format!("unparseable report date {:?}", self.report_date))?;
        let state = self.state.trim();
        if state.is_empty() {
            return Err("empty state".to_string());
        }
        let cause = self.cause.trim();
        if cause.is_empty() {
            return Err("empty cause of death".to_string());
        }
        Ok(Record {
            year,
            state: state.to_string(),
            cause: cause.to_string(),
            deaths: self.deaths,
        })
    }
}

fn load_csv(path: &Path) -> Result<LoadReport, LoadError> {
    let mut reader = csv::Reader::from_reader(open_file(path)?);

    // The CDC export pads some header names with stray spaces.
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    check_required_columns(&headers)?;
    reader.set_headers(csv::StringRecord::from(headers));

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (row_no, row) in reader.deserialize::<RawRow>().enumerate() {
        let parsed = row
            .map_err(|err| err.to_string())
            .and_then(RawRow::into_record);
        match parsed {
            Ok(rec) => records.push(rec),
            Err(reason) => {
                log::debug!("dropping CSV row {row_no}: {reason}");
                skipped += 1;
            }
        }
    }

    Ok(LoadReport {
        dataset: Dataset::from_records(records),
        skipped_rows: skipped,
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Report Date": "01/01/2015 12:00:00 AM",
///     "State": "Ohio",
///     "Cause of Death Description": "Heroin Overdoses",
///     "Drug Overdose Death Count": 1424
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<LoadReport, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;
    let rows = root.as_array().ok_or(LoadError::JsonShape)?;

    // Schema check against the first row's keys; a zero-row array is
    // a valid, empty dataset.
    if let Some(first) = rows.first() {
        let keys: Vec<String> = first
            .as_object()
            .map(|obj| obj.keys().map(|k| k.trim().to_string()).collect())
            .unwrap_or_default();
        check_required_columns(&keys)?;
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (row_no, row) in rows.iter().enumerate() {
        match json_record(row) {
            Some(rec) => records.push(rec),
            None => {
                log::debug!("dropping JSON row {row_no}: malformed row");
                skipped += 1;
            }
        }
    }

    Ok(LoadReport {
        dataset: Dataset::from_records(records),
        skipped_rows: skipped,
    })
}

/// Read one records-oriented object into a typed Record.
fn json_record(row: &JsonValue) -> Option<Record> {
    let obj = row.as_object()?;
    // Key lookup tolerates padded names, like the CSV header trim.
    let field = |name: &str| obj.iter().find(|(k, _)| k.trim() == name).map(|(_, v)| v);

    let year = field(REPORT_DATE)?.as_str().and_then(parse_report_year)?;
    let state = field(STATE)?.as_str()?.trim().to_string();
    let cause = field(CAUSE)?.as_str()?.trim().to_string();
    let deaths = field(DEATHS)?.as_u64()?;

    if state.is_empty() || cause.is_empty() {
        return None;
    }
    Some(Record {
        year,
        state,
        cause,
        deaths,
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the table. Columns are flat scalars with
/// the same names as the CSV headers; works with files written by both
/// Pandas (`df.to_parquet()`) and Polars (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<LoadReport, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open_file(path)?)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut row_base = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let names: Vec<String> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().trim().to_string())
            .collect();
        check_required_columns(&names)?;

        let date_col = column(&batch, &names, REPORT_DATE)?;
        let state_col = column(&batch, &names, STATE)?;
        let cause_col = column(&batch, &names, CAUSE)?;
        let deaths_col = column(&batch, &names, DEATHS)?;

        for row in 0..batch.num_rows() {
            let year = cell_year(date_col, row);
            let state = cell_str(state_col, row).filter(|s| !s.is_empty());
            let cause = cell_str(cause_col, row).filter(|s| !s.is_empty());
            let deaths = cell_count(deaths_col, row);

            match (year, state, cause, deaths) {
                (Some(year), Some(state), Some(cause), Some(deaths)) => {
                    records.push(Record {
                        year,
                        state,
                        cause,
                        deaths,
                    });
                }
                _ => {
                    log::debug!("dropping Parquet row {}: malformed row", row_base + row);
                    skipped += 1;
                }
            }
        }
        row_base += batch.num_rows();
    }

    Ok(LoadReport {
        dataset: Dataset::from_records(records),
        skipped_rows: skipped,
    })
}

// -- Arrow cell helpers --

fn column<'a>(
    batch: &'a RecordBatch,
    names: &[String],
    name: &str,
) -> Result<&'a ArrayRef, LoadError> {
    names
        .iter()
        .position(|n| n == name)
        .map(|i| batch.column(i))
        .ok_or_else(|| LoadError::MissingColumns(vec![name.to_string()]))
}

/// Read a cell as trimmed text (Utf8 or LargeUtf8 columns).
fn cell_str(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row).trim().to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).trim().to_string()),
        _ => None,
    }
}

/// Read a cell's calendar year: date-typed columns or date strings.
fn cell_year(col: &ArrayRef, row: usize) -> Option<i32> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Date32 => {
            let days = i64::from(col.as_primitive::<Date32Type>().value(row));
            NaiveDate::from_ymd_opt(1970, 1, 1)
                .and_then(|epoch| epoch.checked_add_signed(Duration::days(days)))
                .map(|date| date.year())
        }
        _ => cell_str(col, row).as_deref().and_then(parse_report_year),
    }
}

/// Read a cell as a non-negative count. Integer columns of any width
/// are accepted; floats only when they carry a whole value.
fn cell_count(col: &ArrayRef, row: usize) -> Option<u64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => u64::try_from(col.as_primitive::<Int32Type>().value(row)).ok(),
        DataType::Int64 => u64::try_from(col.as_primitive::<Int64Type>().value(row)).ok(),
        DataType::UInt32 => Some(u64::from(col.as_primitive::<UInt32Type>().value(row))),
        DataType::UInt64 => Some(col.as_primitive::<UInt64Type>().value(row)),
        DataType::Float64 => {
            let v = col.as_primitive::<Float64Type>().value(row);
            (v >= 0.0 && v.fract() == 0.0).then_some(v as u64)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// DataStore – memoized loads
// ---------------------------------------------------------------------------

/// Loader façade that memoizes successful loads by path, so reopening
/// a file within one session skips re-parsing. Constructed once by the
/// app and passed down by reference; datasets are shared behind `Arc`
/// and never mutated after loading.
#[derive(Default)]
pub struct DataStore {
    cache: HashMap<PathBuf, Arc<LoadReport>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, reusing the cached dataset when available.
    pub fn load(&mut self, path: &Path) -> Result<Arc<LoadReport>, LoadError> {
        if let Some(report) = self.cache.get(path) {
            log::debug!("reusing cached dataset for {}", path.display());
            return Ok(Arc::clone(report));
        }
        let report = Arc::new(load_file(path)?);
        self.cache.insert(path.to_path_buf(), Arc::clone(&report));
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
Report Date ,State, Cause of Death Description,Drug Overdose Death Count
01/01/1999 12:00:00 AM,OH,Opioid,10
01/01/1999 12:00:00 AM,OH,Heroin,5
01/01/2000 12:00:00 AM,CA,Opioid,7
";

    fn write_temp(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn csv_load_trims_headers_and_derives_year() {
        let (_dir, path) = write_temp("deaths.csv", SAMPLE_CSV);
        let report = load_file(&path).unwrap();

        assert_eq!(report.dataset.len(), 3);
        assert_eq!(report.skipped_rows, 0);
        assert_eq!(report.dataset.years, vec![1999, 2000]);
        assert_eq!(report.dataset.records[0].state, "OH");
        assert_eq!(report.dataset.records[0].deaths, 10);
    }

    #[test]
    fn malformed_rows_are_dropped_and_counted() {
        let contents = "\
Report Date,State,Cause of Death Description,Drug Overdose Death Count
01/01/1999 12:00:00 AM,OH,Opioid,10
not a date,OH,Opioid,4
01/01/2000 12:00:00 AM,,Opioid,3
01/01/2001 12:00:00 AM,CA,Heroin,many
";
        let (_dir, path) = write_temp("deaths.csv", contents);
        let report = load_file(&path).unwrap();

        assert_eq!(report.dataset.len(), 1);
        assert_eq!(report.skipped_rows, 3);
        assert_eq!(report.dataset.records[0].year, 1999);
    }

    #[test]
    fn missing_columns_name_every_absent_header() {
        let contents = "Report Date,Cause of Death Description\n01/01/1999,Opioid\n";
        let (_dir, path) = write_temp("deaths.csv", contents);

        let err = load_file(&path).unwrap_err();
        assert!(err.is_schema_failure());
        match err {
            LoadError::MissingColumns(cols) => {
                assert_eq!(cols, vec![STATE.to_string(), DEATHS.to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_open_error_not_a_panic() {
        let err = load_file(Path::new("/no/such/dir/deaths.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert!(!err.is_schema_failure());
    }

    #[test]
    fn unknown_extension_is_rejected_up_front() {
        let err = load_file(Path::new("deaths.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "xlsx"));
    }

    #[test]
    fn report_date_formats_all_parse_to_the_same_year() {
        assert_eq!(parse_report_year("01/01/2015 12:00:00 AM"), Some(2015));
        assert_eq!(parse_report_year("07/15/2015"), Some(2015));
        assert_eq!(parse_report_year("2015-07-15"), Some(2015));
        assert_eq!(parse_report_year("  2015-07-15  "), Some(2015));
        assert_eq!(parse_report_year("15/40/2015"), None);
        assert_eq!(parse_report_year("soon"), None);
    }

    #[test]
    fn json_records_orient_loads() {
        let contents = r#"[
            {"Report Date": "01/01/1999 12:00:00 AM", "State": "OH",
             "Cause of Death Description": "Opioid", "Drug Overdose Death Count": 10},
            {"Report Date": "garbage", "State": "OH",
             "Cause of Death Description": "Opioid", "Drug Overdose Death Count": 1}
        ]"#;
        let (_dir, path) = write_temp("deaths.json", contents);
        let report = load_file(&path).unwrap();

        assert_eq!(report.dataset.len(), 1);
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.dataset.records[0].year, 1999);
    }

    #[test]
    fn non_array_json_is_a_shape_error() {
        let (_dir, path) = write_temp("deaths.json", r#"{"State": "OH"}"#);
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::JsonShape));
    }

    #[test]
    fn parquet_scalar_columns_load() {
        use arrow::array::{Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new(REPORT_DATE, DataType::Utf8, false),
            Field::new(STATE, DataType::Utf8, false),
            Field::new(CAUSE, DataType::Utf8, false),
            Field::new(DEATHS, DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["01/01/1999 12:00:00 AM", "2000-01-01"])),
                Arc::new(StringArray::from(vec!["OH", "CA"])),
                Arc::new(StringArray::from(vec!["Opioid", "Heroin"])),
                Arc::new(Int64Array::from(vec![10, 7])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deaths.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let report = load_file(&path).unwrap();
        assert_eq!(report.dataset.len(), 2);
        assert_eq!(report.dataset.years, vec![1999, 2000]);
        assert_eq!(report.dataset.records[1].deaths, 7);
    }

    #[test]
    fn store_memoizes_by_path() {
        let (_dir, path) = write_temp("deaths.csv", SAMPLE_CSV);
        let mut store = DataStore::new();

        let first = store.load(&path).unwrap();
        let second = store.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn store_propagates_load_errors() {
        let mut store = DataStore::new();
        assert!(store.load(Path::new("/no/such/deaths.csv")).is_err());
    }
}
