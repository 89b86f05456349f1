use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const CSV_PATH: &str = "data/drug_overdose_deaths.csv";
const PARQUET_PATH: &str = "data/drug_overdose_deaths.parquet";

/// 1999 baseline deaths per state; later years grow from these.
const STATES: [(&str, f64); 8] = [
    ("California", 1100.0),
    ("Texas", 700.0),
    ("Florida", 800.0),
    ("New York", 900.0),
    ("Ohio", 600.0),
    ("Pennsylvania", 650.0),
    ("Illinois", 550.0),
    ("Michigan", 500.0),
];

/// Cause descriptions with their share of a state's total. The
/// categories overlap, so the shares do not sum to one.
const CAUSES: [(&str, f64); 5] = [
    ("All Drug Overdose Deaths", 1.0),
    ("Opioid Overdose Deaths", 0.55),
    ("Synthetic Opioid Overdose Deaths", 0.30),
    ("Heroin Overdose Deaths", 0.22),
    ("Cocaine Overdose Deaths", 0.14),
];

const FIRST_YEAR: i32 = 1999;
const LAST_YEAR: i32 = 2018;

/// Year-on-year growth of the overall death counts.
const GROWTH_RATE: f64 = 0.068;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Serialize)]
struct SampleRow {
    #[serde(rename = "Report Date")]
    report_date: String,
    #[serde(rename = "State")]
    state: &'static str,
    #[serde(rename = "Cause of Death Description")]
    cause: &'static str,
    #[serde(rename = "Drug Overdose Death Count")]
    deaths: u64,
}

/// One row per state, cause, and year: an exponential trend from the
/// state baseline with a little noise on top.
fn generate_rows(rng: &mut SimpleRng) -> Vec<SampleRow> {
    let mut rows = Vec::new();

    for &(state, baseline) in &STATES {
        for &(cause, share) in &CAUSES {
            for year in FIRST_YEAR..=LAST_YEAR {
                let growth = (1.0 + GROWTH_RATE).powi(year - FIRST_YEAR);
                let expected = baseline * share * growth;
                let deaths = (expected + rng.gauss(0.0, expected * 0.08))
                    .max(0.0)
                    .round() as u64;

                rows.push(SampleRow {
                    report_date: format!("01/01/{year} 12:00:00 AM"),
                    state,
                    cause,
                    deaths,
                });
            }
        }
    }

    rows
}

fn write_csv(rows: &[SampleRow], path: &str) -> Result<()> {
    // The header row comes from the serde field renames.
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[SampleRow], path: &str) -> Result<()> {
    let date_array = StringArray::from(
        rows.iter()
            .map(|r| r.report_date.as_str())
            .collect::<Vec<_>>(),
    );
    let state_array = StringArray::from(rows.iter().map(|r| r.state).collect::<Vec<_>>());
    let cause_array = StringArray::from(rows.iter().map(|r| r.cause).collect::<Vec<_>>());
    let deaths_array = Int64Array::from(rows.iter().map(|r| r.deaths as i64).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Report Date", DataType::Utf8, false),
        Field::new("State", DataType::Utf8, false),
        Field::new("Cause of Death Description", DataType::Utf8, false),
        Field::new("Drug Overdose Death Count", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(date_array),
            Arc::new(state_array),
            Arc::new(cause_array),
            Arc::new(deaths_array),
        ],
    )?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    std::fs::create_dir_all("data").context("creating the data directory")?;
    write_csv(&rows, CSV_PATH).with_context(|| format!("writing {CSV_PATH}"))?;
    write_parquet(&rows, PARQUET_PATH).with_context(|| format!("writing {PARQUET_PATH}"))?;

    println!(
        "Wrote {} rows ({} states, {} causes, {FIRST_YEAR}-{LAST_YEAR}) to {CSV_PATH} and {PARQUET_PATH}",
        rows.len(),
        STATES.len(),
        CAUSES.len()
    );
    Ok(())
}
