use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// One row of the overdose table: the number of deaths recorded for a
/// year / state / cause-of-death combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Calendar year, projected out of `Report Date` at load time.
    pub year: i32,
    /// Reporting state.
    pub state: String,
    /// Cause-of-death description as it appears in the source file.
    pub cause: String,
    /// Drug overdose death count. Non-negative by construction.
    pub deaths: u64,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full loaded table plus precomputed selector domains.
///
/// Immutable after construction: filtering and aggregation only ever
/// produce derived index vectors and fresh sequences, never touch the
/// records themselves.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All records, in file order.
    pub records: Vec<Record>,
    /// Sorted distinct years.
    pub years: Vec<i32>,
    /// Sorted distinct state names.
    pub states: Vec<String>,
    /// Sorted distinct cause-of-death descriptions.
    pub causes: Vec<String>,
}

impl Dataset {
    /// Build the selector domains from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut years: BTreeSet<i32> = BTreeSet::new();
        let mut states: BTreeSet<&str> = BTreeSet::new();
        let mut causes: BTreeSet<&str> = BTreeSet::new();

        for rec in &records {
            years.insert(rec.year);
            states.insert(&rec.state);
            causes.insert(&rec.cause);
        }

        let states: Vec<String> = states.into_iter().map(str::to_owned).collect();
        let causes: Vec<String> = causes.into_iter().map(str::to_owned).collect();
        Dataset {
            records,
            years: years.into_iter().collect(),
            states,
            causes,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
