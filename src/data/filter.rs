use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Selector – the filter choice for a single dimension
// ---------------------------------------------------------------------------

/// Filter choice for one dimension: either unconstrained or an exact
/// value drawn from the dataset's distinct values. "No filter" is a
/// variant, not a sentinel string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector<T> {
    /// No constraint ("All" in the UI).
    #[default]
    All,
    /// Keep only records whose field equals the value.
    Only(T),
}

impl<T: PartialEq> Selector<T> {
    /// Whether `value` passes this selector.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(only) => only == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }
}

// ---------------------------------------------------------------------------
// Selection – the three dashboard selectors
// ---------------------------------------------------------------------------

/// The complete filter state: year, state, and cause selectors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub year: Selector<i32>,
    pub state: Selector<String>,
    pub cause: Selector<String>,
}

impl Selection {
    /// Conjunctive test: a record survives iff every selector admits
    /// it, so the order the predicates are checked in never matters.
    fn admits(&self, rec: &Record) -> bool {
        self.year.admits(&rec.year)
            && self.state.admits(&rec.state)
            && self.cause.admits(&rec.cause)
    }
}

/// Return indices of records that pass all active selectors.
///
/// The dataset is never mutated; the result is a fresh index vector
/// into `dataset.records`, in dataset order. An empty result is a
/// valid state, not an error.
pub fn filtered_indices(dataset: &Dataset, selection: &Selection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.admits(rec))
        .map(|(i, _)| i)
        .collect()
}
