use std::collections::{BTreeMap, HashMap};

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Reducers over the filtered view
// ---------------------------------------------------------------------------
//
// Each reducer takes the dataset plus the surviving indices produced by
// the filter stage. The four chart views all derive from the same
// filtered view; none of them feeds another.

/// Total deaths per year, ascending by year.
///
/// Rows sharing a year are summed, never averaged or overwritten. The
/// ascending order keeps the trend line monotonically sequenced on the
/// x-axis.
pub fn sum_by_year(dataset: &Dataset, indices: &[usize]) -> Vec<(i32, u64)> {
    let mut totals: BTreeMap<i32, u64> = BTreeMap::new();
    for &idx in indices {
        let rec = &dataset.records[idx];
        *totals.entry(rec.year).or_insert(0) += rec.deaths;
    }
    totals.into_iter().collect()
}

/// Total deaths per state, in first-seen order.
///
/// The bar chart does not need a sorted axis, but the order has to be
/// deterministic for a given view, so states appear in the order their
/// first surviving row does.
pub fn sum_by_state(dataset: &Dataset, indices: &[usize]) -> Vec<(String, u64)> {
    let mut totals: Vec<(String, u64)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for &idx in indices {
        let rec = &dataset.records[idx];
        match slot.get(rec.state.as_str()) {
            Some(&pos) => totals[pos].1 += rec.deaths,
            None => {
                slot.insert(&rec.state, totals.len());
                totals.push((rec.state.clone(), rec.deaths));
            }
        }
    }
    totals
}

/// Raw pass-through: the surviving records themselves, in dataset
/// order. Feeds the cause scatter and the count distribution views
/// unaggregated.
pub fn survivors<'a>(dataset: &'a Dataset, indices: &[usize]) -> Vec<&'a Record> {
    indices.iter().map(|&idx| &dataset.records[idx]).collect()
}
