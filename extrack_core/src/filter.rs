//! Log filtering over a user's exercise history.
//!
//! A single pass in storage order keeps the records whose date lies inside
//! the normalized range, then stops once the limit is reached. Records are
//! never re-sorted, so entries sharing a date keep their append order.

use crate::range::NormalizedRange;
use crate::Exercise;

/// The bounded, ordered subset selected for a log
#[derive(Debug, PartialEq)]
pub struct FilteredLog<'a> {
    pub entries: Vec<&'a Exercise>,
}

impl FilteredLog<'_> {
    /// Number of entries returned, after truncation
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

/// Select the exercises inside `range`, truncated to its `max_count`
pub fn filter_log<'a>(exercises: &'a [Exercise], range: &NormalizedRange) -> FilteredLog<'a> {
    let matching = exercises.iter().filter(|e| range.contains(e.date));
    let entries: Vec<&Exercise> = match range.max_count {
        Some(max) => matching.take(max).collect(),
        None => matching.collect(),
    };

    tracing::debug!(
        total = exercises.len(),
        returned = entries.len(),
        "Filtered exercise log"
    );
    FilteredLog { entries }
}
