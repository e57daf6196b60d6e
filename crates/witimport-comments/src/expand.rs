//! Row → per-work-item record expansion
//!
//! A row listing `12;34` becomes two records. Tokens that do not clean up
//! to a positive integer are dropped without failing the row.

use crate::record::{ExpandedRecord, Row, WorkItemId};

/// Separator inside the `WorkItemId` cell
pub const ID_SEPARATOR: char = ';';

/// Strip every non-digit and parse what remains as a positive id.
///
/// `" #12 "` → 12. Empty, zero, and overflowing tokens yield `None`.
pub fn clean_identifier(token: &str) -> Option<WorkItemId> {
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse::<u64>()
        .ok()
        .filter(|&id| id > 0)
        .map(WorkItemId)
}

/// Expand rows into records, preserving row order then token order.
pub fn expand(rows: &[Row]) -> Vec<ExpandedRecord> {
    rows.iter()
        .flat_map(|row| {
            row.work_item_ids
                .split(ID_SEPARATOR)
                .filter_map(clean_identifier)
                .map(move |id| ExpandedRecord::from_row(row, id))
        })
        .collect()
}

/// Number of raw tokens across all rows, valid or not.
pub fn token_count(rows: &[Row]) -> usize {
    rows.iter()
        .map(|row| row.work_item_ids.split(ID_SEPARATOR).count())
        .sum()
}
