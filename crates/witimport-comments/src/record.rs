//! CSV rows and the per-work-item records expanded from them

use std::path::Path;

use indexmap::IndexMap;

use crate::error::{InputError, ParseError};

/// Human-readable label rendered as the comment table caption
pub const TITLE_COLUMN: &str = "Title";
/// `;`-separated list of target work item ids
pub const WORK_ITEM_ID_COLUMN: &str = "WorkItemId";

/// Positive work item identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkItemId(pub u64);

impl std::fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One parsed CSV line.
///
/// The reserved columns are lifted out; `fields` keeps every other column
/// in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub title: String,
    /// Raw `WorkItemId` cell, not yet split
    pub work_item_ids: String,
    pub fields: IndexMap<String, String>,
}

/// A row scoped to exactly one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedRecord {
    pub title: String,
    pub work_item_id: WorkItemId,
    pub fields: IndexMap<String, String>,
}

impl ExpandedRecord {
    pub fn from_row(row: &Row, work_item_id: WorkItemId) -> Self {
        Self {
            title: row.title.clone(),
            work_item_id,
            fields: row.fields.clone(),
        }
    }
}

/// Read the CSV file, rejecting empty content.
pub fn read_source(path: &Path) -> Result<String, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Err(InputError::Empty);
    }
    Ok(text)
}

/// Reject blank input, then parse.
pub fn parse_input(text: &str) -> Result<Vec<Row>, InputError> {
    if text.trim().is_empty() {
        return Err(InputError::Empty);
    }
    Ok(parse_rows(text)?)
}

/// Parse CSV text with a header line into rows.
///
/// Every line must have as many cells as the header. A missing `Title`
/// column yields empty titles; a missing `WorkItemId` column is an error.
pub fn parse_rows(text: &str) -> Result<Vec<Row>, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == WORK_ITEM_ID_COLUMN) {
        return Err(ParseError::MissingColumn(WORK_ITEM_ID_COLUMN));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut title = String::new();
        let mut work_item_ids = String::new();
        let mut fields = IndexMap::with_capacity(headers.len().saturating_sub(2));
        // Repeated headers: first position, last value; reserved names never become fields
        for (name, value) in headers.iter().zip(record.iter()) {
            match name {
                TITLE_COLUMN => title = value.to_string(),
                WORK_ITEM_ID_COLUMN => work_item_ids = value.to_string(),
                _ => {
                    fields.insert(name.to_string(), value.to_string());
                }
            }
        }
        rows.push(Row {
            title,
            work_item_ids,
            fields,
        });
    }

    log::debug!("Parsed {} rows, {} columns", rows.len(), headers.len());
    Ok(rows)
}
