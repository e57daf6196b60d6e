//! Error types for reading input and exporting failures
//!
//! Per-record dispatch failures are not errors here: they are recorded as a
//! failed [`Outcome`](crate::dispatch::Outcome) and never abort a run.

use std::path::PathBuf;

/// The CSV text could not be turned into rows.
#[derive(Debug)]
pub enum ParseError {
    /// Malformed quoting, inconsistent column count, invalid UTF-8
    Csv(csv::Error),
    /// Header lacks a reserved column
    MissingColumn(&'static str),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(e) => write!(f, "malformed CSV: {e}"),
            Self::MissingColumn(name) => write!(f, "missing required column '{name}'"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv(e) => Some(e),
            Self::MissingColumn(_) => None,
        }
    }
}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

/// Input rejected before any network activity.
#[derive(Debug)]
pub enum InputError {
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// No content, or whitespace only
    Empty,
    Parse(ParseError),
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            Self::Empty => write!(f, "CSV file is empty"),
            Self::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            Self::Empty => None,
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<ParseError> for InputError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

/// The failure CSV could not be produced or handed to the sink.
#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(e) => write!(f, "CSV encoding: {e}"),
            Self::Io(e) => write!(f, "IO: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
