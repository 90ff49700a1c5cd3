//! Reader for newline-delimited Dataset-JSON files.
//!
//! The first non-empty line is a metadata object carrying the `columns`
//! array; every following line is one row given as a JSON array.

use crate::columns::{ColumnFormat, SourceColumn};
use crate::filter::Row;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Dataset file '{path}' has no metadata line")]
    Empty { path: String },
    #[error("Invalid metadata in dataset file '{path}': {source}")]
    Metadata {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid row at line {line} of dataset file '{path}': {source}")]
    Row {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub columns: Vec<SourceColumn>,
    /// Metadata format of `columns`, Dataset-JSON when absent
    #[serde(default)]
    pub column_format: Option<ColumnFormat>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub metadata: DatasetMetadata,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn column_format(&self) -> ColumnFormat {
        self.metadata.column_format.unwrap_or_default()
    }
}

pub fn read_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path_display.clone(),
        source,
    })?;
    parse_dataset(&raw, &path_display)
}

/// Parses dataset content; `origin` names the source in error messages
pub fn parse_dataset(content: &str, origin: &str) -> Result<Dataset, DatasetError> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines.next().ok_or_else(|| DatasetError::Empty {
        path: origin.to_string(),
    })?;
    let metadata: DatasetMetadata =
        serde_json::from_str(header).map_err(|source| DatasetError::Metadata {
            path: origin.to_string(),
            source,
        })?;

    let rows = lines
        .map(|(index, line)| {
            serde_json::from_str::<Row>(line).map_err(|source| DatasetError::Row {
                path: origin.to_string(),
                line: index + 1,
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        origin,
        columns = metadata.columns.len(),
        rows = rows.len(),
        "dataset loaded"
    );
    Ok(Dataset { metadata, rows })
}
