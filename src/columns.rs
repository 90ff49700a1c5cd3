use crate::filter::{Column, ColumnType, FilterError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How column types are named in the dataset the columns come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnFormat {
    #[default]
    #[serde(rename = "dataset-json1.1")]
    DatasetJson,
    #[serde(rename = "xpt")]
    Xpt,
    /// Column types are already `string`, `number` or `boolean`
    #[serde(rename = "parsed")]
    Parsed,
}

impl ColumnFormat {
    pub const ALL: [ColumnFormat; 3] = [
        ColumnFormat::DatasetJson,
        ColumnFormat::Xpt,
        ColumnFormat::Parsed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnFormat::DatasetJson => "dataset-json1.1",
            ColumnFormat::Xpt => "xpt",
            ColumnFormat::Parsed => "parsed",
        }
    }

    pub fn adapter(&self) -> &'static dyn ColumnAdapter {
        match self {
            ColumnFormat::DatasetJson => &DatasetJsonAdapter,
            ColumnFormat::Xpt => &XptAdapter,
            ColumnFormat::Parsed => &ParsedAdapter,
        }
    }
}

impl FromStr for ColumnFormat {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| FilterError::UnknownColumnFormat(s.to_string()))
    }
}

impl fmt::Display for ColumnFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column metadata as declared by the data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceColumn {
    pub name: String,
    pub data_type: String,
}

impl SourceColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Maps a source type name onto one of the filter column types
pub trait ColumnAdapter: Send + Sync {
    fn column_type(&self, data_type: &str) -> Option<ColumnType>;

    fn normalize(&self, column: &SourceColumn) -> Result<Column, FilterError> {
        let data_type =
            self.column_type(&column.data_type)
                .ok_or_else(|| FilterError::UnknownColumnType {
                    column: column.name.clone(),
                    data_type: column.data_type.clone(),
                })?;
        Ok(Column::new(column.name.clone(), data_type))
    }
}

pub struct DatasetJsonAdapter;

impl ColumnAdapter for DatasetJsonAdapter {
    fn column_type(&self, data_type: &str) -> Option<ColumnType> {
        match data_type {
            "string" | "date" | "datetime" | "time" | "decimal" | "URI" => Some(ColumnType::String),
            "integer" | "float" | "double" => Some(ColumnType::Number),
            "boolean" => Some(ColumnType::Boolean),
            _ => None,
        }
    }
}

pub struct XptAdapter;

impl ColumnAdapter for XptAdapter {
    fn column_type(&self, data_type: &str) -> Option<ColumnType> {
        match data_type {
            "Char" => Some(ColumnType::String),
            "Num" => Some(ColumnType::Number),
            _ => None,
        }
    }
}

pub struct ParsedAdapter;

impl ColumnAdapter for ParsedAdapter {
    fn column_type(&self, data_type: &str) -> Option<ColumnType> {
        match data_type {
            "string" => Some(ColumnType::String),
            "number" => Some(ColumnType::Number),
            "boolean" => Some(ColumnType::Boolean),
            _ => None,
        }
    }
}

/// Normalizes source columns, keeping their order
pub fn normalize_columns(
    format: ColumnFormat,
    columns: &[SourceColumn],
) -> Result<Vec<Column>, FilterError> {
    let adapter = format.adapter();
    columns.iter().map(|column| adapter.normalize(column)).collect()
}
