use super::entities::{ColumnType, Operator};
use thiserror::Error;

/// Errors raised while building a filter from columns and structured conditions
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Unknown column format {0}, supported formats are: dataset-json1.1, xpt, parsed")]
    UnknownColumnFormat(String),

    #[error("Unknown variable type {data_type} for variable {column}")]
    UnknownColumnType { column: String, data_type: String },

    #[error("Variable {0} not found")]
    VariableNotFound(String),

    #[error(
        "Number of logical connectors must be equal to the number of conditions minus one \
         (got {conditions} conditions and {connectors} connectors)"
    )]
    ConnectorCount { conditions: usize, connectors: usize },

    #[error("Invalid regular expression '{pattern}' for variable {variable}: {source}")]
    InvalidPattern {
        variable: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid filter structure: {0}")]
    InvalidStructure(String),
}

/// Errors raised while evaluating a bound filter against a row
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Unknown operator {operator} for {column_type} variable {variable}")]
    UnknownOperator {
        variable: String,
        operator: Operator,
        column_type: ColumnType,
    },
}

/// Reasons a filter text could not be turned into conditions.
///
/// These never reach the caller of [`super::parse_filter_text`], which falls
/// back to an empty filter instead.
#[derive(Debug, Error)]
pub enum FilterParseError {
    #[error("Filter text does not match the filter grammar: {0}")]
    Syntax(String),
}
