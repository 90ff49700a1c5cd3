use super::entities::{BasicFilter, Column, ColumnType, Connector, Literal, Operator, find_column};
use super::error::FilterError;
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// A condition bound to a column position, ready for row evaluation
#[derive(Debug, Clone)]
pub(crate) struct ResolvedCondition {
    pub variable: String,
    pub index: usize,
    pub column_type: ColumnType,
    pub operator: Operator,
    /// Comparison value, lower-cased up front for case-insensitive string columns
    pub value: Literal,
    /// Compiled pattern of a `regex` condition
    pub pattern: Option<Regex>,
}

/// A filter whose conditions are bound to column positions.
///
/// Built in full from a [`BasicFilter`] and a column list; replacing the
/// filter or the columns means binding a new one.
#[derive(Debug, Clone)]
pub struct ResolvedFilter {
    filter: BasicFilter,
    pub(crate) conditions: Vec<ResolvedCondition>,
    pub(crate) case_insensitive: bool,
    only_and_connectors: bool,
    only_or_connectors: bool,
}

impl ResolvedFilter {
    /// Binds every condition to its column.
    ///
    /// Fails when a variable is not among `columns` or when the number of
    /// connectors is not one less than the number of conditions.
    pub fn bind(
        filter: BasicFilter,
        columns: &[Column],
        case_insensitive_col_names: bool,
    ) -> Result<Self, FilterError> {
        let case_insensitive = filter.case_insensitive();

        let mut conditions = Vec::with_capacity(filter.conditions.len());
        for condition in &filter.conditions {
            let variable = condition.variable();
            let (index, column) = find_column(columns, variable, case_insensitive_col_names)
                .ok_or_else(|| FilterError::VariableNotFound(variable.to_string()))?;
            conditions.push(resolve_condition(
                variable,
                index,
                column.data_type,
                condition.operator(),
                condition.value(),
                case_insensitive,
            )?);
        }

        let expected = filter.conditions.len().saturating_sub(1);
        if filter.connectors.len() != expected {
            return Err(FilterError::ConnectorCount {
                conditions: filter.conditions.len(),
                connectors: filter.connectors.len(),
            });
        }

        let only_and_connectors = filter.connectors.iter().all(|c| *c == Connector::And);
        let only_or_connectors = filter.connectors.iter().all(|c| *c == Connector::Or);

        debug!(
            conditions = conditions.len(),
            only_and_connectors, only_or_connectors, case_insensitive, "filter bound"
        );

        Ok(Self {
            filter,
            conditions,
            case_insensitive,
            only_and_connectors,
            only_or_connectors,
        })
    }

    pub fn basic_filter(&self) -> &BasicFilter {
        &self.filter
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.filter.connectors
    }

    /// Column position of each condition, in condition order
    pub fn variable_indices(&self) -> Vec<usize> {
        self.conditions.iter().map(|c| c.index).collect()
    }

    /// Column type of each condition, in condition order
    pub fn variable_types(&self) -> Vec<ColumnType> {
        self.conditions.iter().map(|c| c.column_type).collect()
    }

    pub fn only_and_connectors(&self) -> bool {
        self.only_and_connectors
    }

    pub fn only_or_connectors(&self) -> bool {
        self.only_or_connectors
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

fn resolve_condition(
    variable: &str,
    index: usize,
    column_type: ColumnType,
    operator: Operator,
    value: &Literal,
    case_insensitive: bool,
) -> Result<ResolvedCondition, FilterError> {
    let fold = case_insensitive && column_type == ColumnType::String;

    let pattern = match value {
        Literal::String(pattern) if operator == Operator::Regex && column_type == ColumnType::String => {
            let compiled = RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|source| FilterError::InvalidPattern {
                    variable: variable.to_string(),
                    pattern: pattern.clone(),
                    source,
                })?;
            Some(compiled)
        }
        _ => None,
    };

    let value = if fold && operator != Operator::Regex {
        value.to_lowercase()
    } else {
        value.clone()
    };

    Ok(ResolvedCondition {
        variable: variable.to_string(),
        index,
        column_type,
        operator,
        value,
        pattern,
    })
}
