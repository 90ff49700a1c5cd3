use crate::columns::{ColumnFormat, SourceColumn, normalize_columns};
use crate::filter::{
    BasicFilter, Column, EvaluationError, FilterError, FilterOptions, ResolvedFilter, Row,
    Scalar, filter_to_text, parse_filter_text, validate_filter_text,
};

/// A filter given either as text or in structured form
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSource {
    Text(String),
    Structured(BasicFilter),
}

impl From<&str> for FilterSource {
    fn from(text: &str) -> Self {
        FilterSource::Text(text.to_string())
    }
}

impl From<String> for FilterSource {
    fn from(text: String) -> Self {
        FilterSource::Text(text)
    }
}

impl From<BasicFilter> for FilterSource {
    fn from(filter: BasicFilter) -> Self {
        FilterSource::Structured(filter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindOptions {
    /// Match variables to column names ignoring case
    pub case_insensitive_col_names: bool,
    /// Overrides the value case sensitivity carried by the filter itself
    pub case_insensitive_values: Option<bool>,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            case_insensitive_col_names: true,
            case_insensitive_values: None,
        }
    }
}

/// Filters rows of a dataset whose columns are described in one of the
/// supported metadata formats.
///
/// ```
/// use dataset_filter::{BindOptions, ColumnFormat, DatasetFilter, Scalar, SourceColumn};
///
/// let columns = vec![
///     SourceColumn::new("AGE", "integer"),
///     SourceColumn::new("SEX", "string"),
/// ];
/// let filter = DatasetFilter::new(
///     ColumnFormat::DatasetJson,
///     &columns,
///     r#"AGE > 80 and SEX = "M""#,
///     BindOptions::default(),
/// )
/// .unwrap();
///
/// let row = vec![Scalar::from(85), Scalar::from("M")];
/// assert!(filter.filter_row(&row).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct DatasetFilter {
    format: ColumnFormat,
    columns: Vec<Column>,
    case_insensitive_col_names: bool,
    resolved: ResolvedFilter,
}

impl DatasetFilter {
    pub fn new(
        format: ColumnFormat,
        source_columns: &[SourceColumn],
        filter: impl Into<FilterSource>,
        options: BindOptions,
    ) -> Result<Self, FilterError> {
        let columns = normalize_columns(format, source_columns)?;
        let resolved = bind(filter.into(), &columns, options)?;
        Ok(Self {
            format,
            columns,
            case_insensitive_col_names: options.case_insensitive_col_names,
            resolved,
        })
    }

    /// Replaces the filter, and the columns when given.
    ///
    /// The previous state is kept if binding the new filter fails.
    pub fn update(
        &mut self,
        filter: impl Into<FilterSource>,
        source_columns: Option<&[SourceColumn]>,
        options: BindOptions,
    ) -> Result<(), FilterError> {
        let columns = match source_columns {
            Some(source_columns) => normalize_columns(self.format, source_columns)?,
            None => self.columns.clone(),
        };
        let resolved = bind(filter.into(), &columns, options)?;

        self.columns = columns;
        self.case_insensitive_col_names = options.case_insensitive_col_names;
        self.resolved = resolved;
        Ok(())
    }

    pub fn filter_row(&self, row: &[Scalar]) -> Result<bool, EvaluationError> {
        self.resolved.evaluate_row(row)
    }

    /// Rows accepted by the filter, in their original order
    pub fn filter_rows<'r>(&self, rows: &'r [Row]) -> Result<Vec<&'r Row>, EvaluationError> {
        self.resolved.filter_rows(rows)
    }

    pub fn filter_rows_owned(&self, rows: Vec<Row>) -> Result<Vec<Row>, EvaluationError> {
        let mut matched = Vec::new();
        for row in rows {
            if self.filter_row(&row)? {
                matched.push(row);
            }
        }
        Ok(matched)
    }

    /// Canonical text of the bound filter
    pub fn to_text(&self) -> String {
        filter_to_text(self.resolved.basic_filter())
    }

    pub fn to_basic_filter(&self) -> BasicFilter {
        self.resolved.basic_filter().clone()
    }

    pub fn validate_filter_text(&self, text: &str) -> bool {
        validate_filter_text(text, &self.columns, self.case_insensitive_col_names)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn format(&self) -> ColumnFormat {
        self.format
    }

    pub fn resolved(&self) -> &ResolvedFilter {
        &self.resolved
    }
}

fn bind(
    source: FilterSource,
    columns: &[Column],
    options: BindOptions,
) -> Result<ResolvedFilter, FilterError> {
    let mut filter = match source {
        FilterSource::Text(text) => {
            parse_filter_text(&text, columns, options.case_insensitive_col_names)
        }
        FilterSource::Structured(filter) => filter,
    };
    if let Some(case_insensitive) = options.case_insensitive_values {
        filter.options = Some(FilterOptions { case_insensitive });
    }
    ResolvedFilter::bind(filter, columns, options.case_insensitive_col_names)
}
