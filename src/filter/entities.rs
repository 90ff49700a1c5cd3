use super::error::FilterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized type of a dataset column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Boolean,
}

impl ColumnType {
    /// Operators that may be applied to a column of this type
    pub fn operators(&self) -> &'static [Operator] {
        use Operator::*;
        match self {
            ColumnType::String => &[
                Eq,
                Ne,
                Lt,
                Le,
                Gt,
                Ge,
                In,
                NotIn,
                Contains,
                NotContains,
                Starts,
                Ends,
                Regex,
                Missing,
                NotMissing,
            ],
            ColumnType::Number => &[Eq, Ne, Lt, Le, Gt, Ge, In, NotIn, Missing, NotMissing],
            ColumnType::Boolean => &[Eq, Ne, Missing, NotMissing],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column with its normalized type, as consumed by the filter engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub data_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Finds a column by name, optionally ignoring case, returning its position too
pub fn find_column<'c>(
    columns: &'c [Column],
    name: &str,
    case_insensitive: bool,
) -> Option<(usize, &'c Column)> {
    if case_insensitive {
        let name = name.to_lowercase();
        columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.name.to_lowercase() == name)
    } else {
        columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.name == name)
    }
}

/// Comparison operators of the filter language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "eq")]
    Eq,
    #[serde(rename = "ne")]
    Ne,
    #[serde(rename = "lt")]
    Lt,
    #[serde(rename = "le")]
    Le,
    #[serde(rename = "gt")]
    Gt,
    #[serde(rename = "ge")]
    Ge,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "notin")]
    NotIn,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "notcontains")]
    NotContains,
    #[serde(rename = "starts")]
    Starts,
    #[serde(rename = "ends")]
    Ends,
    #[serde(rename = "regex")]
    Regex,
    #[serde(rename = "missing")]
    Missing,
    #[serde(rename = "notMissing")]
    NotMissing,
}

impl Operator {
    pub const ALL: [Operator; 15] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
        Operator::In,
        Operator::NotIn,
        Operator::Contains,
        Operator::NotContains,
        Operator::Starts,
        Operator::Ends,
        Operator::Regex,
        Operator::Missing,
        Operator::NotMissing,
    ];

    /// Tag used in structured filters
    pub fn tag(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::In => "in",
            Operator::NotIn => "notin",
            Operator::Contains => "contains",
            Operator::NotContains => "notcontains",
            Operator::Starts => "starts",
            Operator::Ends => "ends",
            Operator::Regex => "regex",
            Operator::Missing => "missing",
            Operator::NotMissing => "notMissing",
        }
    }

    /// Symbol used in the textual filter form
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::In => "in",
            Operator::NotIn => "notin",
            Operator::Contains => "?",
            Operator::NotContains => "!?",
            Operator::Starts => "=:",
            Operator::Ends => ":=",
            Operator::Regex => "=~",
            Operator::Missing => "missing",
            Operator::NotMissing => "notMissing",
        }
    }

    /// Human friendly label, for pickers and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Operator::NotIn => "not in",
            Operator::Contains => "contains",
            Operator::NotContains => "not contains",
            Operator::Starts => "starts with",
            Operator::Ends => "ends with",
            Operator::Regex => "regex",
            Operator::Missing => "missing",
            Operator::NotMissing => "not missing",
            other => other.symbol(),
        }
    }

    /// Look up an operator by its textual symbol. Word symbols match ignoring case.
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol().eq_ignore_ascii_case(symbol))
    }

    /// Operators written as `op(variable)`
    pub fn is_function(&self) -> bool {
        matches!(self, Operator::Missing | Operator::NotMissing)
    }

    /// Operators taking a parenthesized list of values
    pub fn is_multiple(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    pub fn allowed_for(&self, column_type: ColumnType) -> bool {
        column_type.operators().contains(self)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Zero-argument predicates written as `function(variable)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Missing,
    NotMissing,
}

impl From<Function> for Operator {
    fn from(function: Function) -> Self {
        match function {
            Function::Missing => Operator::Missing,
            Function::NotMissing => Operator::NotMissing,
        }
    }
}

impl TryFrom<Operator> for Function {
    type Error = Operator;

    fn try_from(operator: Operator) -> Result<Self, Self::Error> {
        match operator {
            Operator::Missing => Ok(Function::Missing),
            Operator::NotMissing => Ok(Function::NotMissing),
            other => Err(other),
        }
    }
}

/// Logical connector between two adjacent conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connector::And => "and",
            Connector::Or => "or",
        }
    }

    pub fn combine(&self, acc: bool, next: bool) -> bool {
        match self {
            Connector::And => acc && next,
            Connector::Or => acc || next,
        }
    }
}

impl FromStr for Connector {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("and") {
            Ok(Connector::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Connector::Or)
        } else {
            Err(FilterError::InvalidStructure(format!("Unknown connector {s}")))
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison value carried by a condition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Numbers(Vec<f64>),
    Strings(Vec<String>),
}

impl Literal {
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Equality against a row value, without any type coercion
    pub fn equals(&self, value: &Scalar) -> bool {
        match (self, value) {
            (Literal::Null, Scalar::Null) => true,
            (Literal::Bool(a), Scalar::Bool(b)) => a == b,
            (Literal::Number(a), Scalar::Number(b)) => a == b,
            (Literal::String(a), Scalar::String(b)) => a == b,
            _ => false,
        }
    }

    /// List membership. A scalar literal behaves as a one item list, null as an empty one.
    pub fn contains(&self, value: &Scalar) -> bool {
        match (self, value) {
            (Literal::Numbers(items), Scalar::Number(v)) => items.iter().any(|item| item == v),
            (Literal::Strings(items), Scalar::String(v)) => items.iter().any(|item| item == v),
            (Literal::Numbers(_) | Literal::Strings(_), _) => false,
            (scalar, value) => scalar.equals(value),
        }
    }

    /// Lower-cases textual content, leaving other variants untouched
    pub fn to_lowercase(&self) -> Literal {
        match self {
            Literal::String(s) => Literal::String(s.to_lowercase()),
            Literal::Strings(items) => {
                Literal::Strings(items.iter().map(|item| item.to_lowercase()).collect())
            }
            other => other.clone(),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Number(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Number(f64::from(value))
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<Vec<&str>> for Literal {
    fn from(values: Vec<&str>) -> Self {
        Literal::Strings(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Literal {
    fn from(values: Vec<String>) -> Self {
        Literal::Strings(values)
    }
}

impl From<Vec<f64>> for Literal {
    fn from(values: Vec<f64>) -> Self {
        Literal::Numbers(values)
    }
}

impl From<Vec<i32>> for Literal {
    fn from(values: Vec<i32>) -> Self {
        Literal::Numbers(values.into_iter().map(f64::from).collect())
    }
}

/// One atomic test against a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition", into = "RawCondition")]
pub enum Condition {
    /// `variable <symbol> <value>`
    Comparison {
        variable: String,
        operator: Operator,
        value: Literal,
    },
    /// `function(variable)`
    Function { variable: String, function: Function },
}

impl Condition {
    /// Builds a condition, using the function form for `missing` / `notMissing`
    pub fn new(variable: impl Into<String>, operator: Operator, value: impl Into<Literal>) -> Self {
        let variable = variable.into();
        match Function::try_from(operator) {
            Ok(function) => Condition::Function { variable, function },
            Err(operator) => Condition::Comparison {
                variable,
                operator,
                value: value.into(),
            },
        }
    }

    pub fn function(variable: impl Into<String>, function: Function) -> Self {
        Condition::Function {
            variable: variable.into(),
            function,
        }
    }

    pub fn variable(&self) -> &str {
        match self {
            Condition::Comparison { variable, .. } | Condition::Function { variable, .. } => {
                variable
            }
        }
    }

    pub fn operator(&self) -> Operator {
        match self {
            Condition::Comparison { operator, .. } => *operator,
            Condition::Function { function, .. } => (*function).into(),
        }
    }

    /// Comparison value; function-form conditions always compare against null
    pub fn value(&self) -> &Literal {
        match self {
            Condition::Comparison { value, .. } => value,
            Condition::Function { .. } => &Literal::Null,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Condition::Function { .. })
    }
}

/// Wire form of a condition: `{variable, operator, value, isFunction?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCondition {
    variable: String,
    operator: Operator,
    #[serde(default)]
    value: Literal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_function: Option<bool>,
}

impl TryFrom<RawCondition> for Condition {
    type Error = FilterError;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        if raw.is_function == Some(true) && !raw.operator.is_function() {
            return Err(FilterError::InvalidStructure(format!(
                "operator {} cannot be applied as a function to {}",
                raw.operator, raw.variable
            )));
        }
        Ok(Condition::new(raw.variable, raw.operator, raw.value))
    }
}

impl From<Condition> for RawCondition {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Comparison {
                variable,
                operator,
                value,
            } => RawCondition {
                variable,
                operator,
                value,
                is_function: None,
            },
            Condition::Function { variable, function } => RawCondition {
                variable,
                operator: function.into(),
                value: Literal::Null,
                is_function: Some(true),
            },
        }
    }
}

/// Evaluation options carried by a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    /// Compare string values ignoring case
    pub case_insensitive: bool,
}

/// Flat list of conditions joined left to right by connectors
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BasicFilter {
    pub conditions: Vec<Condition>,
    pub connectors: Vec<Connector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<FilterOptions>,
}

impl BasicFilter {
    pub fn new(conditions: Vec<Condition>, connectors: Vec<Connector>) -> Self {
        Self {
            conditions,
            connectors,
            options: None,
        }
    }

    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn case_insensitive(&self) -> bool {
        self.options.is_some_and(|o| o.case_insensitive)
    }
}

/// A single cell of a dataset row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    /// Null or the empty string
    pub fn is_missing(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(f64::from(value))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

/// Cells aligned by position with the bound column list
pub type Row = Vec<Scalar>;
