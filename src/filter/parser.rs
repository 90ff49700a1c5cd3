use super::entities::{
    BasicFilter, Column, ColumnType, Condition, Connector, Function, Literal, Operator, find_column,
};
use super::error::FilterParseError;
use super::grammar::grammar;
use tracing::debug;

/// Raw tokens of one condition as written in the filter text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConditionTokens<'a> {
    Function {
        function: &'a str,
        variable: &'a str,
    },
    Comparison {
        variable: &'a str,
        comparator: &'a str,
        value: &'a str,
    },
}

impl<'a> ConditionTokens<'a> {
    pub(crate) fn variable(&self) -> &'a str {
        match self {
            ConditionTokens::Function { variable, .. }
            | ConditionTokens::Comparison { variable, .. } => variable,
        }
    }
}

/// Filter text split into condition tokens and connectors
#[derive(Debug, Default)]
pub(crate) struct TokenizedFilter<'a> {
    pub conditions: Vec<ConditionTokens<'a>>,
    pub connectors: Vec<Connector>,
}

/// Splits trimmed filter text into conditions and connectors.
///
/// The grammar is flat, so conditions are peeled off the front of the text
/// one at a time together with the connector that follows them.
pub(crate) fn tokenize(text: &str) -> Result<TokenizedFilter<'_>, FilterParseError> {
    let g = grammar();
    let syntax = || FilterParseError::Syntax(text.to_string());

    let caps = g.filter.captures(text).ok_or_else(syntax)?;
    let head = caps.name("head").ok_or_else(syntax)?;
    let has_tail = caps.name("tail").is_some_and(|tail| !tail.as_str().is_empty());

    let mut raw_conditions = Vec::new();
    let mut connectors = Vec::new();

    if !has_tail {
        raw_conditions.push(head.as_str());
    } else {
        let mut rest = text;
        while !rest.is_empty() {
            let caps = g.leading_condition.captures(rest).ok_or_else(syntax)?;
            let condition = caps.name("condition").ok_or_else(syntax)?;
            raw_conditions.push(condition.as_str());

            if let Some(connector) = caps.name("connector") {
                connectors.push(connector.as_str().parse().map_err(|_| syntax())?);
            }

            let consumed = caps.get(0).map_or(condition.end(), |m| m.end());
            rest = rest[consumed..].trim_start();
        }
    }

    if connectors.len() + 1 != raw_conditions.len() {
        return Err(syntax());
    }

    let conditions = raw_conditions
        .into_iter()
        .map(|raw| tokenize_condition(raw).ok_or_else(syntax))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TokenizedFilter {
        conditions,
        connectors,
    })
}

fn tokenize_condition(raw: &str) -> Option<ConditionTokens<'_>> {
    let caps = grammar().condition.captures(raw)?;

    if let (Some(function), Some(variable)) = (caps.name("function"), caps.name("function_variable"))
    {
        return Some(ConditionTokens::Function {
            function: function.as_str(),
            variable: variable.as_str(),
        });
    }

    let variable = caps.name("variable")?.as_str();
    let (comparator, value) = match (caps.name("comparator"), caps.name("value")) {
        (Some(comparator), Some(value)) => (comparator, value),
        _ => (caps.name("multi_comparator")?, caps.name("values")?),
    };

    Some(ConditionTokens::Comparison {
        variable,
        comparator: comparator.as_str(),
        value: value.as_str(),
    })
}

/// Converts filter text into a structured filter.
///
/// Text that cannot be parsed yields an empty filter.
pub fn parse_filter_text(
    text: &str,
    columns: &[Column],
    case_insensitive_col_names: bool,
) -> BasicFilter {
    match try_parse_filter_text(text, columns, case_insensitive_col_names) {
        Ok(filter) => filter,
        Err(err) => {
            debug!(error = %err, "filter text ignored");
            BasicFilter::default()
        }
    }
}

/// Like [`parse_filter_text`], but reports why the text was rejected
pub fn try_parse_filter_text(
    text: &str,
    columns: &[Column],
    case_insensitive_col_names: bool,
) -> Result<BasicFilter, FilterParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(BasicFilter::default());
    }

    let tokens = tokenize(text)?;
    let conditions = tokens
        .conditions
        .iter()
        .map(|tokens| build_condition(tokens, columns, case_insensitive_col_names))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BasicFilter::new(conditions, tokens.connectors))
}

fn build_condition(
    tokens: &ConditionTokens<'_>,
    columns: &[Column],
    case_insensitive_col_names: bool,
) -> Result<Condition, FilterParseError> {
    let column = find_column(columns, tokens.variable(), case_insensitive_col_names)
        .map(|(_, column)| column);
    // Unknown variables are kept as written; binding reports them.
    let variable = column.map_or(tokens.variable(), |c| c.name.as_str());

    match *tokens {
        ConditionTokens::Function { function, .. } => {
            let function = Operator::from_symbol(function)
                .and_then(|op| Function::try_from(op).ok())
                .ok_or_else(|| FilterParseError::Syntax(function.to_string()))?;
            Ok(Condition::function(variable, function))
        }
        ConditionTokens::Comparison {
            comparator, value, ..
        } => {
            let operator = Operator::from_symbol(comparator).unwrap_or(Operator::Eq);
            let value = coerce_literal(value, operator, column.map(|c| c.data_type));
            Ok(Condition::new(variable, operator, value))
        }
    }
}

/// Turns literal text into a value of the column's type.
///
/// Numbers take the longest numeric prefix of the text; text with none
/// becomes NaN, which no row value equals or orders against.
fn coerce_literal(text: &str, operator: Operator, column_type: Option<ColumnType>) -> Literal {
    let text = text.trim();
    if text.eq_ignore_ascii_case("null") {
        return Literal::Null;
    }

    let multiple = operator.is_multiple();
    match column_type {
        Some(ColumnType::Number) if multiple => {
            Literal::Numbers(list_items(text).map(parse_number).collect())
        }
        Some(ColumnType::Number) => Literal::Number(parse_number(text)),
        Some(ColumnType::Boolean) => Literal::Bool(text.eq_ignore_ascii_case("true")),
        Some(ColumnType::String) if multiple => Literal::Strings(
            list_items(text)
                .map(|item| unquote(item).to_string())
                .collect(),
        ),
        Some(ColumnType::String) => Literal::String(unquote(text).to_string()),
        None => Literal::String(text.to_string()),
    }
}

/// Items of a parenthesised list, quoted items kept whole
fn list_items(text: &str) -> impl Iterator<Item = &str> {
    let body = text
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(text);
    grammar().item.find_iter(body).map(|m| m.as_str())
}

fn parse_number(text: &str) -> f64 {
    grammar()
        .numeral_prefix
        .find(text.trim())
        .and_then(|numeral| numeral.as_str().parse().ok())
        .unwrap_or(f64::NAN)
}

/// Strips one layer of matching quotes
fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}
