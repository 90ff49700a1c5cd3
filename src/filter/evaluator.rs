use super::entities::{ColumnType, Literal, Operator, Row, Scalar};
use super::error::EvaluationError;
use super::resolved::{ResolvedCondition, ResolvedFilter};
use std::borrow::Cow;
use std::cmp::Ordering;

static NULL: Scalar = Scalar::Null;

impl ResolvedFilter {
    /// Evaluates the filter against one row.
    ///
    /// Conditions are applied left to right; each connector combines the
    /// running result with the condition after it. When every connector is
    /// `and` (or every one is `or`) evaluation stops as soon as the result can
    /// no longer change. A filter without conditions accepts every row.
    pub fn evaluate_row(&self, row: &[Scalar]) -> Result<bool, EvaluationError> {
        self.fold_conditions(row, true)
    }

    /// Rows accepted by the filter, in their original order
    pub fn filter_rows<'r>(&self, rows: &'r [Row]) -> Result<Vec<&'r Row>, EvaluationError> {
        let mut matched = Vec::new();
        for row in rows {
            if self.evaluate_row(row)? {
                matched.push(row);
            }
        }
        Ok(matched)
    }

    fn fold_conditions(&self, row: &[Scalar], short_circuit: bool) -> Result<bool, EvaluationError> {
        if self.conditions.is_empty() {
            return Ok(true);
        }

        let connectors = self.connectors();
        let mut result = false;
        for (i, condition) in self.conditions.iter().enumerate() {
            let outcome = condition.evaluate(row, self.case_insensitive)?;
            result = match i.checked_sub(1).and_then(|prev| connectors.get(prev)) {
                Some(connector) => connector.combine(result, outcome),
                None => outcome,
            };

            if short_circuit
                && ((self.only_and_connectors() && !result)
                    || (self.only_or_connectors() && result))
            {
                break;
            }
        }
        Ok(result)
    }
}

impl ResolvedCondition {
    fn evaluate(&self, row: &[Scalar], case_insensitive: bool) -> Result<bool, EvaluationError> {
        let cell = row.get(self.index).unwrap_or(&NULL);
        let value: Cow<'_, Scalar> = match cell {
            Scalar::String(s)
                if case_insensitive
                    && self.column_type == ColumnType::String
                    && !self.value.is_null() =>
            {
                Cow::Owned(Scalar::String(s.to_lowercase()))
            }
            other => Cow::Borrowed(other),
        };
        let value = value.as_ref();

        let outcome = match self.operator {
            Operator::Eq => self.value.equals(value),
            Operator::Ne => !self.value.equals(value),
            Operator::In => self.value.contains(value),
            Operator::NotIn => !self.value.contains(value),
            Operator::Missing => value.is_missing(),
            Operator::NotMissing => !value.is_missing(),
            Operator::Starts
            | Operator::Ends
            | Operator::Contains
            | Operator::NotContains
            | Operator::Regex => {
                if self.column_type != ColumnType::String {
                    return Err(self.unknown_operator());
                }
                match (value.as_str(), &self.value) {
                    (Some(text), Literal::String(needle)) => match self.operator {
                        Operator::Starts => text.starts_with(needle.as_str()),
                        Operator::Ends => text.ends_with(needle.as_str()),
                        Operator::Contains => text.contains(needle.as_str()),
                        Operator::NotContains => !text.contains(needle.as_str()),
                        _ => self.pattern.as_ref().is_some_and(|p| p.is_match(text)),
                    },
                    _ => false,
                }
            }
            Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
                if self.column_type == ColumnType::Boolean {
                    return Err(self.unknown_operator());
                }
                match compare(value, &self.value) {
                    Some(ordering) => match self.operator {
                        Operator::Lt => ordering.is_lt(),
                        Operator::Le => ordering.is_le(),
                        Operator::Gt => ordering.is_gt(),
                        _ => ordering.is_ge(),
                    },
                    None => false,
                }
            }
        };
        Ok(outcome)
    }

    fn unknown_operator(&self) -> EvaluationError {
        EvaluationError::UnknownOperator {
            variable: self.variable.clone(),
            operator: self.operator,
            column_type: self.column_type,
        }
    }
}

/// Ordering of a row value against a comparison value of the same kind
fn compare(value: &Scalar, literal: &Literal) -> Option<Ordering> {
    match (value, literal) {
        (Scalar::Number(a), Literal::Number(b)) => a.partial_cmp(b),
        (Scalar::String(a), Literal::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}
