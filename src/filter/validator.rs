use super::entities::{Column, ColumnType, find_column};
use super::grammar::grammar;
use super::parser::{ConditionTokens, tokenize};

/// Checks that filter text is well formed and refers to known columns with
/// comparators and literals suited to their types.
///
/// Empty text is valid and means "no filter".
pub fn validate_filter_text(text: &str, columns: &[Column], case_insensitive_col_names: bool) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return true;
    }
    if !grammar().filter.is_match(text) {
        return false;
    }

    match tokenize(text) {
        Ok(tokens) => tokens
            .conditions
            .iter()
            .all(|condition| validate_condition(condition, columns, case_insensitive_col_names)),
        Err(_) => false,
    }
}

fn validate_condition(
    condition: &ConditionTokens<'_>,
    columns: &[Column],
    case_insensitive_col_names: bool,
) -> bool {
    let Some((_, column)) = find_column(columns, condition.variable(), case_insensitive_col_names)
    else {
        return false;
    };

    let ConditionTokens::Comparison {
        comparator, value, ..
    } = *condition
    else {
        return true;
    };

    let g = grammar();
    let multiple = g.comparator_multiple.is_match(comparator) && g.item_multiple.is_match(value);
    match column.data_type {
        ColumnType::Number => {
            let numeric = g.comparator_numeric.is_match(comparator)
                && (g.numeral.is_match(value.trim()) || value == "null");
            numeric || multiple
        }
        ColumnType::String => {
            let single = g.comparator_string.is_match(comparator) && g.item_string.is_match(value);
            single || multiple
        }
        ColumnType::Boolean => {
            g.comparator_boolean.is_match(comparator) && g.item_boolean.is_match(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", ColumnType::String),
            Column::new("age", ColumnType::Number),
            Column::new("isActive", ColumnType::Boolean),
            Column::new("race", ColumnType::String),
        ]
    }

    #[test]
    fn test_valid_and_invalid_literals() {
        let cols = columns();
        assert!(validate_filter_text(r#"name = "John" and age > 30"#, &cols, true));
        assert!(!validate_filter_text(r#"name = "John" and age > "thirty""#, &cols, true));
        assert!(!validate_filter_text("name = John", &cols, true));
        assert!(validate_filter_text("age = null", &cols, true));
    }

    #[test]
    fn test_numeric_literal_must_be_a_numeral() {
        let cols = columns();
        assert!(validate_filter_text("age > -1.5e2", &cols, true));
        assert!(validate_filter_text("age < Infinity", &cols, true));
        for text in ["age > NaN", "age > inf", "age > infinity", "age = 8x"] {
            assert!(!validate_filter_text(text, &cols, true), "{text}");
        }
    }

    #[test]
    fn test_comparator_must_suit_column_type() {
        let cols = columns();
        assert!(validate_filter_text(r#"name =: "Jo""#, &cols, true));
        assert!(!validate_filter_text("age =: 3", &cols, true));
        assert!(validate_filter_text("isActive != false", &cols, true));
        assert!(!validate_filter_text("isActive > false", &cols, true));
        assert!(!validate_filter_text("isActive in (true)", &cols, true));
    }

    #[test]
    fn test_functions_only_need_a_known_column() {
        let cols = columns();
        assert!(validate_filter_text("missing(isActive) or notMissing(age)", &cols, true));
        assert!(!validate_filter_text("missing(unknown)", &cols, true));
    }

    #[test]
    fn test_empty_text_is_valid() {
        assert!(validate_filter_text("", &columns(), true));
        assert!(validate_filter_text("   ", &columns(), true));
    }

    #[test]
    fn test_column_name_case() {
        let cols = columns();
        let text = r#"RACE in ("WHITE", "BLACK OR AFRICAN AMERICAN")"#;
        assert!(validate_filter_text(text, &cols, true));
        assert!(!validate_filter_text(text, &cols, false));
    }

    #[test]
    fn test_validation_is_repeatable() {
        let cols = columns();
        let text = r#"name ? "o" and age in (1, 2)"#;
        let first = validate_filter_text(text, &cols, true);
        assert!(first);
        assert_eq!(first, validate_filter_text(text, &cols, true));
    }
}
