use dataset_filter::{
    BindOptions, Column, ColumnFormat, ColumnType, DatasetFilter, SourceColumn,
    validate_filter_text,
};

fn columns() -> Vec<Column> {
    vec![
        Column::new("name", ColumnType::String),
        Column::new("age", ColumnType::Number),
        Column::new("isActive", ColumnType::Boolean),
        Column::new("race", ColumnType::String),
    ]
}

fn is_valid(text: &str) -> bool {
    validate_filter_text(text, &columns(), true)
}

#[test]
fn test_valid_filter() {
    assert!(is_valid(r#"name = "John" and age > 30"#));
}

#[test]
fn test_type_mismatched_literal() {
    assert!(!is_valid(r#"name = "John" and age > "thirty""#));
    assert!(!is_valid("isActive = 1"));
}

#[test]
fn test_empty_filter_is_valid() {
    assert!(is_valid(""));
}

#[test]
fn test_unknown_column() {
    assert!(!is_valid(r#"unknown = "value""#));
}

#[test]
fn test_garbage_is_invalid() {
    assert!(!is_valid("invalid filter string"));
    assert!(!is_valid(r#"name = "John" and"#));
}

#[test]
fn test_column_name_case_follows_flag() {
    let text = r#"RACE in ("WHITE", "BLACKOR AFRICAN AMERICAN")"#;
    assert!(validate_filter_text(text, &columns(), true));
    assert!(!validate_filter_text(text, &columns(), false));
}

#[test]
fn test_facade_uses_bound_columns_and_flag() {
    let source = vec![
        SourceColumn::new("RACE", "Char"),
        SourceColumn::new("AGE", "Num"),
    ];
    let insensitive =
        DatasetFilter::new(ColumnFormat::Xpt, &source, "", BindOptions::default()).unwrap();
    assert!(insensitive.validate_filter_text(r#"race = "ASIAN" and age >= 18"#));
    assert!(!insensitive.validate_filter_text("age =~ 18"));

    let strict = DatasetFilter::new(
        ColumnFormat::Xpt,
        &source,
        "",
        BindOptions {
            case_insensitive_col_names: false,
            ..BindOptions::default()
        },
    )
    .unwrap();
    assert!(!strict.validate_filter_text(r#"race = "ASIAN""#));
    assert!(strict.validate_filter_text(r#"RACE = "ASIAN""#));
}

#[test]
fn test_null_literals() {
    assert!(is_valid("age = null"));
    assert!(is_valid("name != null"));
    assert!(is_valid("isActive = null"));
}
