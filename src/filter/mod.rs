//! Filter expression parsing, validation and row evaluation
//!
//! A filter is a flat list of conditions joined by `and` / `or` connectors,
//! evaluated strictly left to right without precedence or grouping.
//!
//! # Syntax
//!
//! ```text
//! VARIABLE COMPARATOR VALUE           Compare a column with a literal
//! VARIABLE in (V1, V2, ...)           Membership (notin for the negation)
//! missing(VARIABLE)                   Cell is null or an empty string
//! notMissing(VARIABLE)                Cell has a value
//! COND and COND or COND               Connectors, folded left to right
//! ```
//!
//! # Comparators
//!
//! - `=` `!=` - equality, for every column type
//! - `<` `<=` `>` `>=` - ordering, for string and number columns
//! - `=:` `:=` `?` `!?` `=~` - starts with, ends with, contains, does not
//!   contain and regular expression match, for string columns
//! - `in` `notin` - membership, for string and number columns
//!
//! String values are quoted with `"` or `'`, booleans are `True` / `False`
//! and `null` stands for a missing value of any type.
//!
//! # Examples
//!
//! ```text
//! AGE > 80 and SEX = "M"
//! RACE in ("WHITE", "ASIAN") or missing(RACE)
//! AETERM =~ "^HEAD" and SAFFL = True
//! ```

pub mod entities;
pub mod error;
pub mod evaluator;
pub mod grammar;
pub mod parser;
pub mod resolved;
pub mod serializer;
pub mod validator;

pub use entities::{
    BasicFilter, Column, ColumnType, Condition, Connector, FilterOptions, Function, Literal,
    Operator, Row, Scalar,
};
pub use error::{EvaluationError, FilterError, FilterParseError};
pub use parser::{parse_filter_text, try_parse_filter_text};
pub use resolved::ResolvedFilter;
pub use serializer::filter_to_text;
pub use validator::validate_filter_text;
