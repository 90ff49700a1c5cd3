use super::entities::{BasicFilter, Condition, Literal};
use std::fmt::{self, Write};

/// Renders a structured filter in its canonical textual form
pub fn filter_to_text(filter: &BasicFilter) -> String {
    let mut out = String::new();
    for (index, condition) in filter.conditions.iter().enumerate() {
        write_condition(&mut out, condition);
        if let Some(connector) = filter.connectors.get(index) {
            let _ = write!(out, " {connector} ");
        }
    }
    out.trim().to_string()
}

fn write_condition(out: &mut String, condition: &Condition) {
    let operator = condition.operator();
    if operator.is_function() {
        let _ = write!(out, "{}({})", operator.symbol(), condition.variable());
    } else {
        let _ = write!(
            out,
            "{} {} {}",
            condition.variable(),
            operator.symbol(),
            condition.value()
        );
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => write_quoted(f, s),
            Literal::Numbers(items) => {
                let items: Vec<String> = items.iter().map(f64::to_string).collect();
                write!(f, "({})", items.join(", "))
            }
            Literal::Strings(items) => {
                f.write_str("(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write_quoted(f, item)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Double quotes unless the text itself holds one
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if text.contains('"') {
        write!(f, "'{text}'")
    } else {
        write!(f, "\"{text}\"")
    }
}

impl fmt::Display for BasicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&filter_to_text(self))
    }
}
