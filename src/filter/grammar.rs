//! Grammar of the textual filter language.
//!
//! Every lexical unit is a [`Fragment`]. Fragments compose into larger ones and
//! render either as a plain matching pattern or as a capturing pattern with
//! named groups, so validation and token extraction share one definition.
//!
//! ```text
//! filter     := condition (WS connector WS condition)*
//! condition  := function '(' variable ')'
//!             | variable comparator item
//!             | variable multi WS '(' item (',' item)* ')'
//! connector  := 'and' | 'or'
//! ```
//!
//! All patterns are case-insensitive.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// How a fragment renders its [`Fragment::Capture`] nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Captures render as non-capturing groups
    Match,
    /// Captures render as named groups
    Capture,
}

/// A composable piece of the filter grammar
#[derive(Debug, Clone)]
pub enum Fragment {
    /// Raw regular expression text
    Raw(&'static str),
    Seq(Vec<Fragment>),
    Alt(Vec<Fragment>),
    /// Named group in capture mode, plain group otherwise
    Capture(&'static str, Box<Fragment>),
    /// Always renders its content in match mode
    Plain(Box<Fragment>),
    Repeat(Box<Fragment>),
}

impl Fragment {
    pub fn seq(parts: impl IntoIterator<Item = Fragment>) -> Self {
        Fragment::Seq(parts.into_iter().collect())
    }

    pub fn alt(parts: impl IntoIterator<Item = Fragment>) -> Self {
        Fragment::Alt(parts.into_iter().collect())
    }

    pub fn capture(self, name: &'static str) -> Self {
        Fragment::Capture(name, Box::new(self))
    }

    pub fn plain(self) -> Self {
        Fragment::Plain(Box::new(self))
    }

    pub fn repeat(self) -> Self {
        Fragment::Repeat(Box::new(self))
    }

    pub fn render(&self, mode: RenderMode) -> String {
        match self {
            Fragment::Raw(pattern) if pattern.contains('|') => format!("(?:{pattern})"),
            Fragment::Raw(pattern) => (*pattern).to_string(),
            Fragment::Seq(parts) => parts.iter().map(|p| p.render(mode)).collect(),
            Fragment::Alt(parts) => {
                let alternatives: Vec<String> = parts.iter().map(|p| p.render(mode)).collect();
                format!("(?:{})", alternatives.join("|"))
            }
            Fragment::Capture(name, inner) => match mode {
                RenderMode::Capture => format!("(?P<{name}>{})", inner.render(mode)),
                RenderMode::Match => format!("(?:{})", inner.render(mode)),
            },
            Fragment::Plain(inner) => inner.render(RenderMode::Match),
            Fragment::Repeat(inner) => format!("(?:{})*", inner.render(mode)),
        }
    }

    /// Pattern that must match the whole input
    pub fn whole(&self, mode: RenderMode) -> Regex {
        compile(&format!("^(?:{})$", self.render(mode)))
    }

    /// Pattern that must match at the start of the input
    pub fn prefix(&self, mode: RenderMode) -> Regex {
        compile(&format!("^(?:{})", self.render(mode)))
    }

    /// Pattern that may match anywhere in the input
    pub fn anywhere(&self, mode: RenderMode) -> Regex {
        compile(&self.render(mode))
    }
}

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("valid filter grammar")
}

pub fn variable() -> Fragment {
    Fragment::Raw(r"\w+")
}

pub fn item_string() -> Fragment {
    Fragment::Raw(r#""[^"]*"|'[^']*'|null"#)
}

pub fn item_number() -> Fragment {
    Fragment::Raw(r#"[^'",\s()][^,\s)]*|null"#)
}

pub fn item_boolean() -> Fragment {
    Fragment::Raw("True|False|null")
}

/// Decimal numeral with optional exponent, or a signed `Infinity`
pub fn numeral() -> Fragment {
    Fragment::Raw(r"[+-]?(?:(?-i:Infinity)|(?:\d+\.?\d*|\.\d+)(?:e[+-]?\d+)?)")
}

pub fn item() -> Fragment {
    Fragment::alt([item_string(), item_number(), item_boolean()])
}

pub fn item_multiple() -> Fragment {
    Fragment::seq([
        Fragment::Raw(r"\(\s*"),
        item(),
        Fragment::seq([Fragment::Raw(r"\s*,\s*"), item()]).repeat(),
        Fragment::Raw(r"\s*\)"),
    ])
}

pub fn comparator_boolean() -> Fragment {
    Fragment::Raw("=|!=")
}

pub fn comparator_numeric() -> Fragment {
    Fragment::Raw("=|!=|<=|>=|<|>")
}

pub fn comparator_string() -> Fragment {
    Fragment::Raw(r"!=|<=|>=|<|>|\?|!\?|=:|:=|=~|=")
}

pub fn comparator_single() -> Fragment {
    comparator_string()
}

pub fn comparator_multiple() -> Fragment {
    Fragment::Raw("in|notin")
}

pub fn function() -> Fragment {
    Fragment::Raw("missing|notMissing")
}

pub fn connector() -> Fragment {
    Fragment::Raw("and|or")
}

/// `function(variable)`
pub fn condition_function() -> Fragment {
    Fragment::seq([
        function().capture("function"),
        Fragment::Raw(r"\s*\(\s*"),
        variable().capture("function_variable"),
        Fragment::Raw(r"\s*\)"),
    ])
}

/// `variable <comparator> <item>` or `variable <multi> (<item>, ...)`
pub fn condition_comparator() -> Fragment {
    Fragment::seq([
        variable().capture("variable"),
        Fragment::Raw(r"\s*"),
        Fragment::alt([
            Fragment::seq([
                comparator_single().capture("comparator"),
                Fragment::Raw(r"\s*"),
                item().capture("value"),
            ]),
            Fragment::seq([
                comparator_multiple().capture("multi_comparator"),
                Fragment::Raw(r"\s+"),
                item_multiple().capture("values"),
            ]),
        ]),
    ])
}

pub fn condition() -> Fragment {
    Fragment::alt([condition_function(), condition_comparator()])
}

/// One condition followed by any number of `<connector> <condition>` pairs
pub fn filter() -> Fragment {
    Fragment::seq([
        condition().plain().capture("head"),
        Fragment::seq([
            Fragment::Raw(r"\s+"),
            connector(),
            Fragment::Raw(r"\s+"),
            condition().plain(),
        ])
        .repeat()
        .capture("tail"),
    ])
}

/// The first condition of a filter and either the connector that follows it
/// or the end of the input
pub fn leading_condition() -> Fragment {
    Fragment::seq([
        condition().plain().capture("condition"),
        Fragment::alt([
            Fragment::seq([
                Fragment::Raw(r"\s+"),
                connector().capture("connector"),
                Fragment::Raw(r"\s+"),
            ]),
            Fragment::Raw("$"),
        ]),
    ])
}

/// Compiled grammar patterns
pub struct Grammar {
    pub filter: Regex,
    pub leading_condition: Regex,
    pub condition: Regex,
    pub item: Regex,
    pub item_string: Regex,
    pub item_boolean: Regex,
    pub item_multiple: Regex,
    pub comparator_boolean: Regex,
    pub comparator_numeric: Regex,
    pub comparator_string: Regex,
    pub comparator_multiple: Regex,
    pub numeral: Regex,
    pub numeral_prefix: Regex,
}

impl Grammar {
    fn build() -> Self {
        Self {
            filter: filter().whole(RenderMode::Capture),
            leading_condition: leading_condition().prefix(RenderMode::Capture),
            condition: condition().whole(RenderMode::Capture),
            item: item().anywhere(RenderMode::Match),
            item_string: item_string().whole(RenderMode::Match),
            item_boolean: item_boolean().whole(RenderMode::Match),
            item_multiple: item_multiple().whole(RenderMode::Match),
            comparator_boolean: comparator_boolean().whole(RenderMode::Match),
            comparator_numeric: comparator_numeric().whole(RenderMode::Match),
            comparator_string: comparator_string().whole(RenderMode::Match),
            comparator_multiple: comparator_multiple().whole(RenderMode::Match),
            numeral: numeral().whole(RenderMode::Match),
            numeral_prefix: numeral().prefix(RenderMode::Match),
        }
    }
}

pub fn grammar() -> &'static Grammar {
    static GRAMMAR: LazyLock<Grammar> = LazyLock::new(Grammar::build);
    &GRAMMAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_modes_share_structure() {
        let fragment = condition_function();
        assert_eq!(
            fragment.render(RenderMode::Match),
            r"(?:(?:missing|notMissing))\s*\(\s*(?:\w+)\s*\)"
        );
        assert_eq!(
            fragment.render(RenderMode::Capture),
            r"(?P<function>(?:missing|notMissing))\s*\(\s*(?P<function_variable>\w+)\s*\)"
        );
    }

    #[test]
    fn test_plain_suppresses_inner_captures() {
        let rendered = condition().plain().capture("head").render(RenderMode::Capture);
        assert!(rendered.starts_with("(?P<head>"));
        assert!(!rendered.contains("(?P<variable>"));
    }

    #[test]
    fn test_whole_filter_matches() {
        let g = grammar();
        assert!(g.filter.is_match(r#"AGE > 80 and SEX = "M""#));
        assert!(g.filter.is_match("age in (25, 30, 35)"));
        assert!(g.filter.is_match(r#"name = "John" OR notMissing(age)"#));
        assert!(g.filter.is_match("flag = True"));
        assert!(g.filter.is_match("missing ( age )"));
        assert!(!g.filter.is_match("invalid filter string"));
        assert!(!g.filter.is_match(r#"name = "John" and"#));
        assert!(!g.filter.is_match(r#"name = "John"and age > 3"#));
        assert!(!g.filter.is_match(r#"name = "Jo"hn""#));
    }

    #[test]
    fn test_filter_head_and_tail() {
        let g = grammar();
        let caps = g.filter.captures("age > 3").unwrap();
        assert_eq!(&caps["head"], "age > 3");
        assert_eq!(&caps["tail"], "");

        let caps = g.filter.captures("age > 3 and age < 9").unwrap();
        assert_eq!(&caps["head"], "age > 3");
        assert_eq!(&caps["tail"], " and age < 9");
    }

    #[test]
    fn test_leading_condition_stops_at_connector() {
        let g = grammar();
        let caps = g.leading_condition.captures("x = nullable and y = 1").unwrap();
        assert_eq!(&caps["condition"], "x = nullable");
        assert_eq!(&caps["connector"], "and");

        let caps = g.leading_condition.captures("y = 1").unwrap();
        assert_eq!(&caps["condition"], "y = 1");
        assert!(caps.name("connector").is_none());
    }

    #[test]
    fn test_condition_captures() {
        let g = grammar();
        let caps = g.condition.captures("name =~ 'J.*n'").unwrap();
        assert_eq!(&caps["variable"], "name");
        assert_eq!(&caps["comparator"], "=~");
        assert_eq!(&caps["value"], "'J.*n'");
        assert!(caps.name("function").is_none());

        let caps = g.condition.captures("age notin (1, 2)").unwrap();
        assert_eq!(&caps["multi_comparator"], "notin");
        assert_eq!(&caps["values"], "(1, 2)");

        let caps = g.condition.captures("notMissing(age)").unwrap();
        assert_eq!(&caps["function"], "notMissing");
        assert_eq!(&caps["function_variable"], "age");
        assert!(caps.name("variable").is_none());
    }

    #[test]
    fn test_comparator_prefers_longest_symbol() {
        let g = grammar();
        for (text, symbol) in [("a <= 1", "<="), ("a =: 'x'", "=:"), ("a !? 'x'", "!?"), ("a =~ 'x'", "=~")] {
            let caps = g.condition.captures(text).unwrap();
            assert_eq!(&caps["comparator"], symbol, "{text}");
        }
    }

    #[test]
    fn test_item_patterns() {
        let g = grammar();
        assert!(g.item_string.is_match(r#""WHITE""#));
        assert!(g.item_string.is_match("'WHITE'"));
        assert!(g.item_string.is_match("null"));
        assert!(!g.item_string.is_match("WHITE"));
        assert!(g.item_boolean.is_match("true"));
        assert!(!g.item_boolean.is_match("yes"));
        assert!(g.item_multiple.is_match(r#"("a", 'b' , null)"#));
        assert!(!g.item_multiple.is_match("1, 2"));
    }

    #[test]
    fn test_items_found_in_list_body() {
        let items: Vec<&str> = grammar()
            .item
            .find_iter(r#""a,b", 'c d' ,3"#)
            .map(|m| m.as_str())
            .collect();
        assert_eq!(items, vec![r#""a,b""#, "'c d'", "3"]);
    }

    #[test]
    fn test_numeral_patterns() {
        let g = grammar();
        for text in ["30", "-2.5", "1e3", ".5", "1.", "+Infinity", "-Infinity"] {
            assert!(g.numeral.is_match(text), "{text}");
        }
        for text in ["NaN", "inf", "infinity", "thirty", "8x", "0x1F", ""] {
            assert!(!g.numeral.is_match(text), "{text}");
        }
        assert_eq!(g.numeral_prefix.find("8x").map(|m| m.as_str()), Some("8"));
        assert_eq!(g.numeral_prefix.find("2.5e").map(|m| m.as_str()), Some("2.5"));
        assert!(g.numeral_prefix.find("\"30\"").is_none());
    }
}
