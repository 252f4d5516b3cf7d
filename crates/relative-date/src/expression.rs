//! Parsing of "N units ago" phrases.
//!
//! The grammar is deliberately small. A phrase matches when it contains, as
//! three consecutive words, a quantity, a unit, and `ago` (or the single word
//! `yesterday`). Surrounding words are ignored, so `"posted 3 weeks ago"`
//! matches, but a quantity that is not a plain non-negative integer or one of
//! the words `a`/`an`/`one` never matches: `"1.5 years ago"` and
//! `"-2 days ago"` are rejected outright rather than partially read.
//!
//! Units are tried in a fixed priority order (years, months, weeks,
//! yesterday, days, hours) and the first unit with a match wins.

use std::fmt;

use crate::date::Granularity;

/// A recognized relative-time phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeExpression {
    YearsAgo(u32),
    MonthsAgo(u32),
    WeeksAgo(u32),
    Yesterday,
    DaysAgo(u32),
    HoursAgo(u32),
}

/// Unit words in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Year,
    Month,
    Week,
    Day,
    Hour,
}

const UNIT_PRIORITY: [Unit; 5] = [Unit::Year, Unit::Month, Unit::Week, Unit::Day, Unit::Hour];

impl RelativeExpression {
    /// Parse free text into an expression. Returns `None` for anything outside
    /// the grammar, including empty and whitespace-only text.
    ///
    /// ```
    /// use relative_date::RelativeExpression;
    ///
    /// assert_eq!(RelativeExpression::parse("A month ago"), Some(RelativeExpression::MonthsAgo(1)));
    /// assert_eq!(RelativeExpression::parse("3 centuries ago"), None);
    /// ```
    pub fn parse(expression: &str) -> Option<Self> {
        let words = normalize_expression(expression);
        if words.is_empty() {
            return None;
        }

        for unit in UNIT_PRIORITY {
            if unit == Unit::Day && words.iter().any(|w| w == "yesterday") {
                return Some(Self::Yesterday);
            }
            if let Some(n) = find_quantity(&words, unit) {
                return Some(match unit {
                    Unit::Year => Self::YearsAgo(n),
                    Unit::Month => Self::MonthsAgo(n),
                    Unit::Week => Self::WeeksAgo(n),
                    Unit::Day => Self::DaysAgo(n),
                    Unit::Hour => Self::HoursAgo(n),
                });
            }
        }
        None
    }

    /// Whether the resolved day is exact or flattened to mid-month.
    pub fn granularity(&self) -> Granularity {
        match self {
            Self::YearsAgo(_) | Self::MonthsAgo(_) => Granularity::Month,
            Self::WeeksAgo(_) | Self::Yesterday | Self::DaysAgo(_) | Self::HoursAgo(_) => {
                Granularity::Day
            }
        }
    }
}

impl fmt::Display for RelativeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (n, unit) = match *self {
            Self::Yesterday => return f.write_str("yesterday"),
            Self::YearsAgo(n) => (n, "year"),
            Self::MonthsAgo(n) => (n, "month"),
            Self::WeeksAgo(n) => (n, "week"),
            Self::DaysAgo(n) => (n, "day"),
            Self::HoursAgo(n) => (n, "hour"),
        };
        let plural = if n == 1 { "" } else { "s" };
        write!(f, "{n} {unit}{plural} ago")
    }
}

/// Lowercase, split on whitespace, and trim punctuation hugging each word.
///
/// Interior punctuation is kept so that `1.5` stays one (non-numeric) word.
fn normalize_expression(s: &str) -> Vec<String> {
    s.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '!' | '?' | '(' | ')' | '"' | '\''))
                .trim_end_matches('.')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Find the first `<quantity> <unit> ago` triple for `unit`.
fn find_quantity(words: &[String], unit: Unit) -> Option<u32> {
    words.windows(3).find_map(|w| {
        if w[2] != "ago" || parse_unit(&w[1])? != unit {
            return None;
        }
        parse_quantity(&w[0], unit)
    })
}

/// Parse the quantity word. Article forms are only accepted where they read
/// naturally ("an hour", "a year"); "a" never counts as a digit run.
fn parse_quantity(word: &str, unit: Unit) -> Option<u32> {
    match word {
        "a" | "one" => Some(1),
        "an" if unit == Unit::Hour => Some(1),
        _ if !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit()) => word.parse().ok(),
        _ => None,
    }
}

/// Map a unit word (singular or plural) to its unit.
fn parse_unit(word: &str) -> Option<Unit> {
    match word {
        "year" | "years" => Some(Unit::Year),
        "month" | "months" => Some(Unit::Month),
        "week" | "weeks" => Some(Unit::Week),
        "day" | "days" => Some(Unit::Day),
        "hour" | "hours" => Some(Unit::Hour),
        _ => None,
    }
}
