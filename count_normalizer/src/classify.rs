//! Assignment of a role to each column of a raw table.
//!
//! The role of a column depends only on its name and its dtype. The rules
//! are tried in the order of [`ROLE_RULES`] and the first match wins, so
//! date-like names beat location-like names, which beat the numeric fallback.

use log::debug;

use crate::config::*;
use crate::counts::{parse_count, CountValue};

/// How a rule looks at a column.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Matcher {
    /// One of the tokens appears as a whole word of the lowercased name.
    AnyWord(&'static [&'static str]),
    /// One of the tokens appears anywhere in the lowercased name.
    AnyOf(&'static [&'static str]),
    /// A whole word of the lowercased name ends with one of the tokens
    /// (`startdate`, but not `updated`).
    WordEnding(&'static [&'static str]),
    /// The column only holds numbers.
    NumericDtype,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct RoleRule {
    pub matcher: Matcher,
    pub role: ColumnRole,
}

/// Generic infrastructure words, matched anywhere in a name.
pub const LOCATION_KEYWORDS: &[&str] = &[
    "location",
    "route",
    "bridge",
    "street",
    "road",
    "path",
    "lane",
    "avenue",
    "viaduct",
    "greenway",
    "seawall",
    "burrard",
    "hornby",
    "dunsmuir",
    "lions gate",
    "canada line",
    "science world",
    "hawks",
    "point grey",
    "clark",
    "cambie",
    "granville",
];

/// Short words that would match inside unrelated names, matched as whole words.
pub const LOCATION_WORDS: &[&str] = &["st", "ave", "rd", "union", "line"];

pub const COUNT_KEYWORDS: &[&str] = &["count", "volume", "trips"];

/// The classification rules, highest priority first.
pub const ROLE_RULES: &[RoleRule] = &[
    RoleRule {
        matcher: Matcher::AnyWord(&["year"]),
        role: ColumnRole::Year,
    },
    RoleRule {
        matcher: Matcher::AnyWord(&["month"]),
        role: ColumnRole::Month,
    },
    RoleRule {
        matcher: Matcher::WordEnding(&["date"]),
        role: ColumnRole::Date,
    },
    RoleRule {
        matcher: Matcher::AnyWord(&["dates", "time", "datetime", "timestamp"]),
        role: ColumnRole::Date,
    },
    RoleRule {
        matcher: Matcher::AnyOf(LOCATION_KEYWORDS),
        role: ColumnRole::Location,
    },
    RoleRule {
        matcher: Matcher::AnyWord(LOCATION_WORDS),
        role: ColumnRole::Location,
    },
    RoleRule {
        matcher: Matcher::AnyOf(COUNT_KEYWORDS),
        role: ColumnRole::Count,
    },
    RoleRule {
        matcher: Matcher::NumericDtype,
        role: ColumnRole::Count,
    },
];

impl Matcher {
    fn matches(&self, lower_name: &str, dtype: ColumnDtype) -> bool {
        match self {
            Matcher::AnyOf(tokens) => tokens.iter().any(|t| lower_name.contains(t)),
            Matcher::AnyWord(tokens) => words(lower_name).any(|w| tokens.contains(&w)),
            Matcher::WordEnding(tokens) => {
                words(lower_name).any(|w| tokens.iter().any(|t| w.ends_with(t)))
            }
            Matcher::NumericDtype => dtype == ColumnDtype::Numeric,
        }
    }
}

fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

/// Classifies a column from its name and dtype.
pub fn classify_name(name: &str, dtype: ColumnDtype) -> (ColumnRole, Option<usize>) {
    let lower = name.trim().to_lowercase();
    ROLE_RULES
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.matcher.matches(&lower, dtype))
        .map(|(idx, rule)| (rule.role, Some(idx)))
        .unwrap_or((ColumnRole::Unknown, None))
}

pub fn classify_column(idx: usize, column: &Column) -> RoleMatch {
    let dtype = column.dtype();
    let (role, rule_index) = classify_name(&column.name, dtype);
    let by_keyword = rule_index
        .and_then(|i| ROLE_RULES.get(i))
        .map(|r| r.matcher != Matcher::NumericDtype)
        .unwrap_or(false);
    RoleMatch {
        column: idx,
        name: column.name.clone(),
        dtype,
        role,
        rule_index,
        by_keyword,
        count_like: holds_counts(column),
    }
}

fn holds_counts(column: &Column) -> bool {
    let mut any_value = false;
    for cell in column.cells.iter() {
        match parse_count(cell) {
            CountValue::Value(_) => any_value = true,
            CountValue::Missing => {}
            CountValue::Invalid => return false,
        }
    }
    any_value
}

pub fn classify_table(table: &RawTable) -> Vec<RoleMatch> {
    let res: Vec<RoleMatch> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, c)| classify_column(idx, c))
        .collect();
    for m in res.iter() {
        debug!(
            "classify_table: column {:?} dtype {:?} -> {:?} (rule {:?})",
            m.name, m.dtype, m.role, m.rule_index
        );
    }
    res
}

/// The indexes of the columns with the given role, in table order.
pub fn columns_with_role(roles: &[RoleMatch], role: ColumnRole) -> Vec<usize> {
    roles
        .iter()
        .filter(|m| m.role == role)
        .map(|m| m.column)
        .collect()
}
