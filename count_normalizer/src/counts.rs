use crate::config::Cell;

/// Markers that published tables use in place of a count.
const PLACEHOLDERS: [&str; 7] = ["*", "-", "--", "n/a", "na", "nan", "null"];

/// The interpretation of a count cell.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum CountValue {
    Value(f64),
    /// Empty cell or placeholder. Never turned into zero.
    Missing,
    /// Not a finite non-negative number.
    Invalid,
}

/// Cleans up a count cell: thousands separators and spaces are stripped,
/// placeholders become missing values.
pub fn parse_count(cell: &Cell) -> CountValue {
    match cell {
        Cell::Empty => CountValue::Missing,
        Cell::Number(n) => check_count(*n),
        Cell::Text(s) => parse_count_text(s),
        Cell::Date(_) => CountValue::Invalid,
    }
}

pub fn parse_count_text(s: &str) -> CountValue {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != ' ' && *c != '\u{a0}')
        .collect();
    if cleaned.is_empty() || is_placeholder(&cleaned) {
        return CountValue::Missing;
    }
    match cleaned.parse::<f64>() {
        Ok(n) => check_count(n),
        Err(_) => CountValue::Invalid,
    }
}

fn check_count(n: f64) -> CountValue {
    if n.is_finite() && n >= 0.0 {
        CountValue::Value(n)
    } else {
        CountValue::Invalid
    }
}

/// Whether the text is one of the markers published in place of a value.
pub fn is_placeholder(s: &str) -> bool {
    PLACEHOLDERS.contains(&s.trim().to_lowercase().as_str())
}

/// Whether the cell holds something the count cleanup accepts, including
/// missing markers.
pub fn is_count_like(cell: &Cell) -> bool {
    !matches!(parse_count(cell), CountValue::Invalid)
}
