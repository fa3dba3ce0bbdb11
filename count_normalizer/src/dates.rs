//! Resolution of a calendar date from whatever date material a row carries.
//!
//! Sources are monthly aggregates: when only a year and a month are known,
//! the date is pinned to the 15th of that month so that sorting and
//! interpolation are not biased toward month boundaries.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::debug;

use crate::config::Cell;

/// The day used when only year/month granularity is available.
pub const MID_MONTH_DAY: u32 = 15;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const FULL_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%d %b %Y", "%b %d, %Y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// The cells of one row that may carry a date.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateMaterial<'a> {
    pub date: Option<&'a Cell>,
    pub year: Option<&'a Cell>,
    pub month: Option<&'a Cell>,
}

/// Resolves the date of a row.
///
/// An explicit date column wins. When it is absent or unparseable, the year
/// and month fields are combined into the 15th of that month. Returns `None`
/// when neither is resolvable; the caller drops the row.
pub fn synthesize_date(material: &DateMaterial) -> Option<NaiveDate> {
    if let Some(cell) = material.date {
        if let Some(d) = parse_date_cell(cell) {
            return Some(d);
        }
        debug!("synthesize_date: unparseable date cell {:?}", cell);
    }
    let year = coerce_year(material.year?)?;
    let month = coerce_month(material.month?)?;
    NaiveDate::from_ymd_opt(year, month, MID_MONTH_DAY)
}

pub fn parse_date_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date_text(s),
        // A bare year in a date column: no month to place it in.
        Cell::Number(_) | Cell::Empty => None,
    }
}

/// Parses the date representations found in the published tables.
///
/// Month-level labels (`2021-03`, `Mar 2021`, `21-Mar`) resolve to the 15th.
pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    for fmt in FULL_DATE_FORMATS.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt.date());
        }
    }
    parse_month_level(t)
}

// chrono refuses to parse a date without a day, so month-level labels are
// split by hand.
fn parse_month_level(t: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = t
        .split(|c: char| c == '-' || c == '/' || c == ' ')
        .filter(|p| !p.is_empty())
        .collect();
    let (year, month) = match parts.as_slice() {
        // 2021-03
        [y, m] if y.len() == 4 && is_digits(y) && is_digits(m) => {
            (y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)
        }
        // Mar 2021, March 2021, Mar-21
        [m, y] if !is_digits(m) && is_digits(y) && (y.len() == 4 || y.len() == 2) => {
            (expand_year(y.parse::<i32>().ok()?), month_from_name(m)?)
        }
        // 21-Mar (the compact label of the PDF tables)
        [y, m] if is_digits(y) && y.len() <= 2 && !is_digits(m) => {
            (expand_year(y.parse::<i32>().ok()?), month_from_name(m)?)
        }
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, MID_MONTH_DAY)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn expand_year(y: i32) -> i32 {
    if (0..100).contains(&y) {
        2000 + y
    } else {
        y
    }
}

/// Coerces a year cell to a 4-digit year. Two-digit years are taken as 2000+year.
pub fn coerce_year(cell: &Cell) -> Option<i32> {
    let y: i32 = match cell {
        Cell::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n < 10000.0 => *n as i32,
        Cell::Text(s) => {
            let t = s.trim();
            // "2022.0" as written by some exports
            let t = t.strip_suffix(".0").unwrap_or(t);
            if !is_digits(t) {
                return None;
            }
            t.parse::<i32>().ok()?
        }
        Cell::Date(d) => d.year(),
        _ => return None,
    };
    match y {
        0..=99 => Some(expand_year(y)),
        1000..=9999 => Some(y),
        _ => None,
    }
}

/// Coerces a month cell to 1..=12: numbers first, then the three-letter
/// abbreviation of a month name, case-insensitively.
pub fn coerce_month(cell: &Cell) -> Option<u32> {
    let m = match cell {
        Cell::Number(n) if n.fract() == 0.0 => *n as i64,
        Cell::Text(s) => {
            let t = s.trim();
            let t_num = t.strip_suffix(".0").unwrap_or(t);
            match t_num.parse::<i64>() {
                Ok(m) => m,
                Err(_) => return month_from_name(t),
            }
        }
        Cell::Date(d) => d.month() as i64,
        _ => return None,
    };
    if (1..=12).contains(&m) {
        Some(m as u32)
    } else {
        None
    }
}

fn month_from_name(s: &str) -> Option<u32> {
    let prefix: String = s.trim().to_lowercase().chars().take(3).collect();
    MONTH_LABELS
        .iter()
        .position(|label| label.to_lowercase() == prefix)
        .map(|idx| (idx + 1) as u32)
}

/// The three-letter label of a month (1..=12).
pub fn month_label(month: u32) -> &'static str {
    MONTH_LABELS
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn explicit_date_column_wins() {
        let date = text("2023-05-10");
        let year = Cell::Number(2020.0);
        let month = text("Jan");
        let m = DateMaterial {
            date: Some(&date),
            year: Some(&year),
            month: Some(&month),
        };
        assert_eq!(synthesize_date(&m), Some(ymd(2023, 5, 10)));
    }

    #[test]
    fn year_and_month_fall_back_to_mid_month() {
        let date = text("not a date");
        let year = Cell::Number(2022.0);
        let month = text("January");
        let m = DateMaterial {
            date: Some(&date),
            year: Some(&year),
            month: Some(&month),
        };
        assert_eq!(synthesize_date(&m), Some(ymd(2022, 1, 15)));
    }

    #[test]
    fn two_digit_years_are_in_this_century() {
        assert_eq!(coerce_year(&text("22")), Some(2022));
        assert_eq!(coerce_year(&Cell::Number(9.0)), Some(2009));
        assert_eq!(coerce_year(&text("2022.0")), Some(2022));
        assert_eq!(coerce_year(&text("twenty")), None);
        assert_eq!(coerce_year(&Cell::Number(123.0)), None);
    }

    #[test]
    fn months_numeric_then_abbreviation() {
        assert_eq!(coerce_month(&Cell::Number(3.0)), Some(3));
        assert_eq!(coerce_month(&text("11")), Some(11));
        assert_eq!(coerce_month(&text("sep")), Some(9));
        assert_eq!(coerce_month(&text("SEPTEMBER")), Some(9));
        assert_eq!(coerce_month(&Cell::Number(13.0)), None);
        assert_eq!(coerce_month(&text("Smarch")), None);
        assert_eq!(coerce_month(&Cell::Empty), None);
    }

    #[test]
    fn date_text_formats() {
        assert_eq!(parse_date_text("2023-05-10"), Some(ymd(2023, 5, 10)));
        assert_eq!(parse_date_text("2023/05/10"), Some(ymd(2023, 5, 10)));
        assert_eq!(parse_date_text("05/10/2023"), Some(ymd(2023, 5, 10)));
        assert_eq!(parse_date_text("2023-05-10 13:45:00"), Some(ymd(2023, 5, 10)));
        assert_eq!(parse_date_text("2023-05-10T13:45:00"), Some(ymd(2023, 5, 10)));
        assert_eq!(parse_date_text("10-May-2023"), Some(ymd(2023, 5, 10)));
        assert_eq!(parse_date_text("2023-05"), Some(ymd(2023, 5, 15)));
        assert_eq!(parse_date_text("May 2023"), Some(ymd(2023, 5, 15)));
        assert_eq!(parse_date_text("22-Jan"), Some(ymd(2022, 1, 15)));
        assert_eq!(parse_date_text("Jan-22"), Some(ymd(2022, 1, 15)));
        assert_eq!(parse_date_text("2023-13-01"), None);
        assert_eq!(parse_date_text("soon"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn canonical_dates_round_trip() {
        let d = ymd(2021, 2, 28);
        let printed = Cell::Text(d.format("%Y-%m-%d").to_string());
        let m = DateMaterial {
            date: Some(&printed),
            ..Default::default()
        };
        assert_eq!(synthesize_date(&m), Some(d));
    }

    #[test]
    fn nothing_resolvable() {
        let year = Cell::Number(2022.0);
        let m = DateMaterial {
            year: Some(&year),
            ..Default::default()
        };
        assert_eq!(synthesize_date(&m), None);
        assert_eq!(synthesize_date(&DateMaterial::default()), None);
    }

    #[test]
    fn labels() {
        assert_eq!(month_label(1), "Jan");
        assert_eq!(month_label(12), "Dec");
        assert_eq!(month_label(0), "");
    }
}
