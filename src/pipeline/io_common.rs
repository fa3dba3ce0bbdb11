use chrono::{Duration, NaiveDate};
use count_normalizer::{format_number, Cell};
use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Rows where every cell is blank are layout artifacts (spacer rows,
/// trailing lines) and are not read.
pub fn is_blank_row(cells: &[Cell]) -> bool {
    cells.iter().all(|c| c.is_empty())
}

/// Converts a spreadsheet serial date (days since 1899-12-30) to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// The text of a header cell. Numeric headers (a year, a route number) are
/// printed without their fractional part.
pub fn header_text(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) => format_number(*n),
        c => c.as_text().unwrap_or_default(),
    }
}
