// ********* Input data structures ***********

use chrono::{Datelike, NaiveDate};
use std::error::Error;
use std::fmt::Display;

/// One cell of a raw table, as handed over by a reader.
///
/// Readers are not expected to type their cells strictly: a count may arrive
/// as `Number(1250.0)` or as `Text("1,250")`.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// A calendar date already typed by the reader (spreadsheet date cells).
    Date(NaiveDate),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The textual content of the cell, if it has one.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.trim().to_string()),
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Prints integral values without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// The storage type of a column, inferred from its cells.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnDtype {
    /// Every non-empty cell is a number.
    Numeric,
    /// Every non-empty cell is a typed date.
    Date,
    Text,
    /// No non-empty cell at all.
    Empty,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn dtype(&self) -> ColumnDtype {
        let mut seen_number = false;
        let mut seen_date = false;
        for c in self.cells.iter() {
            match c {
                c if c.is_empty() => {}
                Cell::Number(_) => seen_number = true,
                Cell::Date(_) => seen_date = true,
                _ => return ColumnDtype::Text,
            }
        }
        match (seen_number, seen_date) {
            (true, false) => ColumnDtype::Numeric,
            (false, true) => ColumnDtype::Date,
            (false, false) => ColumnDtype::Empty,
            (true, true) => ColumnDtype::Text,
        }
    }
}

/// A rectangular table with named columns and untyped cells.
///
/// Invariant: all the columns have the same number of cells. Use the
/// [`crate::builder::TableBuilder`] to assemble one from rows.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawTable {
    pub(crate) columns: Vec<Column>,
    pub(crate) num_rows: usize,
}

impl RawTable {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0 || self.columns.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.columns
            .get(col)
            .and_then(|c| c.cells.get(row))
            .unwrap_or(&EMPTY)
    }
}

// ******** Classification *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ColumnRole {
    Date,
    Year,
    Month,
    Location,
    Count,
    Unknown,
}

/// The outcome of classifying one column.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoleMatch {
    pub column: usize,
    pub name: String,
    pub dtype: ColumnDtype,
    pub role: ColumnRole,
    /// Index of the rule that matched in [`crate::classify::ROLE_RULES`],
    /// `None` for unknown columns.
    pub rule_index: Option<usize>,
    /// The role was given by a keyword in the name, not by the dtype.
    pub by_keyword: bool,
    /// Every cell is a count or a missing marker, and at least one is a
    /// count. Separators and placeholders do not change this.
    pub count_like: bool,
}

/// The columns providing date material for each row.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct DateColumns {
    pub date: Option<usize>,
    pub year: Option<usize>,
    pub month: Option<usize>,
}

impl DateColumns {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && (self.year.is_none() || self.month.is_none())
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ShapeDecision {
    /// One column per location, cells are counts.
    Wide {
        dates: DateColumns,
        locations: Vec<usize>,
    },
    /// One row per observation.
    Long {
        dates: DateColumns,
        location: usize,
        count: usize,
    },
}

// ******** Output data structures *********

/// One canonical observation: a count at a location for a date.
#[derive(PartialEq, Debug, Clone)]
pub struct Observation {
    pub date: NaiveDate,
    pub year: i32,
    /// Three-letter English month label (`Jan`, `Feb`, ...).
    pub month: String,
    pub route: String,
    pub count: f64,
}

impl Observation {
    /// Builds an observation, deriving the year and the month label from the date.
    pub fn new(date: NaiveDate, route: &str, count: f64) -> Observation {
        Observation {
            date,
            year: date.year(),
            month: crate::dates::month_label(date.month()).to_string(),
            route: route.to_string(),
            count,
        }
    }

    pub fn key(&self) -> (NaiveDate, &str) {
        (self.date, self.route.as_str())
    }
}

/// A collection of canonical observations.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Dataset {
    pub observations: Vec<Observation>,
}

impl Dataset {
    pub fn new(observations: Vec<Observation>) -> Dataset {
        Dataset { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Sorts by (date, route). The sort is stable.
    pub fn sorted(mut self) -> Dataset {
        self.observations
            .sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.route.cmp(&b.route)));
        self
    }

    pub fn append(&mut self, other: Dataset) {
        self.observations.extend(other.observations);
    }

    pub fn summary(&self) -> DatasetSummary {
        let mut routes: Vec<&str> = self.observations.iter().map(|o| o.route.as_str()).collect();
        routes.sort_unstable();
        routes.dedup();
        DatasetSummary {
            records: self.observations.len(),
            first_date: self.observations.iter().map(|o| o.date).min(),
            last_date: self.observations.iter().map(|o| o.date).max(),
            routes: routes.len(),
            total_count: self.observations.iter().map(|o| o.count).sum(),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct DatasetSummary {
    pub records: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub routes: usize,
    pub total_count: f64,
}

/// Rows and cells left out while normalizing a table, by reason.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct DropCounts {
    pub rows_seen: usize,
    /// Rows without a resolvable date. All their cells are dropped with them.
    pub unresolved_date: usize,
    /// Count cells that are not a finite non-negative number.
    pub invalid_count: usize,
    /// Empty count cells and placeholders such as `*`.
    pub missing_count: usize,
    /// Zero counts treated as "not measured".
    pub zero_count: usize,
    pub missing_location: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.unresolved_date
            + self.invalid_count
            + self.missing_count
            + self.zero_count
            + self.missing_location
    }
}

/// The result of normalizing one raw table.
#[derive(PartialEq, Debug, Clone)]
pub struct Normalized {
    pub dataset: Dataset,
    pub shape: ShapeDecision,
    /// The shape was only found by the loosened heuristics.
    pub loosened: bool,
    pub drops: DropCounts,
}

#[derive(PartialEq, Debug, Clone)]
pub struct MergeOutcome {
    pub dataset: Dataset,
    pub historical_rows: usize,
    pub recent_rows: usize,
    pub duplicates_removed: usize,
}

/// Errors that prevent a table or a run from producing data.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum NormalizeErrors {
    /// Neither the wide nor the long layout could be recognized.
    UnresolvedShape { columns: Vec<String> },
    /// No source produced any observation.
    NoData,
}

impl Error for NormalizeErrors {}

impl Display for NormalizeErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeErrors::UnresolvedShape { columns } => {
                write!(f, "could not recognize the layout of columns {:?}", columns)
            }
            NormalizeErrors::NoData => write!(f, "no source produced any data"),
        }
    }
}

// ********* Configuration **********

/// How a count of exactly zero is interpreted.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ZeroCountPolicy {
    /// Wide tables use zero and blank interchangeably for "not measured":
    /// zeros are dropped there. In long tables every row is an explicit
    /// observation and a zero is kept.
    ByShape,
    /// Zero is never an observation.
    Drop,
    /// Zero is always an observation.
    Keep,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NormalizeOptions {
    pub zero_counts: ZeroCountPolicy,
}

impl NormalizeOptions {
    pub const DEFAULT_OPTIONS: NormalizeOptions = NormalizeOptions {
        zero_counts: ZeroCountPolicy::ByShape,
    };

    pub(crate) fn drop_zero(&self, wide: bool) -> bool {
        match self.zero_counts {
            ZeroCountPolicy::ByShape => wide,
            ZeroCountPolicy::Drop => true,
            ZeroCountPolicy::Keep => false,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions::DEFAULT_OPTIONS
    }
}
