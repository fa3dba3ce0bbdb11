pub use crate::config::*;

use log::debug;
use std::collections::{HashMap, HashSet};

/// A builder for assembling a raw table row by row.
///
/// Readers only need to provide a header and rows of cells. Short rows are
/// padded with empty cells and long rows are truncated to the header.
///
/// ```
/// pub use count_normalizer::builder::TableBuilder;
/// pub use count_normalizer::Cell;
///
/// let mut builder = TableBuilder::new(&["Year".to_string(), "Burrard Bridge".to_string()]);
///
/// builder.add_row(vec![Cell::Number(2022.0), Cell::Number(1000.0)]);
///
/// let table = builder.build();
/// assert_eq!(table.num_rows(), 1);
/// ```
pub struct TableBuilder {
    pub(crate) _names: Vec<String>,
    pub(crate) _rows: Vec<Vec<Cell>>,
}

impl TableBuilder {
    pub fn new(header: &[String]) -> TableBuilder {
        TableBuilder {
            _names: unique_names(header),
            _rows: Vec::new(),
        }
    }

    /// Adds a row of text fields. Fields that parse fully as a number become
    /// numbers, blank fields become empty cells.
    pub fn add_text_row(&mut self, fields: &[String]) {
        self.add_row(fields.iter().map(|s| cell_from_text(s)).collect())
    }

    pub fn add_row(&mut self, mut cells: Vec<Cell>) {
        let width = self._names.len();
        if cells.len() != width {
            debug!(
                "add_row: row {} has {} cells for {} columns",
                self._rows.len(),
                cells.len(),
                width
            );
        }
        cells.resize(width, Cell::Empty);
        self._rows.push(cells);
    }

    pub fn build(self) -> RawTable {
        let num_rows = self._rows.len();
        let mut columns: Vec<Column> = self
            ._names
            .into_iter()
            .map(|name| Column {
                name,
                cells: Vec::with_capacity(num_rows),
            })
            .collect();
        for row in self._rows {
            for (col, cell) in columns.iter_mut().zip(row) {
                col.cells.push(cell);
            }
        }
        RawTable { columns, num_rows }
    }
}

/// Interprets a free text field the way delimited-text readers do.
pub fn cell_from_text(s: &str) -> Cell {
    let t = s.trim();
    if t.is_empty() {
        return Cell::Empty;
    }
    match t.parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Text(t.to_string()),
    }
}

// Blank names become `Unnamed: <idx>`, repeated names get the first free
// `.1`, `.2`... suffix. A suffixed name never collides with a name present
// in the header.
fn unique_names(header: &[String]) -> Vec<String> {
    let header_names: HashSet<&str> = header.iter().map(|s| s.trim()).collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut res: Vec<String> = Vec::new();
    for (idx, raw) in header.iter().enumerate() {
        let base = match raw.trim() {
            "" => format!("Unnamed: {}", idx),
            s => s.to_string(),
        };
        let name = if taken.contains(&base) {
            let n = next_suffix.entry(base.clone()).or_insert(1);
            loop {
                let candidate = format!("{}.{}", base, n);
                *n += 1;
                if !taken.contains(&candidate) && !header_names.contains(candidate.as_str()) {
                    break candidate;
                }
            }
        } else {
            base
        };
        taken.insert(name.clone());
        res.push(name);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pads_short_rows_and_truncates_long_ones() {
        let mut b = TableBuilder::new(&names(&["a", "b"]));
        b.add_row(vec![Cell::Number(1.0)]);
        b.add_row(vec![Cell::Number(2.0), Cell::Number(3.0), Cell::Number(4.0)]);
        let t = b.build();
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.num_columns(), 2);
        assert_eq!(t.cell(0, 1), &Cell::Empty);
        assert_eq!(t.cell(1, 1), &Cell::Number(3.0));
    }

    #[test]
    fn renames_blank_and_duplicate_headers() {
        let b = TableBuilder::new(&names(&["Route", "", "Route", " Route "]));
        assert_eq!(
            b.build().column_names(),
            names(&["Route", "Unnamed: 1", "Route.1", "Route.2"])
        );
    }

    #[test]
    fn suffixes_skip_names_already_in_the_header() {
        let b = TableBuilder::new(&names(&["a", "a", "a.1"]));
        assert_eq!(b.build().column_names(), names(&["a", "a.2", "a.1"]));
        let b = TableBuilder::new(&names(&["a", "a.1", "a", "a"]));
        assert_eq!(b.build().column_names(), names(&["a", "a.1", "a.2", "a.3"]));
    }

    #[test]
    fn text_fields_are_typed() {
        assert_eq!(cell_from_text(" 12 "), Cell::Number(12.0));
        assert_eq!(cell_from_text("1,250"), Cell::Text("1,250".to_string()));
        assert_eq!(cell_from_text("   "), Cell::Empty);
        assert_eq!(cell_from_text("*"), Cell::Text("*".to_string()));
    }
}
