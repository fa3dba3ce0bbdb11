// Reading delimited text files.

use std::fs::File;
use std::io::Read;

use count_normalizer::builder::{cell_from_text, TableBuilder};

use crate::pipeline::io_common::{header_text, is_blank_row};
use crate::pipeline::*;

pub fn read_csv_file(path: &str, cfs: &FileSource) -> BBikeResult<RawTable> {
    let delimiter = cfs.delimiter_byte()?;
    let f = File::open(path).context(CsvOpenSnafu { path })?;
    let table = read_csv_table(f, delimiter, path)?;
    Ok(table)
}

/// Reads a table from any source of delimited text. The first record is the
/// header row.
pub fn read_csv_table<R: Read>(input: R, delimiter: u8, path: &str) -> BikeResult<RawTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(input);
    let mut records = rdr.into_records();
    let header = match records.next() {
        Some(r) => r.context(CsvLineParseSnafu { lineno: 1_usize })?,
        None => return CsvEmptySnafu { path }.fail(),
    };
    let names: Vec<String> = header
        .iter()
        .map(|s| header_text(&cell_from_text(s)))
        .collect();
    debug!("read_csv_table: header: {:?}", names);

    let mut builder = TableBuilder::new(&names);
    for (idx, line_r) in records.enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let cells: Vec<Cell> = line.iter().map(cell_from_text).collect();
        if is_blank_row(&cells) {
            debug!("read_csv_table: skipping blank line {}", lineno);
            continue;
        }
        builder.add_row(cells);
    }
    let table = builder.build();
    info!(
        "read_csv_table: {}: {} rows, {} columns",
        simplify_file_name(path),
        table.num_rows(),
        table.num_columns()
    );
    Ok(table)
}
