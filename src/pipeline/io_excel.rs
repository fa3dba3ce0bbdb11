// Reading spreadsheets (xlsx and legacy xls).

use calamine::{open_workbook, DataType, Range, Reader, Xls, Xlsx};

use count_normalizer::builder::{cell_from_text, TableBuilder};

use crate::pipeline::io_common::{excel_serial_to_date, header_text, is_blank_row};
use crate::pipeline::*;

/// Worksheets with more columns than this are taken to hold the data.
const MIN_DATA_COLUMNS: usize = 5;

pub fn read_excel_file(path: &str, cfs: &FileSource, provider: Provider) -> BBikeResult<RawTable> {
    let worksheet_name_o = cfs.excel_worksheet_name.as_deref();
    debug!(
        "read_excel_file: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let sheets = match provider {
        Provider::Xls => {
            let mut workbook: Xls<_> = open_workbook(path).context(OpeningXlsSnafu { path })?;
            workbook.worksheets()
        }
        _ => {
            let mut workbook: Xlsx<_> =
                open_workbook(path).context(OpeningExcelSnafu { path })?;
            workbook.worksheets()
        }
    };
    let (name, wrange) = pick_worksheet(sheets, worksheet_name_o, path)?;
    info!(
        "read_excel_file: {}: using worksheet {:?}",
        simplify_file_name(path),
        name
    );
    let table = range_to_table(&wrange, path)?;
    Ok(table)
}

/// Picks the worksheet to read: the one named in the configuration, else
/// the first one wide enough to hold data, else the first one.
pub fn pick_worksheet(
    sheets: Vec<(String, Range<DataType>)>,
    name: Option<&str>,
    path: &str,
) -> BikeResult<(String, Range<DataType>)> {
    if let Some(n) = name {
        return match sheets.into_iter().find(|(sname, _)| sname == n) {
            Some(s) => Ok(s),
            None => MissingWorksheetSnafu { path, name: n }.fail(),
        };
    }
    for (sname, wrange) in sheets.iter() {
        debug!(
            "pick_worksheet: {:?} has size {:?}",
            sname,
            wrange.get_size()
        );
    }
    let wide_idx = sheets
        .iter()
        .position(|(_, wrange)| wrange.get_size().1 > MIN_DATA_COLUMNS);
    let idx = match wide_idx {
        Some(i) => i,
        None if sheets.is_empty() => return EmptyExcelSnafu { path }.fail(),
        None => {
            warn!(
                "pick_worksheet: no worksheet with more than {} columns in {}, using the first one",
                MIN_DATA_COLUMNS, path
            );
            0
        }
    };
    match sheets.into_iter().nth(idx) {
        Some(s) => Ok(s),
        None => EmptyExcelSnafu { path }.fail(),
    }
}

pub fn cell_from_calamine(elt: &DataType) -> Cell {
    match elt {
        DataType::Empty => Cell::Empty,
        DataType::String(s) => cell_from_text(s),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        DataType::DateTime(serial) => match excel_serial_to_date(*serial) {
            Some(d) => Cell::Date(d),
            None => Cell::Number(*serial),
        },
        x => {
            debug!("cell_from_calamine: unreadable cell {:?}", x);
            Cell::Empty
        }
    }
}

/// The first row of the range is the header.
pub fn range_to_table(wrange: &Range<DataType>, path: &str) -> BikeResult<RawTable> {
    let mut rows = wrange.rows();
    let header = rows.next().context(EmptyExcelSnafu { path })?;
    let names: Vec<String> = header
        .iter()
        .map(|elt| header_text(&cell_from_calamine(elt)))
        .collect();
    debug!("range_to_table: header: {:?}", names);

    let mut builder = TableBuilder::new(&names);
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(cell_from_calamine).collect();
        if is_blank_row(&cells) {
            continue;
        }
        builder.add_row(cells);
    }
    Ok(builder.build())
}
