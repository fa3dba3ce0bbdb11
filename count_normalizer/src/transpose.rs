use log::{debug, info, warn};

use crate::config::*;
use crate::counts::{parse_count, CountValue};
use crate::dates::{synthesize_date, DateMaterial};

pub(crate) fn row_date_material<'a>(
    table: &'a RawTable,
    row: usize,
    dates: &DateColumns,
) -> DateMaterial<'a> {
    DateMaterial {
        date: dates.date.map(|c| table.cell(row, c)),
        year: dates.year.map(|c| table.cell(row, c)),
        month: dates.month.map(|c| table.cell(row, c)),
    }
}

/// Converts a wide table (one column per location) to canonical observations.
///
/// Every (row, location column) pair with a positive count yields one
/// observation. The date is resolved once per row and shared by all the
/// observations of that row; a row without a date yields nothing.
pub fn wide_to_long(
    table: &RawTable,
    dates: &DateColumns,
    locations: &[usize],
    options: &NormalizeOptions,
) -> (Dataset, DropCounts) {
    let drop_zero = options.drop_zero(true);
    let mut drops = DropCounts::default();
    let mut observations: Vec<Observation> = Vec::new();

    let routes: Vec<(usize, String)> = locations
        .iter()
        .filter_map(|idx| {
            table
                .columns()
                .get(*idx)
                .map(|c| (*idx, c.name.trim().to_string()))
        })
        .collect();
    info!(
        "wide_to_long: {} rows, routes: {:?}",
        table.num_rows(),
        routes.iter().map(|(_, r)| r).collect::<Vec<&String>>()
    );

    for row in 0..table.num_rows() {
        drops.rows_seen += 1;
        let date = match synthesize_date(&row_date_material(table, row, dates)) {
            Some(d) => d,
            None => {
                debug!("wide_to_long: row {}: no resolvable date, dropped", row);
                drops.unresolved_date += 1;
                continue;
            }
        };
        for (col, route) in routes.iter() {
            match parse_count(table.cell(row, *col)) {
                CountValue::Value(c) if c == 0.0 && drop_zero => drops.zero_count += 1,
                CountValue::Value(c) => observations.push(Observation::new(date, route, c)),
                CountValue::Missing => drops.missing_count += 1,
                CountValue::Invalid => {
                    debug!(
                        "wide_to_long: row {} route {:?}: invalid count {:?}",
                        row,
                        route,
                        table.cell(row, *col)
                    );
                    drops.invalid_count += 1
                }
            }
        }
    }

    if drops.unresolved_date > 0 {
        warn!(
            "wide_to_long: dropped {} rows without a resolvable date",
            drops.unresolved_date
        );
    }
    if drops.invalid_count > 0 {
        warn!(
            "wide_to_long: dropped {} invalid count cells",
            drops.invalid_count
        );
    }
    info!(
        "wide_to_long: {} observations from {} rows",
        observations.len(),
        drops.rows_seen
    );
    (Dataset::new(observations), drops)
}
