use log::{debug, info, warn};

use crate::config::*;
use crate::counts::{is_placeholder, parse_count, CountValue};
use crate::dates::synthesize_date;
use crate::transpose::row_date_material;

/// Recasts a long table (one row per observation) into canonical observations.
///
/// Rows are kept one for one: rows sharing a (date, location) key are not
/// aggregated here, that is left to the merge.
pub fn normalize_long(
    table: &RawTable,
    dates: &DateColumns,
    location: usize,
    count: usize,
    options: &NormalizeOptions,
) -> (Dataset, DropCounts) {
    let drop_zero = options.drop_zero(false);
    let mut drops = DropCounts::default();
    let mut observations: Vec<Observation> = Vec::new();
    info!(
        "normalize_long: {} rows, location column {:?}, count column {:?}",
        table.num_rows(),
        table.columns().get(location).map(|c| &c.name),
        table.columns().get(count).map(|c| &c.name)
    );

    for row in 0..table.num_rows() {
        drops.rows_seen += 1;
        let date = match synthesize_date(&row_date_material(table, row, dates)) {
            Some(d) => d,
            None => {
                debug!("normalize_long: row {}: no resolvable date", row);
                drops.unresolved_date += 1;
                continue;
            }
        };
        let route = match table.cell(row, location).as_text() {
            Some(r) if !is_placeholder(&r) => r,
            _ => {
                drops.missing_location += 1;
                continue;
            }
        };
        match parse_count(table.cell(row, count)) {
            CountValue::Value(c) if c == 0.0 && drop_zero => drops.zero_count += 1,
            CountValue::Value(c) => observations.push(Observation::new(date, &route, c)),
            CountValue::Missing => drops.missing_count += 1,
            CountValue::Invalid => {
                debug!(
                    "normalize_long: row {}: invalid count {:?}",
                    row,
                    table.cell(row, count)
                );
                drops.invalid_count += 1
            }
        }
    }

    if drops.total() > 0 {
        warn!("normalize_long: dropped rows: {:?}", drops);
    }
    info!(
        "normalize_long: {} observations from {} rows",
        observations.len(),
        drops.rows_seen
    );
    (Dataset::new(observations), drops)
}
