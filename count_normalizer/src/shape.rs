use log::{debug, info};

use crate::classify::columns_with_role;
use crate::config::*;
use crate::counts::is_count_like;

/// The first column of each date role.
pub fn date_columns(roles: &[RoleMatch]) -> DateColumns {
    DateColumns {
        date: columns_with_role(roles, ColumnRole::Date).first().cloned(),
        year: columns_with_role(roles, ColumnRole::Year).first().cloned(),
        month: columns_with_role(roles, ColumnRole::Month).first().cloned(),
    }
}

/// Decides between the wide and the long layout from the column roles.
///
/// - wide: at least two location columns, each holding counts
/// - long: at most one location column and at least one count column
///
/// A single location column whose cells are counts (after separator and
/// placeholder cleanup) holds values, not labels: the table is then wide.
/// The other unnamed value columns (counts found by dtype alone, unknown
/// columns holding counts) are further locations.
pub fn detect_shape(roles: &[RoleMatch]) -> Result<ShapeDecision, NormalizeErrors> {
    let dates = date_columns(roles);
    let locations = columns_with_role(roles, ColumnRole::Location);
    let counts: Vec<&RoleMatch> = roles
        .iter()
        .filter(|m| m.role == ColumnRole::Count)
        .collect();
    debug!(
        "detect_shape: dates: {:?} locations: {:?} counts: {:?}",
        dates,
        locations,
        counts.iter().map(|m| m.column).collect::<Vec<usize>>()
    );

    if locations.len() >= 2 {
        return Ok(ShapeDecision::Wide { dates, locations });
    }

    if let [location] = locations.as_slice() {
        let value_location = roles
            .get(*location)
            .map(|m| m.count_like)
            .unwrap_or(false);
        if value_location {
            let mut wide_locations = vec![*location];
            wide_locations.extend(
                roles
                    .iter()
                    .filter(|m| match m.role {
                        ColumnRole::Count => !m.by_keyword,
                        ColumnRole::Unknown => m.count_like,
                        _ => false,
                    })
                    .map(|m| m.column),
            );
            wide_locations.sort_unstable();
            info!(
                "detect_shape: location column {:?} holds counts, reading as wide with {:?}",
                location, wide_locations
            );
            return Ok(ShapeDecision::Wide {
                dates,
                locations: wide_locations,
            });
        }
    }

    // Named count columns are preferred over columns that are merely numeric.
    let count = counts
        .iter()
        .find(|m| m.by_keyword)
        .or_else(|| counts.first())
        .map(|m| m.column);
    match (locations.first(), count) {
        (Some(location), Some(count)) => Ok(ShapeDecision::Long {
            dates,
            location: *location,
            count,
        }),
        _ => Err(NormalizeErrors::UnresolvedShape {
            columns: roles.iter().map(|m| m.name.clone()).collect(),
        }),
    }
}

/// Best-effort pass for tables whose layout was not recognized.
///
/// When the table has date material, every other column whose cells all
/// look like counts is taken as a location column of a wide table.
pub fn loosened_shape(
    table: &RawTable,
    roles: &[RoleMatch],
) -> Result<ShapeDecision, NormalizeErrors> {
    let dates = date_columns(roles);
    let unresolved = || NormalizeErrors::UnresolvedShape {
        columns: table.column_names(),
    };
    if dates.is_empty() {
        debug!("loosened_shape: no date material");
        return Err(unresolved());
    }
    let locations: Vec<usize> = roles
        .iter()
        .filter(|m| {
            !matches!(
                m.role,
                ColumnRole::Date | ColumnRole::Year | ColumnRole::Month
            )
        })
        .filter(|m| m.dtype != ColumnDtype::Empty)
        .filter(|m| {
            table
                .columns()
                .get(m.column)
                .map(|c| c.cells.iter().all(is_count_like))
                .unwrap_or(false)
        })
        .map(|m| m.column)
        .collect();
    if locations.is_empty() {
        debug!("loosened_shape: no count-like column");
        return Err(unresolved());
    }
    info!(
        "loosened_shape: reading {:?} as location columns",
        locations
            .iter()
            .filter_map(|idx| roles.get(*idx).map(|m| m.name.clone()))
            .collect::<Vec<String>>()
    );
    Ok(ShapeDecision::Wide { dates, locations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TableBuilder;
    use crate::classify::classify_table;

    fn table(header: &[&str], rows: &[&[&str]]) -> RawTable {
        let h: Vec<String> = header.iter().map(|s| s.to_string()).collect();
        let mut b = TableBuilder::new(&h);
        for r in rows {
            let fields: Vec<String> = r.iter().map(|s| s.to_string()).collect();
            b.add_text_row(&fields);
        }
        b.build()
    }

    #[test]
    fn wide_when_several_locations() {
        let t = table(
            &["Year", "Month", "Burrard Bridge", "Hornby Street"],
            &[&["2022", "Jan", "1000", "0"]],
        );
        let shape = detect_shape(&classify_table(&t)).unwrap();
        assert_eq!(
            shape,
            ShapeDecision::Wide {
                dates: DateColumns {
                    date: None,
                    year: Some(0),
                    month: Some(1)
                },
                locations: vec![2, 3]
            }
        );
    }

    #[test]
    fn long_prefers_named_count_columns() {
        let t = table(
            &["Location", "Direction", "CorrectionFactor", "date", "Volume"],
            &[&["Lions Gate", "N", "1.1", "2023-05-10", "1,250"]],
        );
        let shape = detect_shape(&classify_table(&t)).unwrap();
        assert_eq!(
            shape,
            ShapeDecision::Long {
                dates: DateColumns {
                    date: Some(3),
                    year: None,
                    month: None
                },
                location: 0,
                count: 4
            }
        );
    }

    #[test]
    fn lone_numeric_location_is_wide() {
        let t = table(
            &["Date", "Burrard Bridge", "Canada Line Bike Path", "Seaside"],
            &[&["2020-01-15", "10", "20", "30"]],
        );
        // "Canada Line Bike Path" is a second location, so this is plainly wide.
        assert!(matches!(
            detect_shape(&classify_table(&t)),
            Ok(ShapeDecision::Wide { .. })
        ));

        let t2 = table(&["Date", "Burrard Bridge", "Seaside"], &[&["2020-01-15", "10", "30"]]);
        assert_eq!(
            detect_shape(&classify_table(&t2)).unwrap(),
            ShapeDecision::Wide {
                dates: DateColumns {
                    date: Some(0),
                    year: None,
                    month: None
                },
                locations: vec![1, 2]
            }
        );
    }

    #[test]
    fn lone_location_with_separators_and_placeholders_is_wide() {
        let t = table(
            &["Date", "Burrard Bridge", "Seaside", "Kits"],
            &[
                &["2020-01-15", "1,000", "30", "12"],
                &["2020-02-15", "*", "40", "*"],
            ],
        );
        let roles = classify_table(&t);
        assert_eq!(roles[1].dtype, ColumnDtype::Text);
        assert_eq!(roles[3].role, ColumnRole::Unknown);
        assert_eq!(
            detect_shape(&roles).unwrap(),
            ShapeDecision::Wide {
                dates: DateColumns {
                    date: Some(0),
                    year: None,
                    month: None
                },
                locations: vec![1, 2, 3]
            }
        );
    }

    #[test]
    fn unrecognized_without_locations() {
        let t = table(&["Date", "Notes"], &[&["2020-01-15", "rainy"]]);
        assert!(matches!(
            detect_shape(&classify_table(&t)),
            Err(NormalizeErrors::UnresolvedShape { .. })
        ));
    }

    #[test]
    fn loosened_pass_uses_count_like_columns() {
        let t = table(
            &["Date", "Seaside", "Kits", "Notes"],
            &[
                &["2020-01-15", "1,000", "*", "rainy"],
                &["2020-02-15", "900", "12", "dry"],
            ],
        );
        let roles = classify_table(&t);
        assert!(detect_shape(&roles).is_err());
        assert_eq!(
            loosened_shape(&t, &roles).unwrap(),
            ShapeDecision::Wide {
                dates: DateColumns {
                    date: Some(0),
                    year: None,
                    month: None
                },
                locations: vec![1, 2]
            }
        );
    }

    #[test]
    fn loosened_pass_needs_dates() {
        let t = table(&["Seaside", "Kits"], &[&["1", "2"]]);
        let roles = classify_table(&t);
        assert!(loosened_shape(&t, &roles).is_err());
    }
}
