mod config;
pub mod builder;
pub mod classify;
pub mod counts;
pub mod dates;
pub mod long_form;
pub mod manual;
pub mod merge;
pub mod shape;
pub mod transpose;

use log::{info, warn};

pub use crate::config::*;
pub use crate::merge::merge_datasets;

/// Normalizes a table of unknown layout into canonical observations.
///
/// Arguments:
/// * `table` the raw table, as produced by a reader
/// * `options` the policies that govern the cleanup
///
/// The layout is inferred from the column roles. When neither the wide nor
/// the long layout is recognized, a loosened pass is attempted before giving
/// up with `UnresolvedShape`. Rows and cells that cannot be used are dropped
/// and counted in the returned `DropCounts`.
pub fn normalize_table(
    table: &RawTable,
    options: &NormalizeOptions,
) -> Result<Normalized, NormalizeErrors> {
    info!(
        "Processing table with {} rows, columns: {:?}",
        table.num_rows(),
        table.column_names()
    );
    let roles = classify::classify_table(table);

    let (shape, loosened) = match shape::detect_shape(&roles) {
        Ok(s) => (s, false),
        Err(e) => {
            warn!("{}, trying loosened column matching", e);
            (shape::loosened_shape(table, &roles)?, true)
        }
    };

    let (dataset, drops) = match &shape {
        ShapeDecision::Wide { dates, locations } => {
            info!("Processing wide format data (routes as columns)");
            transpose::wide_to_long(table, dates, locations, options)
        }
        ShapeDecision::Long {
            dates,
            location,
            count,
        } => {
            info!("Processing long format data (one row per observation)");
            long_form::normalize_long(table, dates, *location, *count, options)
        }
    };

    if dataset.is_empty() {
        warn!("No observation could be extracted from the table: {:?}", drops);
    }
    Ok(Normalized {
        dataset,
        shape,
        loosened,
        drops,
    })
}

#[cfg(test)]
mod tests {
    use super::builder::TableBuilder;
    use super::*;
    use chrono::NaiveDate;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn table(header: &[&str], rows: &[&[&str]]) -> RawTable {
        let h: Vec<String> = header.iter().map(|s| s.to_string()).collect();
        let mut b = TableBuilder::new(&h);
        for r in rows {
            let fields: Vec<String> = r.iter().map(|s| s.to_string()).collect();
            b.add_text_row(&fields);
        }
        b.build()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn wide_year_month_table() {
        init();
        let t = table(
            &["Year", "Month", "Burrard Bridge", "Hornby Street"],
            &[&["2022", "Jan", "1000", "0"]],
        );
        let res = normalize_table(&t, &NormalizeOptions::default()).unwrap();
        assert!(!res.loosened);
        assert_eq!(
            res.dataset.observations,
            vec![Observation {
                date: ymd(2022, 1, 15),
                year: 2022,
                month: "Jan".to_string(),
                route: "Burrard Bridge".to_string(),
                count: 1000.0,
            }]
        );
    }

    #[test]
    fn long_recent_export() {
        init();
        let t = table(
            &[
                "Location",
                "Direction",
                "CorrectionFactor",
                "PercentPassing20%",
                "date",
                "Volume",
            ],
            &[
                &["Lions Gate", "N", "1.02", "0.5", "2023-05-10", "1,250"],
                &["Lions Gate", "S", "1.02", "0.5", "2023-05-11", "*"],
            ],
        );
        let res = normalize_table(&t, &NormalizeOptions::default()).unwrap();
        assert!(matches!(res.shape, ShapeDecision::Long { count: 5, .. }));
        assert_eq!(
            res.dataset.observations,
            vec![Observation::new(ymd(2023, 5, 10), "Lions Gate", 1250.0)]
        );
        assert_eq!(res.drops.missing_count, 1);
    }

    #[test]
    fn historical_table_with_unnamed_routes_uses_loosened_pass() {
        init();
        let t = table(
            &["Date", "Seaside", "Kitsilano"],
            &[
                &["2019-01-15", "1,200", "300"],
                &["2019-02-15", "", "310"],
            ],
        );
        let res = normalize_table(&t, &NormalizeOptions::default()).unwrap();
        assert!(res.loosened);
        assert_eq!(res.dataset.len(), 3);
        assert_eq!(res.drops.missing_count, 1);
    }

    #[test]
    fn counts_with_separators_are_not_read_as_routes() {
        init();
        let t = table(
            &["Date", "Burrard Bridge", "Seaside"],
            &[&["2020-01-15", "1,000", "30"], &["2020-02-15", "*", "40"]],
        );
        let res = normalize_table(&t, &NormalizeOptions::default()).unwrap();
        assert!(matches!(res.shape, ShapeDecision::Wide { .. }));
        let obs: Vec<(&str, f64)> = res
            .dataset
            .observations
            .iter()
            .map(|o| (o.route.as_str(), o.count))
            .collect();
        assert_eq!(
            obs,
            vec![("Burrard Bridge", 1000.0), ("Seaside", 30.0), ("Seaside", 40.0)]
        );
        assert_eq!(res.drops.missing_count, 1);
    }

    #[test]
    fn unrecognizable_table() {
        init();
        let t = table(&["Notes", "Comment"], &[&["a", "b"]]);
        assert!(matches!(
            normalize_table(&t, &NormalizeOptions::default()),
            Err(NormalizeErrors::UnresolvedShape { .. })
        ));
    }

    // Every positive numeric cell with a dated row yields exactly one observation.
    #[test]
    fn wide_output_size_matches_positive_cells() {
        init();
        let rows: &[&[&str]] = &[
            &["2020", "1", "5", "0", "7", "*"],
            &["2020", "2", "", "3", "-1", "4"],
            &["", "3", "9", "9", "9", "9"],
            &["2020", "Apr", "1,000", "x", "2", "2"],
        ];
        let t = table(
            &[
                "Year",
                "Month",
                "Burrard Bridge",
                "Hornby Street",
                "Dunsmuir Viaduct",
                "Point Grey Road",
            ],
            rows,
        );
        let expected = 2 + 2 + 3;
        let res = normalize_table(&t, &NormalizeOptions::default()).unwrap();
        assert_eq!(res.dataset.len(), expected);
        assert_eq!(res.drops.unresolved_date, 1);
        assert_eq!(res.drops.zero_count, 1);
    }

    #[test]
    fn normalize_then_merge_end_to_end() {
        init();
        let historical = table(
            &["Year", "Month", "Burrard Bridge", "Hornby Street"],
            &[&["2020", "Jan", "5", "6"], &["2020", "Feb", "7", "8"]],
        );
        let recent = table(
            &["date", "Location", "Volume"],
            &[
                &["2020-01-15", "Burrard Bridge", "9"],
                &["2021-01-15", "Burrard Bridge", "11"],
            ],
        );
        let opts = NormalizeOptions::default();
        let h = normalize_table(&historical, &opts).unwrap().dataset;
        let r = normalize_table(&recent, &opts).unwrap().dataset;
        let merged = merge_datasets(Some(h), Some(r)).unwrap();
        assert_eq!(merged.dataset.len(), 5);
        assert_eq!(merged.duplicates_removed, 1);
        let burrard_jan: Vec<f64> = merged
            .dataset
            .observations
            .iter()
            .filter(|o| o.date == ymd(2020, 1, 15) && o.route == "Burrard Bridge")
            .map(|o| o.count)
            .collect();
        assert_eq!(burrard_jan, vec![9.0]);
        let summary = merged.dataset.summary();
        assert_eq!(summary.routes, 2);
        assert_eq!(summary.first_date, Some(ymd(2020, 1, 15)));
        assert_eq!(summary.last_date, Some(ymd(2021, 1, 15)));
        assert_eq!(summary.total_count, 9.0 + 6.0 + 7.0 + 8.0 + 11.0);
    }
}
