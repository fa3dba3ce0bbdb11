use chrono::NaiveDate;
use log::{info, warn};
use std::collections::HashSet;

use crate::config::*;

/// Combines a historical and a recent dataset into one canonical dataset.
///
/// The result has at most one observation per (date, route) key. When both
/// sources carry the same key, the recent source wins. An empty dataset is
/// treated like an absent one; when both are absent the merge fails with
/// `NoData`. The result is sorted by (date, route).
pub fn merge_datasets(
    historical: Option<Dataset>,
    recent: Option<Dataset>,
) -> Result<MergeOutcome, NormalizeErrors> {
    let historical = historical.filter(|d| !d.is_empty());
    let recent = recent.filter(|d| !d.is_empty());
    let historical_rows = historical.as_ref().map(|d| d.len()).unwrap_or(0);
    let recent_rows = recent.as_ref().map(|d| d.len()).unwrap_or(0);

    // Sources in order of precedence.
    let sources: Vec<Dataset> = match (recent, historical) {
        (None, None) => {
            warn!("merge_datasets: both datasets are empty or absent");
            return Err(NormalizeErrors::NoData);
        }
        (Some(r), None) => {
            warn!("merge_datasets: historical data is missing, using only recent data");
            vec![r]
        }
        (None, Some(h)) => {
            warn!("merge_datasets: recent data is missing, using only historical data");
            vec![h]
        }
        (Some(r), Some(h)) => {
            info!(
                "merge_datasets: combining recent ({} rows) and historical ({} rows)",
                recent_rows, historical_rows
            );
            vec![r, h]
        }
    };

    let (dataset, duplicates_removed) = dedup_by_key(sources);
    if duplicates_removed > 0 {
        info!(
            "merge_datasets: removed {} duplicate (date, route) observations",
            duplicates_removed
        );
    }
    info!("merge_datasets: combined data has {} rows", dataset.len());
    Ok(MergeOutcome {
        dataset: dataset.sorted(),
        historical_rows,
        recent_rows,
        duplicates_removed,
    })
}

/// Keeps the first observation seen for each key, walking the sources in order.
fn dedup_by_key(sources: Vec<Dataset>) -> (Dataset, usize) {
    let mut seen: HashSet<(NaiveDate, String)> = HashSet::new();
    let mut kept: Vec<Observation> = Vec::new();
    let mut removed: usize = 0;
    for obs in sources.into_iter().flat_map(|d| d.observations) {
        if seen.insert((obs.date, obs.route.clone())) {
            kept.push(obs);
        } else {
            removed += 1;
        }
    }
    (Dataset::new(kept), removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(y: i32, m: u32, route: &str, count: f64) -> Observation {
        Observation::new(NaiveDate::from_ymd_opt(y, m, 15).unwrap(), route, count)
    }

    fn sample() -> Dataset {
        Dataset::new(vec![
            obs(2020, 1, "A", 1.0),
            obs(2020, 1, "B", 2.0),
            obs(2020, 2, "A", 3.0),
        ])
    }

    #[test]
    fn recent_wins_on_collisions() {
        let historical = Dataset::new(vec![obs(2020, 1, "X", 5.0)]);
        let recent = Dataset::new(vec![obs(2020, 1, "X", 9.0)]);
        let res = merge_datasets(Some(historical), Some(recent)).unwrap();
        assert_eq!(res.dataset.observations, vec![obs(2020, 1, "X", 9.0)]);
        assert_eq!(res.duplicates_removed, 1);
    }

    #[test]
    fn merging_with_itself_is_identity() {
        let res = merge_datasets(Some(sample()), Some(sample())).unwrap();
        assert_eq!(res.dataset, sample());
        assert_eq!(res.duplicates_removed, 3);
    }

    #[test]
    fn empty_side_yields_the_other() {
        let res = merge_datasets(Some(Dataset::default()), Some(sample())).unwrap();
        assert_eq!(res.dataset, sample());
        let res = merge_datasets(Some(sample()), None).unwrap();
        assert_eq!(res.dataset, sample());
        assert_eq!(res.recent_rows, 0);
    }

    #[test]
    fn nothing_to_merge() {
        assert_eq!(
            merge_datasets(Some(Dataset::default()), Some(Dataset::default())),
            Err(NormalizeErrors::NoData)
        );
        assert_eq!(merge_datasets(None, None), Err(NormalizeErrors::NoData));
    }

    #[test]
    fn result_is_sorted_by_date_then_route() {
        let historical = Dataset::new(vec![obs(2021, 5, "B", 1.0), obs(2019, 5, "Z", 1.0)]);
        let recent = Dataset::new(vec![obs(2021, 5, "A", 1.0), obs(2023, 1, "A", 1.0)]);
        let res = merge_datasets(Some(historical), Some(recent)).unwrap();
        let keys: Vec<(i32, String)> = res
            .dataset
            .observations
            .iter()
            .map(|o| (o.year, o.route.clone()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (2019, "Z".to_string()),
                (2021, "A".to_string()),
                (2021, "B".to_string()),
                (2023, "A".to_string())
            ]
        );
    }
}
