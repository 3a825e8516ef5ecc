use chrono::{DateTime, NaiveDate, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{as_f64, fetched_at};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
    /// Intensity bucket `0..=4`, as computed by the contributions proxy.
    pub level: u8,
}

/// Index of the per-year documents written in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub years: Vec<i32>,
    #[serde(with = "fetched_at")]
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearDocument {
    pub year: i32,
    #[serde(with = "fetched_at")]
    pub fetched_at: DateTime<Utc>,
    pub contributions: Vec<ContributionDay>,
}

#[derive(Deserialize)]
struct RawYear {
    contributions: Vec<ContributionDay>,
}

/// Years worth a calendar: any year with contributions, plus the current year
/// (and later) even while still empty or not yet listed. Keys of `total` that
/// are not years are ignored.
pub fn discover_years(raw: &Value, current_year: i32) -> Vec<i32> {
    let listed = raw
        .get("total")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter_map(|(key, count)| {
            let year = key.parse::<i32>().ok()?;
            let count = as_f64(count).unwrap_or_default();
            (count > 0.0 || year >= current_year).then_some(year)
        });

    listed
        .chain(std::iter::once(current_year))
        .sorted()
        .dedup()
        .collect()
}

/// Builds a year document with days sorted ascending and one entry per date.
pub fn normalize_year(
    raw: &Value,
    year: i32,
    fetched_at: DateTime<Utc>,
) -> Result<YearDocument, serde_json::Error> {
    let RawYear { contributions } = RawYear::deserialize(raw)?;
    let contributions: Vec<ContributionDay> = contributions
        .into_iter()
        .sorted_by_key(|day| day.date)
        .dedup_by(|a, b| a.date == b.date)
        .collect();

    if !is_contiguous(&contributions) {
        tracing::warn!("Contribution calendar for {year} has gaps between days");
    }

    Ok(YearDocument {
        year,
        fetched_at,
        contributions,
    })
}

pub fn is_contiguous(days: &[ContributionDay]) -> bool {
    days.windows(2)
        .all(|pair| pair[0].date.succ_opt() == Some(pair[1].date))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn zero_years_are_dropped_unless_current() {
        let raw = json!({ "total": { "2022": 0, "2023": 150, "2024": 0 } });
        assert_eq!(discover_years(&raw, 2024), vec![2023, 2024]);
    }

    #[test]
    fn non_year_keys_and_missing_total_are_ignored() {
        let raw = json!({ "total": { "lastYear": 812, "2021": 3, "2020": 0 } });
        assert_eq!(discover_years(&raw, 2024), vec![2021, 2024]);
        assert_eq!(
            discover_years(&json!({ "contributions": [] }), 2024),
            vec![2024]
        );
    }

    #[test]
    fn current_year_is_requested_before_it_is_listed() {
        assert_eq!(discover_years(&json!({ "total": {} }), 2026), vec![2026]);

        let raw = json!({ "total": { "2024": 12, "2025": 0 } });
        assert_eq!(discover_years(&raw, 2026), vec![2024, 2026]);
    }

    #[test]
    fn year_days_are_sorted_and_unique() {
        let fetched_at = Utc::now();
        let raw = json!({
            "total": { "2023": 7 },
            "contributions": [
                { "date": "2023-01-02", "count": 5, "level": 3 },
                { "date": "2023-01-01", "count": 2, "level": 1 },
                { "date": "2023-01-02", "count": 5, "level": 3 },
                { "date": "2023-01-03", "count": 0, "level": 0 }
            ]
        });

        let doc = normalize_year(&raw, 2023, fetched_at).unwrap();
        let dates: Vec<String> = doc
            .contributions
            .iter()
            .map(|day| day.date.to_string())
            .collect();
        assert_eq!(dates, ["2023-01-01", "2023-01-02", "2023-01-03"]);
        assert_eq!(doc.contributions[1].level, 3);
        assert!(is_contiguous(&doc.contributions));
        assert_eq!(doc.fetched_at, fetched_at);
    }

    #[test]
    fn negative_counts_are_rejected() {
        let raw = json!({ "contributions": [{ "date": "2023-01-01", "count": -1, "level": 0 }] });
        assert!(normalize_year(&raw, 2023, Utc::now()).is_err());
    }

    #[test]
    fn gaps_break_contiguity() {
        let day = |date: &str| ContributionDay {
            date: date.parse().unwrap(),
            count: 1,
            level: 1,
        };
        assert!(!is_contiguous(&[day("2023-12-30"), day("2024-01-01")]));
        assert!(is_contiguous(&[day("2023-12-31"), day("2024-01-01")]));
        assert!(is_contiguous(&[]));
    }
}
