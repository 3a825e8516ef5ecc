use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    extract_f64, extract_str, fetched_at, format_duration, round_to_tenth, truncate_list,
};

pub const TOP_LANGUAGES: usize = 6;
pub const TOP_PROJECTS: usize = 4;
pub const TOP_EDITORS: usize = 3;

const TOTAL_SECONDS: &[&str] = &["total_seconds", "total_seconds_including_other_language"];
const DAILY_AVERAGE: &[&str] = &["daily_average", "daily_average_including_other_language"];
const RANGE: &[&str] = &["range", "human_readable_range"];

const BUCKET_NAME: &[&str] = &["name"];
const BUCKET_SECONDS: &[&str] = &["total_seconds"];
const BUCKET_PERCENT: &[&str] = &["percent"];
const BUCKET_TEXT: &[&str] = &["text"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: String,
    pub total_seconds: f64,
    /// Share of the total, `0..=100`, one decimal.
    pub percent: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WakaTimeDocument {
    #[serde(with = "fetched_at")]
    pub fetched_at: DateTime<Utc>,
    pub range: Option<String>,
    pub total_seconds: f64,
    pub daily_average_seconds: f64,
    pub languages: Vec<Bucket>,
    pub projects: Vec<Bucket>,
    pub editors: Vec<Bucket>,
}

impl WakaTimeDocument {
    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            range: None,
            total_seconds: 0.0,
            daily_average_seconds: 0.0,
            languages: vec![],
            projects: vec![],
            editors: vec![],
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.languages.len() + self.projects.len() + self.editors.len()
    }
}

/// Normalizes a `stats/last_7_days` response. Returns `None` when the payload
/// carries no `data` object.
pub fn normalize(raw: &Value, fetched_at: DateTime<Utc>) -> Option<WakaTimeDocument> {
    let data = raw.get("data").filter(|data| data.is_object())?;

    Some(WakaTimeDocument {
        fetched_at,
        range: extract_str(data, RANGE).map(ToString::to_string),
        total_seconds: extract_f64(data, TOTAL_SECONDS).unwrap_or_default(),
        daily_average_seconds: extract_f64(data, DAILY_AVERAGE).unwrap_or_default(),
        languages: buckets(data.get("languages"), TOP_LANGUAGES),
        projects: buckets(data.get("projects"), TOP_PROJECTS),
        editors: buckets(data.get("editors"), TOP_EDITORS),
    })
}

// The API sorts each list by time spent, so the head of the list is the top-N.
fn buckets(list: Option<&Value>, limit: usize) -> Vec<Bucket> {
    let items = list.and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
    truncate_list(items, limit).into_iter().map(bucket).collect()
}

fn bucket(item: &Value) -> Bucket {
    let total_seconds = extract_f64(item, BUCKET_SECONDS).unwrap_or_default();
    Bucket {
        name: extract_str(item, BUCKET_NAME).unwrap_or("Unknown").to_string(),
        total_seconds,
        percent: round_to_tenth(extract_f64(item, BUCKET_PERCENT).unwrap_or_default()),
        text: extract_str(item, BUCKET_TEXT)
            .map(ToString::to_string)
            .unwrap_or_else(|| format_duration(total_seconds)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn language(name: &str, seconds: f64, percent: f64) -> Value {
        json!({ "name": name, "total_seconds": seconds, "percent": percent })
    }

    #[test]
    fn lists_are_cut_to_top_n_in_source_order() {
        let languages: Vec<Value> = (0..9)
            .map(|i| language(&format!("lang-{i}"), 100.0 - i as f64, 10.0))
            .collect();
        let raw = json!({
            "data": {
                "range": "last_7_days",
                "total_seconds": 98765.4,
                "daily_average": 14109.3,
                "languages": languages,
                "projects": [
                    { "name": "portfolio", "total_seconds": 4000, "percent": 60.04, "text": "1 hr 6 mins" },
                    { "name": "dotfiles", "total_seconds": 100, "percent": 1.5 },
                    { "name": "a" }, { "name": "b" }, { "name": "c" }
                ],
                "editors": [{ "name": "Neovim", "total_seconds": 3661, "percent": 99.96 }]
            }
        });

        let doc = normalize(&raw, Utc::now()).unwrap();
        assert_eq!(doc.range.as_deref(), Some("last_7_days"));
        assert_eq!(doc.total_seconds, 98765.4);
        assert_eq!(doc.daily_average_seconds, 14109.3);

        assert_eq!(doc.languages.len(), TOP_LANGUAGES);
        assert_eq!(doc.languages[0].name, "lang-0");
        assert_eq!(doc.languages[5].name, "lang-5");

        assert_eq!(doc.projects.len(), TOP_PROJECTS);
        assert_eq!(doc.projects[0].percent, 60.0);
        assert_eq!(doc.projects[0].text, "1 hr 6 mins");
        assert_eq!(doc.projects[1].text, "1 min");
        assert_eq!(doc.projects[2].text, "0 ms");

        assert_eq!(doc.editors.len(), 1);
        assert_eq!(doc.editors[0].percent, 100.0);
        assert_eq!(doc.editors[0].text, "1 hr 1 min");
        assert_eq!(doc.bucket_count(), 11);
    }

    #[test]
    fn missing_names_and_lists_fall_back_to_defaults() {
        let raw = json!({ "data": { "languages": [{ "name": "", "total_seconds": 59 }] } });
        let doc = normalize(&raw, Utc::now()).unwrap();
        assert_eq!(doc.languages[0].name, "Unknown");
        assert_eq!(doc.languages[0].percent, 0.0);
        assert_eq!(doc.languages[0].text, "59 secs");
        assert!(doc.projects.is_empty());
        assert!(doc.editors.is_empty());
        assert_eq!(doc.range, None);
    }

    #[test]
    fn non_finite_strings_become_zero() {
        let raw = json!({
            "data": {
                "total_seconds": "inf",
                "languages": [{ "name": "Rust", "total_seconds": "NaN", "percent": "NaN" }]
            }
        });
        let doc = normalize(&raw, Utc::now()).unwrap();
        assert_eq!(doc.total_seconds, 0.0);
        assert_eq!(doc.languages[0].total_seconds, 0.0);
        assert_eq!(doc.languages[0].percent, 0.0);
        assert_eq!(doc.languages[0].text, "0 ms");

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["languages"][0]["percent"], json!(0.0));
    }

    #[test]
    fn payload_without_data_is_rejected() {
        assert!(normalize(&json!({ "error": "Unauthorized" }), Utc::now()).is_none());
        assert!(normalize(&json!({ "data": null }), Utc::now()).is_none());
    }

    #[test]
    fn serialized_field_names_are_camel_case() {
        let doc = WakaTimeDocument::empty(Utc::now());
        let value = serde_json::to_value(&doc).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "fetchedAt",
                "range",
                "totalSeconds",
                "dailyAverageSeconds",
                "languages",
                "projects",
                "editors"
            ]
        );
    }
}
