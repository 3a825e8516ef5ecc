use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::{
    as_f64, extract_f64, extract_field, extract_str, extract_truthy, normalize_accuracy,
    truncate_list,
};

pub const RECENT_LIMIT: usize = 20;

const DEFAULT_MODE: &str = "time";
const DEFAULT_TIME: u32 = 60;
const DEFAULT_LANGUAGE: &str = "english";

// Candidate fields, first match wins. Keep every alias for a field in one list
// so an upstream rename is a one-line change.
const WPM: &[&str] = &["wpm", "wpmRounded", "rawWpm"];
const PB_WPM: &[&str] = &["wpm", "wpmRounded", "rawWpm", "bestWpm"];
const ACC: &[&str] = &["acc", "accuracy", "accPercent"];
const TIMESTAMP: &[&str] = &["timestamp", "date", "createdAt"];
const MODE: &[&str] = &["mode", "/test/mode"];
const TIME: &[&str] = &["time", "duration", "/test/time"];
const LANGUAGE: &[&str] = &["language", "lang"];
const RESULT_DURATION: &[&str] = &["time", "duration"];
const UID: &[&str] = &["uid", "userId"];

const PROFILE_TESTS: &[&str] = &[
    "/typingStats/completedTests",
    "/typingStats/testsCompleted",
    "/typingStats/tests",
];
const PROFILE_TIME_TYPING: &[&str] = &["/typingStats/timeTyping", "/typingStats/timeTyped"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalBest {
    pub wpm: i64,
    /// Fraction `0..=1`.
    pub acc: Option<f64>,
    pub timestamp: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalBests {
    pub time15: Option<PersonalBest>,
    pub time60: Option<PersonalBest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub tests: u64,
    pub time_typing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub wpm: i64,
    pub acc: Option<f64>,
    pub mode: String,
    pub time: Number,
    pub language: String,
    pub timestamp: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonkeytypeDocument {
    pub profile: Option<Value>,
    pub summary: Summary,
    pub pbs: PersonalBests,
    pub recent: Vec<TestResult>,
}

/// Raw payloads gathered in one run. Any of them may be missing.
#[derive(Debug, Clone, Default)]
pub struct MonkeytypeSource {
    pub profile: Option<Value>,
    pub personal_bests: Option<Value>,
    pub results: Option<Value>,
}

impl MonkeytypeSource {
    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.personal_bests.is_none() && self.results.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.profile.is_some() && self.personal_bests.is_some() && self.results.is_some()
    }
}

/// Strips the API's `{ "message": ..., "data": ... }` envelope.
pub fn unwrap_envelope(raw: Value) -> Value {
    match raw {
        Value::Object(mut map) if map.contains_key("message") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Results arrive as a bare array or wrapped in `results` or `data`.
pub fn unwrap_results(raw: &Value) -> Option<&Vec<Value>> {
    raw.as_array()
        .or_else(|| raw.get("results").and_then(Value::as_array))
        .or_else(|| raw.get("data").and_then(Value::as_array))
}

/// Account id of the most recent result, used to address the profile endpoint.
pub fn uid_of_latest(results: &Value) -> Option<String> {
    let latest = unwrap_results(results)?.first()?;
    extract_str(latest, UID).map(ToString::to_string)
}

pub fn normalize(source: &MonkeytypeSource) -> MonkeytypeDocument {
    let results: &[Value] = source
        .results
        .as_ref()
        .and_then(unwrap_results)
        .map(Vec::as_slice)
        .unwrap_or_default();

    MonkeytypeDocument {
        profile: source.profile.clone(),
        summary: summary(source.profile.as_ref(), results),
        pbs: personal_bests(source.personal_bests.as_ref()),
        recent: truncate_list(results, RECENT_LIMIT)
            .into_iter()
            .map(test_result)
            .collect(),
    }
}

fn summary(profile: Option<&Value>, results: &[Value]) -> Summary {
    let tests = profile
        .and_then(|profile| extract_f64(profile, PROFILE_TESTS))
        .map(|tests| tests.max(0.0) as u64)
        .unwrap_or(results.len() as u64);
    let time_typing = profile
        .and_then(|profile| extract_f64(profile, PROFILE_TIME_TYPING))
        .unwrap_or_else(|| {
            results
                .iter()
                .filter_map(|result| extract_truthy(result, RESULT_DURATION).and_then(as_f64))
                .sum()
        });

    Summary { tests, time_typing }
}

fn test_result(entry: &Value) -> TestResult {
    TestResult {
        wpm: rounded_wpm(entry, WPM),
        acc: normalize_accuracy(extract_f64(entry, ACC)),
        mode: extract_str(entry, MODE).unwrap_or(DEFAULT_MODE).to_string(),
        time: extract_field(entry, TIME)
            .and_then(|time| match time {
                Value::Number(number) => Some(number.clone()),
                Value::String(text) => text.parse().ok(),
                _ => None,
            })
            .unwrap_or_else(|| DEFAULT_TIME.into()),
        language: extract_str(entry, LANGUAGE)
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string(),
        timestamp: extract_field(entry, TIMESTAMP).cloned(),
    }
}

fn rounded_wpm(entry: &Value, candidates: &[&str]) -> i64 {
    extract_f64(entry, candidates).unwrap_or_default().round() as i64
}

pub fn personal_bests(raw: Option<&Value>) -> PersonalBests {
    let Some(raw) = raw else {
        return PersonalBests::default();
    };

    PersonalBests {
        time15: find_personal_best(raw, 15),
        time60: find_personal_best(raw, 60),
    }
}

/// Understands three shapes:
/// * `{ "time15": pb, "time60": pb }`, already one record per duration,
/// * `{ "15": [..], "60": [..] }`, optionally nested under `time`, best first,
/// * a flat list of results that must be filtered by mode and duration.
fn find_personal_best(raw: &Value, secs: u32) -> Option<PersonalBest> {
    match raw {
        Value::Array(entries) => {
            best_of(entries.iter().filter(|entry| is_time_result(entry, secs)))
        }
        Value::Object(map) => {
            let keyed = ["time15", "time60"]
                .iter()
                .any(|key| map.get(*key).is_some_and(crate::is_truthy));
            if keyed {
                return map
                    .get(&format!("time{secs}"))
                    .and_then(record_or_best);
            }
            if let Some(records) = map.get(&secs.to_string()) {
                return record_or_best(records);
            }
            map.get("time")
                .and_then(|nested| find_personal_best(nested, secs))
        }
        _ => None,
    }
}

fn record_or_best(value: &Value) -> Option<PersonalBest> {
    match value {
        Value::Array(records) => best_of(records.iter()),
        Value::Object(_) => Some(personal_best(value)),
        _ => None,
    }
}

fn best_of<'a>(candidates: impl Iterator<Item = &'a Value>) -> Option<PersonalBest> {
    candidates
        .sorted_by(|a, b| wpm_of(b).total_cmp(&wpm_of(a)))
        .next()
        .map(personal_best)
}

fn wpm_of(entry: &Value) -> f64 {
    extract_f64(entry, PB_WPM).unwrap_or_default()
}

fn personal_best(entry: &Value) -> PersonalBest {
    PersonalBest {
        wpm: rounded_wpm(entry, PB_WPM),
        acc: normalize_accuracy(extract_f64(entry, ACC)),
        timestamp: extract_field(entry, TIMESTAMP).cloned(),
    }
}

fn is_time_result(entry: &Value, secs: u32) -> bool {
    let matches = |scope: &Value| {
        scope.get("mode").and_then(Value::as_str) == Some("time")
            && ["time", "duration"]
                .iter()
                .any(|key| scope.get(*key).and_then(Value::as_f64) == Some(secs as f64))
    };
    matches(entry) || entry.get("test").is_some_and(matches)
}
