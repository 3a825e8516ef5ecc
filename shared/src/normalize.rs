use serde_json::Value;

/// Returns the first candidate field that is present with a non-null value.
///
/// Upstream APIs expose the same logical field under different names across
/// versions, so every normalizer resolves fields through an ordered candidate
/// list. A candidate starting with `/` is a JSON pointer into a nested object
/// (`/test/mode`), anything else is a plain key of `obj`.
pub fn extract_field<'a>(obj: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .find_map(|candidate| lookup(obj, candidate).filter(|value| !value.is_null()))
}

/// Same as [`extract_field`] but also skips falsy values (`""`, `0`, `false`),
/// for fields whose upstream fallback chain treats empty values as missing.
pub fn extract_truthy<'a>(obj: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .find_map(|candidate| lookup(obj, candidate).filter(|value| is_truthy(value)))
}

pub fn extract_f64(obj: &Value, candidates: &[&str]) -> Option<f64> {
    extract_field(obj, candidates).and_then(as_f64)
}

pub fn extract_str<'a>(obj: &'a Value, candidates: &[&str]) -> Option<&'a str> {
    extract_truthy(obj, candidates).and_then(Value::as_str)
}

fn lookup<'a>(obj: &'a Value, candidate: &str) -> Option<&'a Value> {
    if candidate.starts_with('/') {
        obj.pointer(candidate)
    } else {
        obj.get(candidate)
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numbers pass through, numeric strings are parsed, anything else is absent.
/// `"NaN"` and `"inf"` parse as floats but count as absent.
pub fn as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    number.filter(|n: &f64| n.is_finite())
}

/// Accuracy above 1 is a percentage and is scaled down to a fraction.
pub fn normalize_accuracy(raw: Option<f64>) -> Option<f64> {
    raw.map(|acc| if acc > 1.0 { acc / 100.0 } else { acc })
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Human duration: `"2 hrs 5 mins"` from one hour, `"5 mins"` from one minute,
/// `"59 secs"` from one second and `"250 ms"` below that.
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    if seconds < 1.0 {
        return format!("{:.0} ms", seconds * 1000.0);
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{} {}", unit(hours, "hr"), unit(minutes, "min"))
    } else if minutes > 0 {
        unit(minutes, "min")
    } else {
        unit(secs, "sec")
    }
}

fn unit(amount: u64, name: &str) -> String {
    if amount == 1 {
        format!("{amount} {name}")
    } else {
        format!("{amount} {name}s")
    }
}

/// First `n` items, order preserved.
pub fn truncate_list<T>(list: impl IntoIterator<Item = T>, n: usize) -> Vec<T> {
    list.into_iter().take(n).collect()
}
