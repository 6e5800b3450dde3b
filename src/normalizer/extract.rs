// Typed extractors. Each returns None when a candidate has the wrong shape,
// letting the resolver move on to the next source.
use crate::utils::{parse_bullets, parse_date};
use chrono::NaiveDate;
use serde_json::Value;

pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// An array of strings, or bullet text split into items.
pub fn as_text_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => {
            let list: Vec<String> = items.iter().filter_map(as_text).collect();
            (!list.is_empty()).then_some(list)
        }
        Value::String(text) => {
            let bullets = parse_bullets(text);
            if !bullets.is_empty() {
                Some(bullets)
            } else {
                as_text(value).map(|single| vec![single])
            }
        }
        _ => None,
    }
}

/// Integral number within `0..=max`. Numbers pass through unmodified;
/// strings are not coerced.
pub fn as_score(value: &Value, max: u8) -> Option<u8> {
    let n = value.as_f64()?;
    if n.fract() != 0.0 || n < 0.0 || n > f64::from(max) {
        return None;
    }
    Some(n as u8)
}

pub fn as_date(value: &Value) -> Option<NaiveDate> {
    value.as_str().and_then(parse_date)
}

/// `"signal: condition — meaning"` for the object form, the text otherwise.
pub fn as_watch_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            let part = |key: &str| map.get(key).and_then(as_text).unwrap_or_default();
            let (signal, condition, meaning) = (part("signal"), part("condition"), part("meaning"));
            if signal.is_empty() && condition.is_empty() && meaning.is_empty() {
                return None;
            }
            Some(format!("{}: {} — {}", signal, condition, meaning))
        }
        other => as_text(other),
    }
}
