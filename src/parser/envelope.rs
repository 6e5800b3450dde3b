// Response envelopes used by the upstream APIs
use crate::model::{ArchiveEntry, Newsletter};
use serde_json::Value;

/// tRPC batch responses wrap the payload as `[{"result": {"data": ...}}]`.
pub fn unwrap_trpc(body: &Value) -> Option<&Value> {
    body.get(0)?
        .get("result")?
        .get("data")
        .filter(|data| !data.is_null())
}

/// Daily Pulse answers either `{"newsletter": {...}}` or the newsletter itself.
pub fn parse_newsletter(body: Value) -> Result<Newsletter, serde_json::Error> {
    let inner = match body {
        Value::Object(mut map) => match map.remove("newsletter") {
            Some(newsletter) if !newsletter.is_null() => newsletter,
            _ => Value::Object(map),
        },
        other => other,
    };
    serde_json::from_value(inner)
}

/// `{"newsletters": [...]}`; a missing list is an empty archive.
pub fn parse_archive(body: Value) -> Result<Vec<ArchiveEntry>, serde_json::Error> {
    match body.get("newsletters") {
        Some(list) if !list.is_null() => serde_json::from_value(list.clone()),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_trpc_batch() {
        let body = json!([{ "result": { "data": { "delta": {} } } }]);
        assert!(unwrap_trpc(&body).unwrap().get("delta").is_some());
    }

    #[test]
    fn malformed_trpc_envelopes_yield_none() {
        assert!(unwrap_trpc(&json!([])).is_none());
        assert!(unwrap_trpc(&json!({ "result": { "data": {} } })).is_none());
        assert!(unwrap_trpc(&json!([{ "result": { "data": null } }])).is_none());
        assert!(unwrap_trpc(&json!([{ "error": { "message": "boom" } }])).is_none());
    }

    #[test]
    fn newsletter_envelope_is_optional() {
        let wrapped = parse_newsletter(json!({ "newsletter": { "title": "Wrapped" } })).unwrap();
        assert_eq!(wrapped.title, "Wrapped");
        let bare = parse_newsletter(json!({ "title": "Bare" })).unwrap();
        assert_eq!(bare.title, "Bare");
    }

    #[test]
    fn archive_without_list_is_empty() {
        assert!(parse_archive(json!({})).unwrap().is_empty());
        let entries = parse_archive(json!({
            "newsletters": [{ "publishDate": "2025-11-05", "title": "Pulse" }]
        }))
        .unwrap();
        assert_eq!(entries.len(), 1);
    }
}
