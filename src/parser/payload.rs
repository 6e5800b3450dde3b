// Upstream analysis documents: flat per-domain summaries plus optional fullAnalysis
use crate::model::Domain;
use crate::utils::parse_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A `fullAnalysis.<domain>` entry, which upstream sends either as an object
/// or as JSON text.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedPayload {
    Raw(Value),
    Encoded(String),
}

impl NestedPayload {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(NestedPayload::Encoded(text)),
            other => Some(NestedPayload::Raw(other)),
        }
    }

    /// Single decode step. Malformed text or a non-object document yields `None`.
    pub fn decode(&self, domain: Domain) -> Option<Value> {
        let value = match self {
            NestedPayload::Raw(value) => value.clone(),
            NestedPayload::Encoded(text) => match serde_json::from_str::<Value>(text) {
                Ok(value) => value,
                Err(e) => {
                    warn!(%domain, error = %e, "Malformed fullAnalysis document, using flat fields only");
                    return None;
                }
            },
        };

        if value.is_object() {
            Some(value)
        } else {
            warn!(%domain, "fullAnalysis document is not an object, ignoring it");
            None
        }
    }
}

/// One upstream analysis document. Built fail-soft: unusable parts are
/// dropped with a diagnostic instead of rejecting the whole payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAnalysisPayload {
    flat: BTreeMap<Domain, Value>,
    nested: BTreeMap<Domain, NestedPayload>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RawAnalysisPayload {
    pub fn from_value(value: &Value) -> Self {
        let mut payload = Self::default();
        let Some(root) = value.as_object() else {
            warn!("Analysis payload is not an object");
            return payload;
        };

        for domain in Domain::ALL {
            match root.get(domain.key()) {
                None | Some(Value::Null) => {}
                Some(flat @ Value::Object(_)) => {
                    payload.flat.insert(domain, flat.clone());
                }
                Some(_) => warn!(%domain, "Flat domain summary is not an object, ignoring it"),
            }
        }

        if let Some(full) = root.get("fullAnalysis") {
            let full = match full {
                Value::String(text) => match serde_json::from_str::<Value>(text) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        warn!(error = %e, "Malformed fullAnalysis text, using flat fields only");
                        Value::Null
                    }
                },
                other => other.clone(),
            };
            if let Value::Object(domains) = full {
                for domain in Domain::ALL {
                    if let Some(nested) = domains
                        .get(domain.key())
                        .cloned()
                        .and_then(NestedPayload::from_value)
                    {
                        payload.nested.insert(domain, nested);
                    }
                }
            }
        }

        payload.updated_at = root
            .get("updatedAt")
            .and_then(Value::as_str)
            .and_then(parse_datetime);

        debug!(
            flat = payload.flat.len(),
            nested = payload.nested.len(),
            "Parsed analysis payload"
        );
        payload
    }

    pub fn flat(&self, domain: Domain) -> Option<&Value> {
        self.flat.get(&domain)
    }

    pub fn nested(&self, domain: Domain) -> Option<&NestedPayload> {
        self.nested.get(&domain)
    }

    pub fn with_flat(mut self, domain: Domain, value: Value) -> Self {
        self.flat.insert(domain, value);
        self
    }

    pub fn with_nested(mut self, domain: Domain, nested: NestedPayload) -> Self {
        self.nested.insert(domain, nested);
        self
    }

    /// No usable document for any domain.
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty() && self.nested.is_empty()
    }
}

impl<'de> Deserialize<'de> for RawAnalysisPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_nested_documents_as_text_or_object() {
        let raw = RawAnalysisPayload::from_value(&json!({
            "delta": { "fragilityScore": 3 },
            "fullAnalysis": {
                "delta": "{\"level2\":{\"fragility_score\":5}}",
                "gamma": { "level2": { "cycle_tone": "Cautious" } },
                "fusion": null
            },
            "updatedAt": "2025-11-05T21:30:00Z"
        }));

        assert!(matches!(raw.nested(Domain::Delta), Some(NestedPayload::Encoded(_))));
        assert!(matches!(raw.nested(Domain::Gamma), Some(NestedPayload::Raw(_))));
        assert!(raw.nested(Domain::Fusion).is_none());
        assert!(raw.updated_at.is_some());

        let delta = raw.nested(Domain::Delta).unwrap().decode(Domain::Delta).unwrap();
        assert_eq!(delta["level2"]["fragility_score"], 5);
    }

    #[test]
    fn malformed_text_decodes_to_none() {
        let nested = NestedPayload::Encoded("{\"level2\": {\"fragility_sc".to_string());
        assert_eq!(nested.decode(Domain::Delta), None);
    }

    #[test]
    fn non_object_parts_are_dropped() {
        let raw = RawAnalysisPayload::from_value(&json!({
            "gamma": "oops",
            "delta": [1, 2],
            "fullAnalysis": "not json"
        }));
        assert!(raw.is_empty());
    }

    #[test]
    fn full_analysis_may_itself_be_encoded() {
        let raw = RawAnalysisPayload::from_value(&json!({
            "fullAnalysis": "{\"fusion\": {\"layer1\": {\"cycle_stage\": \"MARKUP\"}}}"
        }));
        assert!(raw.nested(Domain::Fusion).is_some());
        assert!(!raw.is_empty());
    }

    #[test]
    fn deserializes_through_serde() {
        let raw: RawAnalysisPayload =
            serde_json::from_str(r#"{"gamma":{"cycleStagePrimary":"Late Expansion"}}"#).unwrap();
        assert_eq!(
            raw.flat(Domain::Gamma).unwrap()["cycleStagePrimary"],
            "Late Expansion"
        );
    }
}
