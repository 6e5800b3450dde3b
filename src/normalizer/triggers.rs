// Next-trigger rows: keep only entries with a real condition and effect
use crate::model::Trigger;
use serde_json::{Map, Value};
use tracing::debug;

const PLACEHOLDERS: [&str; 3] = ["CONDITION", "EFFECT", "N/A"];

fn is_placeholder(text: &str) -> bool {
    text.is_empty() || PLACEHOLDERS.contains(&text)
}

/// Rows may use `condition`/`effect` or the upper-case keys. The first
/// non-empty spelling wins.
fn row_field(row: &Map<String, Value>, lower: &str, upper: &str) -> String {
    [lower, upper]
        .iter()
        .find_map(|key| {
            row.get(*key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_default()
        .to_string()
}

pub fn filter_triggers(rows: &[Value]) -> Vec<Trigger> {
    rows.iter()
        .filter_map(|row| {
            let Some(row) = row.as_object() else {
                debug!("Dropping non-object trigger row");
                return None;
            };
            let condition = row_field(row, "condition", "CONDITION");
            let effect = row_field(row, "effect", "EFFECT");
            if is_placeholder(&condition) || is_placeholder(&effect) {
                debug!(%condition, %effect, "Dropping placeholder trigger row");
                return None;
            }
            Some(Trigger { condition, effect })
        })
        .collect()
}

/// Extractor form. A list that filters down to nothing counts as absent.
pub fn as_triggers(value: &Value) -> Option<Vec<Trigger>> {
    let triggers = filter_triggers(value.as_array()?);
    (!triggers.is_empty()).then_some(triggers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholder_rows_are_dropped() {
        let rows = json!([
            { "condition": "CONDITION", "effect": "EFFECT" },
            { "condition": "VIX>30", "effect": "defensive" }
        ]);
        let kept = as_triggers(&rows).unwrap();
        assert_eq!(
            kept,
            vec![Trigger {
                condition: "VIX>30".to_string(),
                effect: "defensive".to_string()
            }]
        );
    }

    #[test]
    fn empty_and_na_fields_are_dropped() {
        let rows = json!([
            { "condition": "", "effect": "x" },
            { "condition": "N/A", "effect": "x" },
            { "condition": "Breadth < 40%", "effect": "N/A" },
            { "condition": "Breadth < 40%" },
            "not a row",
            { "CONDITION": "HY spreads > 450bp", "EFFECT": "raise fragility" }
        ]);
        let kept = filter_triggers(rows.as_array().unwrap());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].condition, "HY spreads > 450bp");
    }

    #[test]
    fn blank_lower_case_key_falls_back_to_upper_case() {
        let rows = json!([
            { "condition": "", "CONDITION": "VIX>30", "effect": "defensive" },
            { "condition": null, "CONDITION": "HY>450", "effect": "raise" }
        ]);
        let kept = filter_triggers(rows.as_array().unwrap());
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].condition, "VIX>30");
        assert_eq!(kept[1].condition, "HY>450");
        assert_eq!(kept[1].effect, "raise");
    }

    #[test]
    fn all_placeholder_list_counts_as_absent() {
        assert_eq!(as_triggers(&json!([{ "condition": "N/A", "effect": "N/A" }])), None);
        assert_eq!(as_triggers(&json!("VIX>30")), None);
    }
}
