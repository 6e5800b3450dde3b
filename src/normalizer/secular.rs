// Secular assistant analysis -> SecularView (Fusion v2 page)
use super::extract::as_text;
use crate::model::{Scenario, SecularLayer1, SecularLayer3, SecularMetadata, SecularView};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::warn;

const NA: &str = "N/A";
const SCENARIO_COUNT: usize = 4;
const DEFAULT_TOTAL_SCENARIOS: u32 = 4;
const TIME_HORIZON: &str = "Medium to Long Term";
const LATEST_CHART_PATH: &str = "/latest-chart";
const ANNOTATED_CHART_PATH: &str = "/annotated-chart";

/// Builds the secular view from an `{"analysis": {...}, "timestamp": ...}`
/// response. Returns None when the response carries no analysis object.
pub fn normalize_secular(response: &Value, secular_api_base: &str) -> Option<SecularView> {
    normalize_secular_at(response, secular_api_base, Utc::now())
}

fn normalize_secular_at(
    response: &Value,
    secular_api_base: &str,
    now: DateTime<Utc>,
) -> Option<SecularView> {
    let Some(analysis) = response.get("analysis").and_then(Value::as_object) else {
        warn!("Secular response has no analysis object");
        return None;
    };
    let text = |key: &str| field_or_na(analysis, key);

    let layer1 = SecularLayer1 {
        trend: text("secular_trend"),
        phase: text("secular_regime_status"),
        strength: text("channel_position"),
        momentum: text("risk_bias"),
        support: text("interpretation"),
        resistance: text("dominant_dynamics"),
        outlook: text("summary_signal"),
    };

    let scenarios = (1..=SCENARIO_COUNT)
        .map(|i| scenario(analysis, i))
        .collect();

    let layer3 = SecularLayer3 {
        primary_message: text("primary_message"),
        actionable_insight: text("secular_summary"),
        risk_warning: text("overall_bias"),
        key_level: text("scenario_summary_1"),
        time_horizon: TIME_HORIZON.to_string(),
    };

    let metadata = SecularMetadata {
        total_scenarios: analysis
            .get("layer2_total_scenarios")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_TOTAL_SCENARIOS),
        most_likely: text("layer2_most_likely_scenario"),
        recommendation: text("layer2_recommendation"),
        timestamp: response
            .get("timestamp")
            .and_then(as_text)
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        chart_url: chart_url(
            secular_api_base,
            analysis.get("original_chart_url").and_then(as_text),
            LATEST_CHART_PATH,
        ),
        annotated_chart_url: chart_url(
            secular_api_base,
            analysis.get("annotated_chart_url").and_then(as_text),
            ANNOTATED_CHART_PATH,
        ),
        as_of_date: analysis
            .get("asof_date")
            .and_then(as_text)
            .unwrap_or_else(|| now.date_naive().to_string()),
    };

    Some(SecularView {
        layer1,
        scenarios,
        layer3,
        metadata,
    })
}

fn field_or_na(analysis: &Map<String, Value>, key: &str) -> String {
    analysis
        .get(key)
        .and_then(as_text)
        .unwrap_or_else(|| NA.to_string())
}

fn scenario(analysis: &Map<String, Value>, i: usize) -> Scenario {
    let text = |suffix: &str| field_or_na(analysis, &format!("scenario{i}_{suffix}"));
    let target_zone = text("target_zone");
    Scenario {
        name: analysis
            .get(&format!("scenario{i}_name"))
            .and_then(as_text)
            .unwrap_or_else(|| format!("Scenario {i}")),
        probability: analysis
            .get(&format!("scenario{i}_probability"))
            .map(probability_percent)
            .unwrap_or(0.0),
        trigger: text("path_summary"),
        price_target: target_zone.clone(),
        expected_move: format!(
            "{}% to {}%",
            text("expected_move_min"),
            text("expected_move_max")
        ),
        key_levels: target_zone,
        catalysts: text("technical_logic"),
        risks: text("risk_profile"),
    }
}

/// A 0-1 fraction (number or numeric text) as a percent rounded to two
/// decimals. Text ending in `%` is already a percent.
fn probability_percent(value: &Value) -> f64 {
    let percent = match value {
        Value::Number(n) => n.as_f64().map(|f| f * 100.0),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f64>().ok(),
                None => s.parse::<f64>().ok().map(|f| f * 100.0),
            }
        }
        _ => None,
    };
    percent
        .filter(|p| p.is_finite())
        .map(|p| (p * 100.0).round() / 100.0)
        .unwrap_or(0.0)
}

fn chart_url(base: &str, path: Option<String>, default_path: &str) -> String {
    let path = path.unwrap_or_else(|| default_path.to_string());
    if path.starts_with("http://") || path.starts_with("https://") {
        return path;
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
