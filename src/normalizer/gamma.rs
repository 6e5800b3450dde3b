// Gamma: macro regime, six domain badges and per-domain commentary
use super::color::normalize_color;
use super::extract::as_text;
use super::resolver::{Field, FieldResolver, FieldRule, FieldTable, SourcePath::*};
use crate::model::{Domain, GammaDetail, GammaDomainDetail, GammaDomainStatus};
use crate::utils::format_domain_name;
use serde_json::{Map, Value};

pub static GAMMA_FIELDS: FieldTable = FieldTable {
    domain: Domain::Gamma,
    rules: &[
        FieldRule {
            field: Field::AsOfDate,
            sources: &[
                Nested("level2.asof_week"),
                Nested("level1.asof_week"),
                Flat("asofWeek"),
                Flat("asofDate"),
                Flat("asOfDate"),
            ],
        },
        FieldRule {
            field: Field::PhaseUsed,
            sources: &[
                Nested("level2.phase_used"),
                Flat("cycleStagePrimary"),
                Nested("level1.cycle_stage_primary"),
            ],
        },
        FieldRule {
            field: Field::PhaseConfidence,
            sources: &[Nested("level2.phase_confidence"), Flat("phaseConfidence")],
        },
        FieldRule {
            field: Field::Headline,
            sources: &[Flat("headlineSummary"), Nested("level1.headline_summary")],
        },
        FieldRule {
            field: Field::PlainEnglishSummary,
            sources: &[Nested("level2.overall_summary"), Flat("overallSummary")],
        },
        FieldRule {
            field: Field::CycleStagePrimary,
            sources: &[Flat("cycleStagePrimary"), Nested("level1.cycle_stage_primary")],
        },
        FieldRule {
            field: Field::CycleStageTransition,
            sources: &[
                Flat("cycleStageTransition"),
                Nested("level1.cycle_stage_transition"),
            ],
        },
        FieldRule {
            field: Field::MacroPostureLabel,
            sources: &[Flat("macroPostureLabel"), Nested("level1.macro_posture_label")],
        },
        FieldRule {
            field: Field::CycleTone,
            sources: &[Nested("level2.cycle_tone"), Flat("cycleTone")],
        },
        FieldRule {
            field: Field::Domains,
            sources: &[Flat("domains"), Nested("level1.domains")],
        },
        FieldRule {
            field: Field::DomainDetails,
            sources: &[Nested("level2.domain_details"), Flat("domainDetails")],
        },
    ],
};

/// Display order of the domain commentary; unknown keys follow alphabetically.
const DOMAIN_ORDER: [&str; 6] = [
    "leadership",
    "breadth",
    "sentiment",
    "volatility",
    "credit_liquidity",
    "macro_trend",
];

fn text_at(map: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(as_text))
        .unwrap_or_default()
}

fn as_domain_statuses(value: &Value) -> Option<Vec<GammaDomainStatus>> {
    let statuses: Vec<GammaDomainStatus> = value
        .as_array()?
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| GammaDomainStatus {
            name: text_at(entry, &["domain_name", "domainName", "name"]),
            color: normalize_color(&text_at(entry, &["color_code", "colorCode"])),
            bias_label: text_at(entry, &["bias_label", "biasLabel"]),
        })
        .filter(|status| !status.name.is_empty())
        .collect();
    (!statuses.is_empty()).then_some(statuses)
}

fn detail_from_entry(name: String, entry: &Map<String, Value>) -> GammaDomainDetail {
    GammaDomainDetail {
        name,
        summary: text_at(entry, &["key_takeaway", "summary", "analysis"]),
        observations: text_at(entry, &["observations"]),
        interpretation: text_at(entry, &["analysis", "interpretation", "key_takeaway"]),
    }
}

/// Accepts the keyed object form (`{"credit_liquidity": {...}}`) and the
/// legacy array form (`[{"name": ..., "summary": ...}]`).
fn as_domain_details(value: &Value) -> Option<Vec<GammaDomainDetail>> {
    let details: Vec<GammaDomainDetail> = match value {
        Value::Object(map) => {
            let rank = |key: &str| {
                DOMAIN_ORDER
                    .iter()
                    .position(|known| *known == key)
                    .unwrap_or(DOMAIN_ORDER.len())
            };
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
            keys.into_iter()
                .filter_map(|key| {
                    map.get(key.as_str())
                        .and_then(Value::as_object)
                        .map(|entry| detail_from_entry(format_domain_name(key), entry))
                })
                .collect()
        }
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|entry| detail_from_entry(text_at(entry, &["name", "domain_name"]), entry))
            .filter(|detail| !detail.name.is_empty())
            .collect(),
        _ => return None,
    };
    (!details.is_empty()).then_some(details)
}

pub fn gamma_detail(fields: &FieldResolver<'_>) -> GammaDetail {
    GammaDetail {
        cycle_stage_primary: fields.text(Field::CycleStagePrimary),
        cycle_stage_transition: fields.text(Field::CycleStageTransition),
        macro_posture_label: fields.text(Field::MacroPostureLabel),
        cycle_tone: fields.text(Field::CycleTone),
        domains: fields
            .value(Field::Domains, as_domain_statuses)
            .unwrap_or_default(),
        domain_details: fields
            .value(Field::DomainDetails, as_domain_details)
            .unwrap_or_default(),
    }
}
