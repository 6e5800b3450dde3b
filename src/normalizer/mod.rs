// Normalizer module: maps raw upstream payloads onto canonical AnalysisView records.
//
// Normalization never fails. Field-level problems fall back to the next
// candidate source or the field's empty default; a domain without any usable
// document comes back flagged NoData.

pub mod color;
pub mod delta;
pub mod extract;
pub mod fusion;
pub mod gamma;
pub mod resolver;
pub mod scores;
pub mod secular;
pub mod triggers;

use crate::model::{
    AnalysisView, Dimension, Domain, DomainDetail, MAX_DIMENSION_SCORE, MAX_FRAGILITY_SCORE,
    PortalViews,
};
use crate::parser::RawAnalysisPayload;
use extract::{as_date, as_score, as_text};
use resolver::{DecodedPayload, Field, FieldResolver, FieldTable};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub use secular::normalize_secular;

fn field_table(domain: Domain) -> &'static FieldTable {
    match domain {
        Domain::Gamma => &gamma::GAMMA_FIELDS,
        Domain::Delta => &delta::DELTA_FIELDS,
        Domain::Fusion => &fusion::FUSION_FIELDS,
    }
}

/// Normalizes one domain. Fusion reads Gamma's and Delta's documents from the
/// same payload.
pub fn normalize(raw: &RawAnalysisPayload, domain: Domain) -> AnalysisView {
    let mut needed = vec![domain];
    needed.extend_from_slice(domain.peers());
    let docs = DecodedPayload::decode(raw, &needed);
    normalize_decoded(&docs, domain)
}

/// Normalizes all three domains, decoding each nested document once. Fusion
/// runs last, after Gamma and Delta.
pub fn normalize_all(raw: &RawAnalysisPayload) -> PortalViews {
    let docs = DecodedPayload::decode(raw, &Domain::ALL);
    let gamma = normalize_decoded(&docs, Domain::Gamma);
    let delta = normalize_decoded(&docs, Domain::Delta);
    let fusion = normalize_decoded(&docs, Domain::Fusion);
    info!(
        gamma = gamma.has_data(),
        delta = delta.has_data(),
        fusion = fusion.has_data(),
        "Normalized analysis views"
    );
    PortalViews {
        gamma,
        delta,
        fusion,
        updated_at: raw.updated_at,
    }
}

fn normalize_decoded(docs: &DecodedPayload<'_>, domain: Domain) -> AnalysisView {
    if !docs.has_documents(domain) {
        debug!(%domain, "No usable documents for domain");
        return AnalysisView::no_data(domain);
    }

    let fields = docs.resolver(field_table(domain));
    let mut view = common_fields(domain, &fields);
    view.detail = match domain {
        Domain::Gamma => DomainDetail::Gamma(gamma::gamma_detail(&fields)),
        Domain::Delta => DomainDetail::Delta(delta::delta_detail(&fields)),
        Domain::Fusion => DomainDetail::Fusion(fusion::fusion_detail(&fields)),
    };
    view
}

/// Fields shared by every domain; tables that do not map a field leave it empty.
fn common_fields(domain: Domain, fields: &FieldResolver<'_>) -> AnalysisView {
    let mut view = AnalysisView::empty(domain);

    view.as_of_date = fields.value(Field::AsOfDate, as_date);

    let mut dimensions = BTreeMap::new();
    for dimension in Dimension::ALL {
        if let Some(score) = fields.resolve(Field::DimensionScore(dimension), |v| {
            as_score(v, MAX_DIMENSION_SCORE)
        }) {
            view.dimension_scores.insert(dimension, score.value);
            dimensions.insert(dimension, score);
        }
        let commentary = fields.text(Field::DimensionCommentary(dimension));
        if !commentary.is_empty() {
            view.dimension_commentary.insert(dimension, commentary);
        }
    }

    let reported = fields.resolve(Field::FragilityScore, |v| {
        as_score(v, MAX_FRAGILITY_SCORE)
    });
    view.fragility.score = scores::reconcile_score(reported, &dimensions);
    view.fragility.color = fields
        .value(Field::FragilityColor, color::as_color)
        .unwrap_or_default();
    view.fragility.label = fields.text(Field::FragilityLabel);

    view.phase.used = fields.text(Field::PhaseUsed);
    view.phase.confidence = fields.value(Field::PhaseConfidence, as_text);

    view.narrative.headline = fields.text(Field::Headline);
    view.narrative.rationale_bullets = fields.list(Field::RationaleBullets);
    view.narrative.plain_english_summary = fields.text(Field::PlainEnglishSummary);

    view.next_triggers = fields
        .value(Field::NextTriggers, triggers::as_triggers)
        .unwrap_or_default();

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FragilityColor, Trigger, ViewStatus};
    use crate::parser::NestedPayload;
    use chrono::NaiveDate;
    use serde_json::{Value, json};

    fn flat_delta() -> Value {
        json!({
            "asofDate": "2025-11-03",
            "fragilityColor": "YELLOW",
            "fragilityLabel": "Caution Warranted",
            "fragilityScore": 3,
            "phaseUsed": "Late Expansion",
            "breadth": 1,
            "liquidity": 1,
            "volatility": 1,
            "leadership": 0,
            "headlineSummary": "Internals are softening.",
            "templateCode": "T3",
            "templateName": "Narrowing Leadership",
            "keyDrivers": ["Breadth thinning", "Credit stable"],
            "nextWatchDisplay": { "signal": "VIX", "condition": "> 25", "meaning": "stress rising" }
        })
    }

    fn nested_delta() -> Value {
        json!({
            "level2": {
                "asof_date": "2025-11-05",
                "phase_used": "Late Cycle",
                "phase_confidence": "Moderate",
                "fragility_color": "ORANGE",
                "fragility_label": "Elevated Internal Risk",
                "fragility_score": 5,
                "dimension_commentary": {
                    "breadth_text": "Fewer stocks above their 50-day.",
                    "liquidity_text": ""
                },
                "rationale_bullets": ["Breadth deteriorated", "Volatility bid"],
                "plain_english_summary": "The rally is getting narrower.",
                "next_triggers_detail": [
                    { "condition": "CONDITION", "effect": "EFFECT" },
                    { "condition": "VIX>30", "effect": "defensive" }
                ]
            }
        })
    }

    #[test]
    fn flat_only_payload_is_taken_verbatim() {
        let raw = RawAnalysisPayload::default().with_flat(Domain::Delta, flat_delta());
        let view = normalize(&raw, Domain::Delta);

        assert_eq!(view.status, ViewStatus::Ready);
        assert_eq!(view.as_of_date, NaiveDate::from_ymd_opt(2025, 11, 3));
        assert_eq!(view.fragility.color, FragilityColor::Yellow);
        assert_eq!(view.fragility.label, "Caution Warranted");
        assert_eq!(view.fragility.score, Some(3));
        assert_eq!(view.phase.used, "Late Expansion");
        assert_eq!(view.narrative.headline, "Internals are softening.");
        assert!(view.narrative.rationale_bullets.is_empty());
        assert!(view.next_triggers.is_empty());
        let DomainDetail::Delta(detail) = &view.detail else {
            panic!("expected delta detail");
        };
        assert_eq!(detail.template_name, "Narrowing Leadership");
        assert_eq!(detail.key_drivers.len(), 2);
        assert_eq!(detail.next_watch, "VIX: > 25 — stress rising");
    }

    #[test]
    fn nested_level2_overrides_flat_fields() {
        let raw = RawAnalysisPayload::default()
            .with_flat(Domain::Delta, flat_delta())
            .with_nested(Domain::Delta, NestedPayload::Raw(nested_delta()));
        let view = normalize(&raw, Domain::Delta);

        assert_eq!(view.fragility.score, Some(5));
        assert_eq!(view.fragility.color, FragilityColor::Orange);
        assert_eq!(view.fragility.label, "Elevated Internal Risk");
        assert_eq!(view.as_of_date, NaiveDate::from_ymd_opt(2025, 11, 5));
        assert_eq!(view.phase.used, "Late Cycle");
        assert_eq!(view.phase.confidence.as_deref(), Some("Moderate"));
        assert_eq!(view.narrative.rationale_bullets.len(), 2);
        assert_eq!(view.narrative.plain_english_summary, "The rally is getting narrower.");
        assert_eq!(
            view.next_triggers,
            vec![Trigger {
                condition: "VIX>30".to_string(),
                effect: "defensive".to_string()
            }]
        );
        assert_eq!(
            view.dimension_commentary.get(&Dimension::Breadth).map(String::as_str),
            Some("Fewer stocks above their 50-day.")
        );
        assert!(!view.dimension_commentary.contains_key(&Dimension::Liquidity));
        // Layer-1 display fields stay flat-first.
        assert_eq!(view.narrative.headline, "Internals are softening.");
    }

    #[test]
    fn encoded_nested_document_is_decoded_transparently() {
        let raw = RawAnalysisPayload::default()
            .with_flat(Domain::Delta, flat_delta())
            .with_nested(
                Domain::Delta,
                NestedPayload::Encoded(nested_delta().to_string()),
            );
        assert_eq!(normalize(&raw, Domain::Delta).fragility.score, Some(5));
    }

    #[test]
    fn malformed_nested_text_yields_flat_baseline() {
        let baseline = normalize(
            &RawAnalysisPayload::default().with_flat(Domain::Delta, flat_delta()),
            Domain::Delta,
        );
        let mut truncated = nested_delta().to_string();
        truncated.truncate(truncated.len() / 2);
        let raw = RawAnalysisPayload::default()
            .with_flat(Domain::Delta, flat_delta())
            .with_nested(Domain::Delta, NestedPayload::Encoded(truncated));

        assert_eq!(normalize(&raw, Domain::Delta), baseline);
    }

    #[test]
    fn score_is_derived_from_dimensions() {
        let raw = RawAnalysisPayload::default().with_flat(
            Domain::Delta,
            json!({ "breadth": 2, "liquidity": 1, "volatility": 2, "leadership": 0 }),
        );
        let view = normalize(&raw, Domain::Delta);
        assert_eq!(view.fragility.score, Some(5));
        assert_eq!(view.dimension_scores.get(&Dimension::Volatility), Some(&2));
    }

    #[test]
    fn legacy_liquidity_credit_key_is_read() {
        let raw = RawAnalysisPayload::default().with_flat(
            Domain::Delta,
            json!({ "breadth": 0, "liquidityCredit": 2, "volatility": 0, "leadership": 0 }),
        );
        assert_eq!(normalize(&raw, Domain::Delta).fragility.score, Some(2));
    }

    #[test]
    fn missing_domain_is_flagged_no_data() {
        let raw = RawAnalysisPayload::default().with_flat(Domain::Delta, flat_delta());
        let view = normalize(&raw, Domain::Gamma);
        assert_eq!(view.status, ViewStatus::NoData);
        assert!(view.narrative.rationale_bullets.is_empty());
        assert!(matches!(view.detail, DomainDetail::Gamma(_)));
    }

    #[test]
    fn unrecognized_fragility_color_is_unknown() {
        let raw = RawAnalysisPayload::default()
            .with_flat(Domain::Delta, json!({ "fragilityColor": "purple" }));
        assert_eq!(
            normalize(&raw, Domain::Delta).fragility.color,
            FragilityColor::Unknown
        );
    }

    #[test]
    fn fusion_reads_fragility_from_delta_and_tone_from_gamma() {
        let raw = RawAnalysisPayload::default()
            .with_flat(Domain::Delta, flat_delta())
            .with_nested(Domain::Delta, NestedPayload::Raw(nested_delta()))
            .with_nested(
                Domain::Gamma,
                NestedPayload::Encoded(r#"{"level2":{"cycle_tone":"Late-cycle, defensive"}}"#.into()),
            )
            .with_flat(
                Domain::Fusion,
                json!({
                    "fragilityColor": "GREEN",
                    "fragilityLabel": "Stable",
                    "cycleStage": "MARKUP",
                    "cycleTone": "Constructive",
                    "guidanceLabel": "Stay selective"
                }),
            );
        let views = normalize_all(&raw);
        let fusion = &views.fusion;

        assert_eq!(fusion.fragility.color, FragilityColor::Orange);
        assert_eq!(fusion.fragility.label, "Elevated Internal Risk");
        assert_eq!(fusion.fragility.score, Some(5));
        assert_eq!(fusion.fragility, views.delta.fragility);
        assert_eq!(fusion.phase.used, "MARKUP");
        let DomainDetail::Fusion(detail) = &fusion.detail else {
            panic!("expected fusion detail");
        };
        assert_eq!(detail.cycle_tone, "Late-cycle, defensive");
        assert_eq!(detail.guidance_label, "Stay selective");
    }

    #[test]
    fn fusion_layer_documents_override_flat_fields() {
        let raw = RawAnalysisPayload::default()
            .with_flat(Domain::Fusion, json!({ "cycleStage": "ACCUMULATION", "headlineSummary": "Old" }))
            .with_nested(
                Domain::Fusion,
                NestedPayload::Raw(json!({
                    "layer1": { "cycle_stage": "DISTRIBUTION", "headline_summary": "New", "asof_date": "2025-11-05" },
                    "layer2": { "guidance_bullets": ["Trim beta"], "watch_commentary": "Watch credit." }
                })),
            );
        let view = normalize(&raw, Domain::Fusion);
        assert_eq!(view.narrative.headline, "New");
        assert_eq!(view.narrative.rationale_bullets, vec!["Trim beta".to_string()]);
        let DomainDetail::Fusion(detail) = &view.detail else {
            panic!("expected fusion detail");
        };
        assert_eq!(detail.cycle_stage, "DISTRIBUTION");
        assert_eq!(detail.watch_commentary, "Watch credit.");
        // No Delta document: fragility degrades to unknown.
        assert_eq!(view.fragility.color, FragilityColor::Unknown);
        assert_eq!(view.fragility.score, None);
    }

    #[test]
    fn gamma_view_collects_domains_and_details() {
        let raw = RawAnalysisPayload::default().with_flat(
            Domain::Gamma,
            json!({
                "asofWeek": "2025-11-03",
                "cycleStagePrimary": "Late Expansion",
                "cycleStageTransition": "Slowdown",
                "macroPostureLabel": "Caution",
                "headlineSummary": "Growth is cooling.",
                "overallSummary": "Macro signals mixed.",
                "domains": [
                    { "domain_name": "Breadth", "color_code": "🟡\u{FE0F}", "bias_label": "Neutral" }
                ],
                "domainDetails": {
                    "credit_liquidity": { "key_takeaway": "Spreads tight", "observations": "HY 300bp" }
                }
            }),
        );
        let view = normalize(&raw, Domain::Gamma);
        assert_eq!(view.as_of_date, NaiveDate::from_ymd_opt(2025, 11, 3));
        assert_eq!(view.phase.used, "Late Expansion");
        assert_eq!(view.narrative.plain_english_summary, "Macro signals mixed.");
        let DomainDetail::Gamma(detail) = &view.detail else {
            panic!("expected gamma detail");
        };
        assert_eq!(detail.cycle_stage_transition, "Slowdown");
        assert_eq!(detail.domains[0].color, FragilityColor::Yellow);
        assert_eq!(detail.domain_details[0].name, "Credit Liquidity");
        assert_eq!(detail.domain_details[0].summary, "Spreads tight");
    }

    #[test]
    fn gamma_accepts_camel_case_as_of_date() {
        let raw = RawAnalysisPayload::default()
            .with_flat(Domain::Gamma, json!({ "asOfDate": "2025-11-07" }));
        let view = normalize(&raw, Domain::Gamma);
        assert_eq!(view.as_of_date, NaiveDate::from_ymd_opt(2025, 11, 7));
    }

    #[test]
    fn empty_payload_yields_three_no_data_views() {
        let views = normalize_all(&RawAnalysisPayload::default());
        for domain in Domain::ALL {
            assert!(!views.view(domain).has_data());
        }
    }
}
