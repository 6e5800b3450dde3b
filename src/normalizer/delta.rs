// Delta: internal fragility. Nested level2 overrides the flat summary for the
// fragility block, phase, dimensions and narrative; layer-1 display fields
// stay flat-first.
use super::extract::as_watch_text;
use super::resolver::{Field, FieldResolver, FieldRule, FieldTable, SourcePath::*};
use crate::model::{DeltaDetail, Dimension, Domain};

pub static DELTA_FIELDS: FieldTable = FieldTable {
    domain: Domain::Delta,
    rules: &[
        FieldRule {
            field: Field::AsOfDate,
            sources: &[
                Nested("level2.asof_date"),
                Nested("level1.asof_date"),
                Flat("asofDate"),
                Flat("asOfDate"),
            ],
        },
        FieldRule {
            field: Field::FragilityColor,
            sources: &[
                Nested("level2.fragility_color"),
                Nested("level1.fragility_color"),
                Flat("fragilityColor"),
            ],
        },
        FieldRule {
            field: Field::FragilityLabel,
            sources: &[
                Nested("level2.fragility_label"),
                Nested("level1.fragility_label"),
                Flat("fragilityLabel"),
            ],
        },
        FieldRule {
            field: Field::FragilityScore,
            sources: &[
                Nested("level2.fragility_score"),
                Nested("level1.fragility_score"),
                Flat("fragilityScore"),
            ],
        },
        FieldRule {
            field: Field::PhaseUsed,
            sources: &[Nested("level2.phase_used"), Flat("phaseUsed")],
        },
        FieldRule {
            field: Field::PhaseConfidence,
            sources: &[Nested("level2.phase_confidence"), Flat("phaseConfidence")],
        },
        FieldRule {
            field: Field::DimensionScore(Dimension::Breadth),
            sources: &[
                Nested("level2.dimension_scores.breadth"),
                Nested("level2.stress_scores.breadth"),
                Flat("breadth"),
            ],
        },
        FieldRule {
            field: Field::DimensionScore(Dimension::Liquidity),
            sources: &[
                Nested("level2.dimension_scores.liquidity"),
                Nested("level2.stress_scores.liquidity"),
                Flat("liquidity"),
                Flat("liquidityCredit"),
            ],
        },
        FieldRule {
            field: Field::DimensionScore(Dimension::Volatility),
            sources: &[
                Nested("level2.dimension_scores.volatility"),
                Nested("level2.stress_scores.volatility"),
                Flat("volatility"),
            ],
        },
        FieldRule {
            field: Field::DimensionScore(Dimension::Leadership),
            sources: &[
                Nested("level2.dimension_scores.leadership"),
                Nested("level2.stress_scores.leadership"),
                Flat("leadership"),
            ],
        },
        FieldRule {
            field: Field::DimensionCommentary(Dimension::Breadth),
            sources: &[Nested("level2.dimension_commentary.breadth_text"), Flat("breadthText")],
        },
        FieldRule {
            field: Field::DimensionCommentary(Dimension::Liquidity),
            sources: &[
                Nested("level2.dimension_commentary.liquidity_text"),
                Flat("liquidityText"),
            ],
        },
        FieldRule {
            field: Field::DimensionCommentary(Dimension::Volatility),
            sources: &[
                Nested("level2.dimension_commentary.volatility_text"),
                Flat("volatilityText"),
            ],
        },
        FieldRule {
            field: Field::DimensionCommentary(Dimension::Leadership),
            sources: &[
                Nested("level2.dimension_commentary.leadership_text"),
                Flat("leadershipText"),
            ],
        },
        FieldRule {
            field: Field::Headline,
            sources: &[Flat("headlineSummary"), Nested("level1.headline_summary")],
        },
        FieldRule {
            field: Field::RationaleBullets,
            sources: &[Nested("level2.rationale_bullets"), Flat("rationaleBullets")],
        },
        FieldRule {
            field: Field::PlainEnglishSummary,
            sources: &[
                Nested("level2.plain_english_summary"),
                Flat("plainEnglishSummary"),
            ],
        },
        FieldRule {
            field: Field::NextTriggers,
            sources: &[
                Nested("level2.next_triggers_detail"),
                Nested("level2.next_triggers"),
                Flat("nextTriggersDetail"),
            ],
        },
        FieldRule {
            field: Field::TemplateCode,
            sources: &[Flat("templateCode"), Nested("level1.template_code")],
        },
        FieldRule {
            field: Field::TemplateName,
            sources: &[Flat("templateName"), Nested("level1.template_name")],
        },
        FieldRule {
            field: Field::PatternPlain,
            sources: &[Flat("patternPlain"), Nested("level1.pattern_plain")],
        },
        FieldRule {
            field: Field::PostureLabel,
            sources: &[Flat("postureLabel"), Nested("level1.posture_label")],
        },
        FieldRule {
            field: Field::KeyDrivers,
            sources: &[Flat("keyDrivers"), Nested("level1.key_drivers")],
        },
        FieldRule {
            field: Field::NextWatch,
            sources: &[Flat("nextWatchDisplay"), Nested("level1.next_watch_display")],
        },
    ],
};

pub fn delta_detail(fields: &FieldResolver<'_>) -> DeltaDetail {
    DeltaDetail {
        template_code: fields.text(Field::TemplateCode),
        template_name: fields.text(Field::TemplateName),
        pattern_plain: fields.text(Field::PatternPlain),
        posture_label: fields.text(Field::PostureLabel),
        key_drivers: fields.list(Field::KeyDrivers),
        next_watch: fields.value(Field::NextWatch, as_watch_text).unwrap_or_default(),
    }
}
