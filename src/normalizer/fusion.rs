// Fusion: read-through synthesis. Cycle tone comes from Gamma's level2 and
// the fragility block from Delta's level2 before Fusion's own fields.
use super::resolver::{Field, FieldResolver, FieldRule, FieldTable, SourcePath::*};
use crate::model::{Domain, FusionDetail};

pub static FUSION_FIELDS: FieldTable = FieldTable {
    domain: Domain::Fusion,
    rules: &[
        FieldRule {
            field: Field::AsOfDate,
            sources: &[
                Nested("level1.asof_date"),
                Nested("layer1.asof_date"),
                Flat("asofDate"),
                Flat("asOfDate"),
            ],
        },
        FieldRule {
            field: Field::FragilityColor,
            sources: &[
                PeerNested(Domain::Delta, "level2.fragility_color"),
                Nested("level1.fragility_color"),
                Nested("layer1.fragility_color"),
                Flat("fragilityColor"),
                PeerFlat(Domain::Delta, "fragilityColor"),
            ],
        },
        FieldRule {
            field: Field::FragilityLabel,
            sources: &[
                PeerNested(Domain::Delta, "level2.fragility_label"),
                Nested("level1.fragility_label"),
                Nested("layer1.fragility_label"),
                Flat("fragilityLabel"),
                PeerFlat(Domain::Delta, "fragilityLabel"),
            ],
        },
        FieldRule {
            field: Field::FragilityScore,
            sources: &[
                PeerNested(Domain::Delta, "level2.fragility_score"),
                Nested("level1.fragility_score"),
                Flat("fragilityScore"),
                PeerFlat(Domain::Delta, "fragilityScore"),
            ],
        },
        FieldRule {
            field: Field::PhaseUsed,
            sources: &[
                Nested("level1.cycle_stage"),
                Nested("layer1.cycle_stage"),
                Flat("cycleStage"),
                PeerNested(Domain::Delta, "level2.phase_used"),
                PeerFlat(Domain::Delta, "phaseUsed"),
            ],
        },
        FieldRule {
            field: Field::CycleStage,
            sources: &[
                Nested("level1.cycle_stage"),
                Nested("layer1.cycle_stage"),
                Flat("cycleStage"),
            ],
        },
        FieldRule {
            field: Field::GuidanceLabel,
            sources: &[
                Nested("level1.guidance_label"),
                Nested("layer1.guidance_label"),
                Flat("guidanceLabel"),
                Flat("guidance"),
            ],
        },
        FieldRule {
            field: Field::Headline,
            sources: &[
                Nested("level1.headline_summary"),
                Nested("layer1.headline_summary"),
                Flat("headlineSummary"),
            ],
        },
        FieldRule {
            field: Field::CycleTone,
            sources: &[
                PeerNested(Domain::Gamma, "level2.cycle_tone"),
                Nested("level2.cycle_tone"),
                Nested("layer2.cycle_tone"),
                Flat("cycleTone"),
            ],
        },
        FieldRule {
            field: Field::PlainEnglishSummary,
            sources: &[
                Nested("level2.narrative_summary"),
                Nested("layer2.narrative_summary"),
                Flat("narrativeSummary"),
                Flat("summary"),
            ],
        },
        FieldRule {
            field: Field::RationaleBullets,
            sources: &[
                Nested("level2.guidance_bullets"),
                Nested("layer2.guidance_bullets"),
                Flat("guidanceBullets"),
                Flat("guidancePoints"),
            ],
        },
        FieldRule {
            field: Field::WatchCommentary,
            sources: &[
                Nested("level2.watch_commentary"),
                Nested("layer2.watch_commentary"),
                Flat("watchCommentary"),
                Flat("close"),
            ],
        },
    ],
};

pub fn fusion_detail(fields: &FieldResolver<'_>) -> FusionDetail {
    FusionDetail {
        cycle_stage: fields.text(Field::CycleStage),
        guidance_label: fields.text(Field::GuidanceLabel),
        cycle_tone: fields.text(Field::CycleTone),
        watch_commentary: fields.text(Field::WatchCommentary),
    }
}
