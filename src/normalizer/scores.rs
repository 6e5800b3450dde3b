// Fragility score reconciliation against the four dimension scores
use super::resolver::{Origin, Resolved};
use crate::model::{Dimension, MAX_DIMENSION_SCORE};
use std::collections::BTreeMap;
use tracing::debug;

/// Sum of all four dimensions, or None when any dimension is unresolved.
/// The origin is `Nested` only if every dimension came from a nested document.
pub fn derived_score(dimensions: &BTreeMap<Dimension, Resolved<u8>>) -> Option<Resolved<u8>> {
    if Dimension::ALL.iter().any(|d| !dimensions.contains_key(d)) {
        return None;
    }
    let sum = dimensions.values().map(|r| r.value.min(MAX_DIMENSION_SCORE)).sum();
    let origin = if dimensions.values().all(|r| r.origin == Origin::Nested) {
        Origin::Nested
    } else {
        Origin::Flat
    };
    Some(Resolved { value: sum, origin })
}

/// Picks the final score. When a reported score and the dimension sum
/// disagree, the nested-derived one wins; on equal authority the sum wins.
pub fn reconcile_score(
    reported: Option<Resolved<u8>>,
    dimensions: &BTreeMap<Dimension, Resolved<u8>>,
) -> Option<u8> {
    match (reported, derived_score(dimensions)) {
        (None, None) => None,
        (Some(reported), None) => Some(reported.value),
        (None, Some(derived)) => Some(derived.value),
        (Some(reported), Some(derived)) if reported.value == derived.value => Some(derived.value),
        (Some(reported), Some(derived)) => {
            let winner = if reported.origin == Origin::Nested && derived.origin == Origin::Flat {
                reported.value
            } else {
                derived.value
            };
            debug!(
                reported = reported.value,
                derived = derived.value,
                winner,
                "Fragility score disagrees with dimension scores"
            );
            Some(winner)
        }
    }
}
