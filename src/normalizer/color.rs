// Color-code normalization: emoji, enum tokens and CSS tokens onto FragilityColor
use crate::model::FragilityColor;
use serde_json::Value;
use tracing::debug;

const VARIATION_SELECTORS: [char; 2] = ['\u{FE0E}', '\u{FE0F}'];

/// Exact lookup table. No case folding beyond the listed spellings.
const COLOR_TABLE: &[(&str, FragilityColor)] = &[
    ("🟢", FragilityColor::Green),
    ("GREEN", FragilityColor::Green),
    ("green", FragilityColor::Green),
    ("🟡", FragilityColor::Yellow),
    ("YELLOW", FragilityColor::Yellow),
    ("yellow", FragilityColor::Yellow),
    ("🟠", FragilityColor::Orange),
    ("ORANGE", FragilityColor::Orange),
    ("orange", FragilityColor::Orange),
    ("🔴", FragilityColor::Red),
    ("RED", FragilityColor::Red),
    ("red", FragilityColor::Red),
    ("⚪", FragilityColor::Unknown),
    ("UNKNOWN", FragilityColor::Unknown),
    ("unknown", FragilityColor::Unknown),
];

pub fn normalize_color(code: &str) -> FragilityColor {
    let stripped: String = code
        .chars()
        .filter(|c| !VARIATION_SELECTORS.contains(c))
        .collect();
    let key = stripped.trim();

    match COLOR_TABLE.iter().find(|(token, _)| *token == key) {
        Some((_, color)) => *color,
        None => {
            if !key.is_empty() {
                debug!(code = key, "Unrecognized color code");
            }
            FragilityColor::Unknown
        }
    }
}

/// Extractor form: any string is a color (possibly `Unknown`), other types are not.
pub fn as_color(value: &Value) -> Option<FragilityColor> {
    value.as_str().map(normalize_color)
}
