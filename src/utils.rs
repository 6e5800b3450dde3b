// Utility functions
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::America::New_York;

/// Parses an RFC 3339 timestamp into `DateTime<Utc>`.
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date_str.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(trimmed).map(|dt| dt.date_naive()))
}

/// "November 5, 2025"
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// "Nov 5, 2025"
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// "Last Updated: November 5, 2025 at 4:30 PM EST", always in New York time.
pub fn format_last_updated(updated_at: DateTime<Utc>) -> String {
    let local = updated_at.with_timezone(&New_York);
    format!(
        "Last Updated: {} at {}",
        local.format("%B %-d, %Y"),
        local.format("%-I:%M %p %Z")
    )
}

/// Display name for a Gamma domain key such as `credit_liquidity`.
pub fn format_domain_name(key: &str) -> String {
    match key {
        "breadth" => "Breadth".to_string(),
        "sentiment" => "Sentiment".to_string(),
        "leadership" => "Leadership".to_string(),
        "volatility" => "Volatility".to_string(),
        "macro_trend" => "Macro Trend".to_string(),
        "credit_liquidity" => "Credit Liquidity".to_string(),
        other => other
            .split('_')
            .filter(|word| !word.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_cycle_stage(stage: &str) -> String {
    match stage.trim() {
        "" => "N/A".to_string(),
        "ACCUMULATION" => "Accumulation".to_string(),
        "MARKUP" => "Markup".to_string(),
        "DISTRIBUTION" => "Distribution".to_string(),
        "MARKDOWN" => "Markdown".to_string(),
        other => other.to_string(),
    }
}

fn bullet_body(line: &str) -> Option<&str> {
    if line == "-" {
        return Some("");
    }
    line.strip_prefix('•').or_else(|| line.strip_prefix("- "))
}

/// Splits bullet text ("• a\n- b") into items. Returns nothing unless at
/// least one line carries a marker; unmarked lines are kept as items.
pub fn parse_bullets(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if !lines.iter().any(|line| bullet_body(line).is_some()) {
        return Vec::new();
    }
    lines
        .into_iter()
        .map(|line| bullet_body(line).unwrap_or(line).trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn or_na(text: &str) -> &str {
    if text.trim().is_empty() { "N/A" } else { text }
}
