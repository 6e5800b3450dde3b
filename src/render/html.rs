// Shared HTML building blocks
use crate::model::{Domain, FragilityColor};
use crate::utils::{format_last_updated, or_na};
use chrono::{DateTime, Utc};
use std::fmt::Write;

pub const FETCH_FAILED_MESSAGE: &str = "Failed to load analysis data. Please refresh the page.";
pub const NO_DATA_MESSAGE: &str = "No analysis data available. Please try again later.";

/// Minimal HTML entity escaping for upstream text.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped text, `N/A` when empty.
pub fn text(s: &str) -> String {
    escape(or_na(s))
}

pub fn list_items(items: &[String]) -> String {
    let mut out = String::new();
    for item in items {
        let _ = write!(out, "<li>{}</li>", escape(item));
    }
    out
}

/// Score badge: 6+ red, 3+ yellow, otherwise green.
pub fn score_class(score: u8) -> &'static str {
    match score {
        6.. => "red",
        3.. => "yellow",
        _ => "green",
    }
}

/// Stress circle for one 0..=2 dimension score.
pub fn stress_class(score: u8) -> &'static str {
    match score {
        2 => "orange",
        1 => "yellow",
        _ => "green",
    }
}

pub fn gamma_posture_class(posture: &str) -> &'static str {
    let posture = posture.to_lowercase();
    if posture.contains("caution") {
        "orange"
    } else if posture.contains("defensive") {
        "red"
    } else if posture.contains("bullish") || posture.contains("aggressive") {
        "green"
    } else {
        "neutral"
    }
}

pub fn delta_posture_class(posture: &str) -> &'static str {
    let posture = posture.to_lowercase();
    if posture.contains("defensive") {
        "orange"
    } else if posture.contains("aggressive") {
        "green"
    } else {
        "neutral"
    }
}

pub fn status_badge(id: &str, color: FragilityColor, content: &str) -> String {
    format!(
        "<span id=\"{id}\" class=\"status-badge {}\">{content}</span>",
        color.css_class()
    )
}

pub fn last_updated(updated_at: Option<DateTime<Utc>>) -> String {
    let stamp = updated_at
        .map(format_last_updated)
        .unwrap_or_else(|| "Last Updated: Unknown".to_string());
    format!("<div id=\"lastUpdated\" class=\"last-updated\">{}</div>", escape(&stamp))
}

pub fn error_banner(message: &str) -> String {
    format!(
        "<div id=\"errorBanner\" class=\"error-banner\" role=\"alert\">{}</div>",
        escape(message)
    )
}

pub fn no_data_notice(domain: Domain) -> String {
    format!(
        "<p id=\"{}NoData\" class=\"no-data\">No {} data available.</p>",
        domain.key(),
        domain.title()
    )
}

/// Navigation entries: (path, label).
const NAV: [(&str, &str); 5] = [
    ("/", "Portal"),
    ("/gamma", "Gamma"),
    ("/delta", "Delta"),
    ("/fusion", "Fusion"),
    ("/daily-pulse", "Daily Pulse"),
];

/// Full document around `body`; `active` is the current nav path.
pub fn layout(title: &str, active: &str, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 1024);
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"en\">");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "  <meta charset=\"UTF-8\">");
    let _ = writeln!(
        out,
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    );
    let _ = writeln!(out, "  <title>CycleScope | {}</title>", escape(title));
    let _ = writeln!(out, "  <link rel=\"stylesheet\" href=\"/css/styles.css\">");
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "<nav class=\"nav\">");
    let _ = writeln!(out, "  <a class=\"nav-brand\" href=\"/\">CycleScope</a>");
    for (path, label) in NAV {
        let class = if path == active { "nav-link active" } else { "nav-link" };
        let _ = writeln!(out, "  <a class=\"{class}\" href=\"{path}\">{label}</a>");
    }
    let _ = writeln!(out, "</nav>");
    let _ = writeln!(out, "<main class=\"container\">");
    out.push_str(body);
    let _ = writeln!(out, "</main>");
    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");
    out
}

/// A titled card; `id` lands on the outer element.
pub fn card(id: &str, title: &str, content: &str) -> String {
    format!(
        "<section id=\"{id}\" class=\"card\">\n<h2 class=\"card-title\">{}</h2>\n<div class=\"card-content\">\n{content}</div>\n</section>\n",
        escape(title)
    )
}

/// `<div class="info-row">` with a label and a pre-rendered value.
pub fn info_row(label: &str, id: &str, value_html: &str) -> String {
    format!(
        "<div class=\"info-row\"><span class=\"info-label\">{}</span><span id=\"{id}\" class=\"info-value\">{value_html}</span></div>\n",
        escape(label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"AT&T"</b> 'x'"#),
            "&lt;b&gt;&quot;AT&amp;T&quot;&lt;/b&gt; &#39;x&#39;"
        );
        assert_eq!(text("  "), "N/A");
    }

    #[test]
    fn score_and_stress_colors() {
        assert_eq!(score_class(8), "red");
        assert_eq!(score_class(6), "red");
        assert_eq!(score_class(5), "yellow");
        assert_eq!(score_class(3), "yellow");
        assert_eq!(score_class(2), "green");
        assert_eq!(stress_class(2), "orange");
        assert_eq!(stress_class(1), "yellow");
        assert_eq!(stress_class(0), "green");
    }

    #[test]
    fn posture_colors() {
        assert_eq!(gamma_posture_class("Caution - Late Cycle"), "orange");
        assert_eq!(gamma_posture_class("Defensive"), "red");
        assert_eq!(gamma_posture_class("Moderately Bullish"), "green");
        assert_eq!(gamma_posture_class("Neutral"), "neutral");
        assert_eq!(delta_posture_class("Defensive Tilt"), "orange");
        assert_eq!(delta_posture_class("Aggressive"), "green");
    }

    #[test]
    fn layout_marks_active_link() {
        let page = layout("Delta", "/delta", "<p>x</p>");
        assert!(page.contains("<a class=\"nav-link active\" href=\"/delta\">Delta</a>"));
        assert!(page.contains("<a class=\"nav-link\" href=\"/gamma\">Gamma</a>"));
        assert!(page.contains("<p>x</p>"));
    }
}
