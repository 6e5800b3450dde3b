// Page renderers. Element ids follow the portal's stylesheet and scripts.
use super::html::{
    FETCH_FAILED_MESSAGE, NO_DATA_MESSAGE, card, delta_posture_class, error_banner, escape,
    gamma_posture_class, info_row, last_updated, layout, list_items, no_data_notice, score_class,
    status_badge, stress_class, text,
};
use super::pulse::{audio_filename, display_date, group_archive_by_month, text_filename};
use crate::config::AppConfig;
use crate::model::{
    AnalysisView, ArchiveEntry, DeltaDetail, Dimension, Domain, DomainDetail, FusionDetail,
    GammaDetail, MAX_FRAGILITY_SCORE, Newsletter, PortalViews, SecularView,
};
use crate::utils::{
    format_cycle_stage, format_last_updated, format_long_date, format_short_date, parse_date,
    parse_datetime,
};
use chrono::{DateTime, Utc};
use std::fmt::Write;

fn as_of(view: &AnalysisView) -> String {
    view.as_of_date
        .map(format_long_date)
        .unwrap_or_else(|| "N/A".to_string())
}

fn bullet_list(id: &str, items: &[String]) -> String {
    if items.is_empty() {
        format!("<ul id=\"{id}\"><li>N/A</li></ul>\n")
    } else {
        format!("<ul id=\"{id}\">{}</ul>\n", list_items(items))
    }
}

fn paragraph(id: &str, value: &str) -> String {
    format!("<p id=\"{id}\">{}</p>\n", text(value))
}

// Gamma

fn gamma_detail(view: &AnalysisView) -> Option<&GammaDetail> {
    match &view.detail {
        DomainDetail::Gamma(detail) => Some(detail),
        _ => None,
    }
}

/// Badge id for one of the six Gamma domains.
fn gamma_domain_id(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().replace('_', " ").as_str() {
        "leadership" => Some("gammaLeadership"),
        "breadth" => Some("gammaBreadth"),
        "sentiment" => Some("gammaSentiment"),
        "volatility" => Some("gammaVolatility"),
        "credit liquidity" => Some("gammaCredit"),
        "macro trend" => Some("gammaMacro"),
        _ => None,
    }
}

fn gamma_stage(detail: &GammaDetail) -> String {
    let mut stage = detail.cycle_stage_primary.clone();
    if !detail.cycle_stage_transition.is_empty() {
        let _ = write!(stage, " → {}", detail.cycle_stage_transition);
    }
    stage
}

fn gamma_layer1(view: &AnalysisView, detail: &GammaDetail) -> String {
    let mut out = String::new();
    out.push_str(&info_row("Week of", "gammaWeekOf", &escape(&as_of(view))));
    out.push_str(&info_row("Cycle Stage", "gammaCycleStage", &text(&gamma_stage(detail))));
    out.push_str(&info_row(
        "Macro Posture",
        "gammaPosture",
        &format!(
            "<span class=\"posture {}\">{}</span>",
            gamma_posture_class(&detail.macro_posture_label),
            text(&detail.macro_posture_label)
        ),
    ));
    out.push_str(&paragraph("gammaHeadline", &view.narrative.headline));

    out.push_str("<table class=\"data-table\">\n<thead><tr><th>Domain</th><th>Bias</th></tr></thead>\n<tbody id=\"gammaDomainTable\">\n");
    for domain in &detail.domains {
        let id_attr = gamma_domain_id(&domain.name)
            .map(|id| format!(" id=\"{id}\""))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td><span{id_attr} class=\"status-badge {}\">{}</span></td></tr>",
            escape(&domain.name),
            domain.color.css_class(),
            escape(&domain.bias_label)
        );
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn gamma_layer2(view: &AnalysisView, detail: &GammaDetail) -> String {
    let mut out = String::new();
    out.push_str(&info_row("Week of", "gammaWeekLayer2", &escape(&as_of(view))));
    out.push_str(&info_row(
        "Cycle Stage",
        "gammaCycleStageLayer2",
        &text(&gamma_stage(detail)),
    ));
    out.push_str(&info_row(
        "Phase Confidence",
        "gammaPhaseConfidence",
        &text(view.phase.confidence.as_deref().unwrap_or_default()),
    ));
    out.push_str(&info_row("Cycle Tone", "gammaCycleTone", &text(&detail.cycle_tone)));
    out.push_str(&paragraph("gammaOverallSummary", &view.narrative.plain_english_summary));

    out.push_str("<div id=\"gammaDomainDetailsContainer\">\n");
    for domain in &detail.domain_details {
        let _ = writeln!(
            out,
            "<div class=\"domain-detail-section\"><h4>{}</h4>\
             <p><strong>Summary:</strong> {}</p>\
             <p><strong>Observations:</strong> {}</p>\
             <p><strong>Interpretation:</strong> {}</p></div>",
            escape(&domain.name),
            text(&domain.summary),
            text(&domain.observations),
            text(&domain.interpretation)
        );
    }
    out.push_str("</div>\n");
    out
}

// Delta

fn delta_detail(view: &AnalysisView) -> Option<&DeltaDetail> {
    match &view.detail {
        DomainDetail::Delta(detail) => Some(detail),
        _ => None,
    }
}

/// "Caution Warranted (3/8)"
fn fragility_text(view: &AnalysisView) -> String {
    let mut label = text(&view.fragility.label);
    if let Some(score) = view.fragility.score {
        let _ = write!(label, " ({}/{})", score, MAX_FRAGILITY_SCORE);
    }
    label
}

fn template_text(detail: &DeltaDetail) -> String {
    match (detail.template_code.is_empty(), detail.template_name.is_empty()) {
        (false, false) => format!("{} - {}", detail.template_code, detail.template_name),
        (true, _) => detail.template_name.clone(),
        (false, true) => detail.template_code.clone(),
    }
}

fn delta_layer1(view: &AnalysisView, detail: &DeltaDetail) -> String {
    let mut out = String::new();
    out.push_str(&info_row("As of", "deltaDate", &escape(&as_of(view))));
    out.push_str(&info_row(
        "Fragility",
        "deltaFragility",
        &status_badge("deltaFragilityBadge", view.fragility.color, &fragility_text(view)),
    ));
    let score_html = match view.fragility.score {
        Some(score) => format!(
            "<span class=\"status-badge {}\">{} / {}</span>",
            score_class(score),
            score,
            MAX_FRAGILITY_SCORE
        ),
        None => "N/A".to_string(),
    };
    out.push_str(&info_row("Fragility Score", "deltaFragilityScore", &score_html));
    out.push_str(&info_row("Template", "deltaTemplate", &text(&template_text(detail))));
    out.push_str(&info_row("Market Pattern", "deltaPattern", &text(&detail.pattern_plain)));
    out.push_str(&info_row(
        "Posture",
        "deltaPosture",
        &format!(
            "<span class=\"posture {}\">{}</span>",
            delta_posture_class(&detail.posture_label),
            text(&detail.posture_label)
        ),
    ));
    out.push_str(&paragraph("deltaHeadline", &view.narrative.headline));
    out.push_str("<div class=\"key-drivers\"><h3>Key Drivers</h3>\n");
    out.push_str(&bullet_list("deltaKeyDrivers", &detail.key_drivers));
    out.push_str("</div>\n<div class=\"next-watch\"><h3>Next to Watch</h3>\n");
    out.push_str(&paragraph("deltaNextWatch", &detail.next_watch));
    out.push_str("</div>\n");
    out
}

fn dimension_ids(dimension: Dimension) -> (&'static str, &'static str) {
    match dimension {
        Dimension::Breadth => ("deltaBreadthScore", "deltaBreadthText"),
        Dimension::Liquidity => ("deltaLiquidityScore", "deltaLiquidityText"),
        Dimension::Volatility => ("deltaVolatilityScore", "deltaVolatilityText"),
        Dimension::Leadership => ("deltaLeadershipScore", "deltaLeadershipText"),
    }
}

fn delta_layer2(view: &AnalysisView, detail: &DeltaDetail) -> String {
    let mut out = String::new();
    out.push_str(&info_row("Phase", "deltaPhaseUsed", &text(&view.phase.used)));
    out.push_str(&info_row("Template", "deltaTemplateName", &text(&template_text(detail))));

    out.push_str("<table class=\"data-table stress-table\">\n<thead><tr><th>Dimension</th><th>Stress</th><th>Commentary</th></tr></thead>\n<tbody>\n");
    for dimension in Dimension::ALL {
        let (score_id, text_id) = dimension_ids(dimension);
        let score = match view.dimension_scores.get(&dimension) {
            Some(&score) => format!(
                "<span class=\"stress-circle {}\">{}</span>",
                stress_class(score),
                score
            ),
            None => "N/A".to_string(),
        };
        let commentary = view
            .dimension_commentary
            .get(&dimension)
            .map(String::as_str)
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td id=\"{score_id}\">{score}</td><td id=\"{text_id}\">{}</td></tr>",
            dimension.label(),
            text(commentary)
        );
    }
    out.push_str("</tbody>\n</table>\n");

    out.push_str("<div class=\"rationale\"><h3>Rationale</h3>\n");
    out.push_str(&bullet_list("deltaRationale", &view.narrative.rationale_bullets));
    out.push_str("</div>\n<div class=\"plain-english\"><h3>Plain-English Summary</h3>\n");
    out.push_str(&paragraph("deltaPlainSummary", &view.narrative.plain_english_summary));
    out.push_str("</div>\n");

    out.push_str("<table class=\"data-table triggers-table\">\n<thead><tr><th>Condition</th><th>Effect</th></tr></thead>\n<tbody id=\"deltaNextTriggers\">\n");
    if view.next_triggers.is_empty() {
        out.push_str("<tr><td colspan=\"2\" class=\"empty\">No triggers available</td></tr>\n");
    }
    for trigger in &view.next_triggers {
        let _ = writeln!(
            out,
            "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
            escape(&trigger.condition),
            escape(&trigger.effect)
        );
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

// Fusion

fn fusion_detail(view: &AnalysisView) -> Option<&FusionDetail> {
    match &view.detail {
        DomainDetail::Fusion(detail) => Some(detail),
        _ => None,
    }
}

fn fusion_v1_layer1(view: &AnalysisView, detail: &FusionDetail) -> String {
    let mut out = String::new();
    out.push_str(&info_row("As of", "fusionDate", &escape(&as_of(view))));
    out.push_str(&info_row("Phase", "fusionPhase", &text(&detail.cycle_stage)));
    out.push_str(&info_row(
        "Fragility",
        "fusionFragility",
        &status_badge(
            "fusionFragilityBadge",
            view.fragility.color,
            &format!("<strong>Fragility:</strong> {}", text(&view.fragility.label)),
        ),
    ));
    out.push_str(&info_row("Guidance", "fusionGuidance", &text(&detail.guidance_label)));
    out.push_str(&paragraph("fusionHeadline", &view.narrative.headline));
    out
}

fn fusion_v1_layer2(view: &AnalysisView, detail: &FusionDetail) -> String {
    let mut out = String::new();
    out.push_str(&info_row(
        "Cycle Stage",
        "fusionCycleStage",
        &escape(&format_cycle_stage(&detail.cycle_stage)),
    ));
    out.push_str(&info_row("Cycle Tone", "fusionCycleTone", &text(&detail.cycle_tone)));
    out.push_str(&paragraph("fusionNarrative", &view.narrative.plain_english_summary));
    out.push_str("<h3>Guidance</h3>\n");
    out.push_str(&bullet_list("fusionGuidanceBullets", &view.narrative.rationale_bullets));
    out.push_str("<h3>What to Watch</h3>\n");
    out.push_str(&paragraph("fusionWatch", &detail.watch_commentary));
    out
}

fn fusion_v2_layer1(secular: &SecularView) -> String {
    let layer1 = &secular.layer1;
    let mut out = String::new();
    out.push_str(&info_row("Secular Trend", "fusionSecularTrend", &escape(&layer1.trend)));
    let _ = writeln!(
        out,
        "<div class=\"recent-behavior\"><h4>Recent Behavior</h4><p>{}</p><p>{}</p></div>",
        escape(&layer1.support),
        escape(&layer1.resistance)
    );
    out.push_str(&info_row("Risk Bias", "fusionRiskBias", &escape(&layer1.momentum)));
    out
}

fn secular_timestamp(raw: &str) -> String {
    match parse_datetime(raw) {
        Some(ts) => escape(&format_last_updated(ts)),
        None => escape(raw),
    }
}

fn fusion_v2_layer2(secular: &SecularView, charts_enabled: bool) -> String {
    let mut out = String::new();
    if charts_enabled {
        let _ = writeln!(
            out,
            "<div id=\"fusionChart\" class=\"secular-chart\"><h4>S&amp;P 500 Monthly Chart</h4>\
             <img src=\"{}\" data-fallback=\"{}\" alt=\"S&amp;P 500 Annotated Chart\">\
             <p class=\"chart-updated\">{}</p></div>",
            escape(&secular.metadata.annotated_chart_url),
            escape(&secular.metadata.chart_url),
            secular_timestamp(&secular.metadata.timestamp)
        );
    }

    out.push_str("<div id=\"fusionScenarios\"><h3>Scenarios</h3>\n");
    for scenario in &secular.scenarios {
        let _ = writeln!(
            out,
            "<div class=\"scenario\"><div class=\"scenario-header\"><h4>{}</h4>\
             <span class=\"probability\">{:.1}%</span></div>\
             <p><strong>Path Summary:</strong> {} {}</p>\
             <p><strong>Target Zone:</strong> {} ({})</p>\
             <p><strong>Risk Profile:</strong> {}</p></div>",
            escape(&scenario.name),
            scenario.probability,
            escape(&scenario.trigger),
            escape(&scenario.catalysts),
            escape(&scenario.price_target),
            escape(&scenario.expected_move),
            escape(&scenario.risks)
        );
    }
    out.push_str("</div>\n");

    let _ = writeln!(
        out,
        "<div class=\"secular-summary\"><h4>Secular Summary</h4><p id=\"fusionSecularSummary\">{} {}</p></div>",
        escape(&secular.layer3.risk_warning),
        escape(&secular.layer3.actionable_insight)
    );
    out
}

/// Fusion layers: the secular view under v2 when available, the analysis
/// view otherwise. None when neither has data.
fn fusion_layers(
    view: &AnalysisView,
    secular: Option<&SecularView>,
    config: &AppConfig,
) -> Option<(String, String)> {
    if config.uses_secular() {
        if let Some(secular) = secular {
            return Some((
                fusion_v2_layer1(secular),
                fusion_v2_layer2(secular, config.enable_secular_charts),
            ));
        }
    }
    if !view.has_data() {
        return None;
    }
    let fallback = FusionDetail::default();
    let detail = fusion_detail(view).unwrap_or(&fallback);
    Some((fusion_v1_layer1(view, detail), fusion_v1_layer2(view, detail)))
}

// Pages

fn domain_layers(
    view: &AnalysisView,
    secular: Option<&SecularView>,
    config: &AppConfig,
) -> Option<(String, String)> {
    match view.domain {
        Domain::Fusion => fusion_layers(view, secular, config),
        _ if !view.has_data() => None,
        Domain::Gamma => {
            let fallback = GammaDetail::default();
            let detail = gamma_detail(view).unwrap_or(&fallback);
            Some((gamma_layer1(view, detail), gamma_layer2(view, detail)))
        }
        Domain::Delta => {
            let fallback = DeltaDetail::default();
            let detail = delta_detail(view).unwrap_or(&fallback);
            Some((delta_layer1(view, detail), delta_layer2(view, detail)))
        }
    }
}

fn layer_ids(domain: Domain) -> (&'static str, &'static str) {
    match domain {
        Domain::Fusion => ("fusionLayer1", "fusionLayer2"),
        Domain::Gamma => ("gammaLayer1", "gammaLayer2"),
        Domain::Delta => ("layer1", "layer2"),
    }
}

/// Overview with one summary card per domain.
pub fn render_portal_page(
    views: &PortalViews,
    secular: Option<&SecularView>,
    config: &AppConfig,
) -> String {
    let mut body = String::new();
    let any_data = Domain::ALL.iter().any(|d| views.view(*d).has_data()) || secular.is_some();
    if !any_data {
        body.push_str(&error_banner(NO_DATA_MESSAGE));
    }
    body.push_str(&last_updated(views.updated_at));

    for domain in [Domain::Fusion, Domain::Gamma, Domain::Delta] {
        let view = views.view(domain);
        let content = match domain_layers(view, secular, config) {
            Some((layer1, _)) => format!(
                "{layer1}<a class=\"details-link\" href=\"/{}\">View {} details</a>\n",
                domain.key(),
                domain.title()
            ),
            None => no_data_notice(domain),
        };
        body.push_str(&card(&format!("{}Section", domain.key()), domain.title(), &content));
    }
    layout("Portal", "/", &body)
}

fn render_domain_page(
    view: &AnalysisView,
    secular: Option<&SecularView>,
    config: &AppConfig,
    updated_at: Option<DateTime<Utc>>,
) -> String {
    let domain = view.domain;
    let mut body = last_updated(updated_at);
    match domain_layers(view, secular, config) {
        Some((layer1, layer2)) => {
            let (id1, id2) = layer_ids(domain);
            body.push_str(&card(id1, "Layer 1: Summary", &layer1));
            body.push_str(&card(id2, "Layer 2: Detailed Analysis", &layer2));
        }
        None => {
            body.push_str(&error_banner(NO_DATA_MESSAGE));
            body.push_str(&no_data_notice(domain));
        }
    }
    layout(domain.title(), &format!("/{}", domain.key()), &body)
}

pub fn render_gamma_page(view: &AnalysisView, config: &AppConfig, updated_at: Option<DateTime<Utc>>) -> String {
    render_domain_page(view, None, config, updated_at)
}

pub fn render_delta_page(view: &AnalysisView, config: &AppConfig, updated_at: Option<DateTime<Utc>>) -> String {
    render_domain_page(view, None, config, updated_at)
}

pub fn render_fusion_page(
    view: &AnalysisView,
    secular: Option<&SecularView>,
    config: &AppConfig,
    updated_at: Option<DateTime<Utc>>,
) -> String {
    render_domain_page(view, secular, config, updated_at)
}

/// Page shown when the upstream fetch failed outright.
pub fn render_error_page(title: &str, active: &str) -> String {
    layout(title, active, &error_banner(FETCH_FAILED_MESSAGE))
}

fn newsletter_html(newsletter: &Newsletter) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<div id=\"newsletterContent\">\n<div class=\"pulse-header\">\
         <p id=\"pulseDate\">{}</p><h1 id=\"pulseTitle\">{}</h1><p id=\"pulseHook\">{}</p></div>",
        escape(&display_date(&newsletter.publish_date)),
        escape(&newsletter.title),
        escape(&newsletter.hook)
    );

    let date = escape(&newsletter.publish_date);
    out.push_str("<div class=\"pulse-downloads\">");
    if let Some(audio) = newsletter.audio_url.as_deref().filter(|u| !u.trim().is_empty()) {
        let _ = write!(
            out,
            "<audio id=\"pulseAudio\" controls src=\"{0}\"></audio>\
             <a id=\"downloadWav\" href=\"{0}\" download=\"{1}\">Download Audio</a>",
            escape(audio),
            escape(&audio_filename(&newsletter.publish_date))
        );
    }
    let _ = writeln!(
        out,
        "<a id=\"downloadText\" href=\"/daily-pulse/{date}/text\" download=\"{}\">Download Text</a></div>",
        escape(&text_filename(&newsletter.publish_date))
    );

    out.push_str("<div id=\"newsletterSections\">\n");
    for section in &newsletter.sections {
        let _ = writeln!(
            out,
            "<div class=\"newsletter-section\"><h3>{}</h3><p>{}</p></div>",
            escape(&section.heading),
            escape(&section.content)
        );
    }
    out.push_str("</div>\n");
    let _ = writeln!(
        out,
        "<div class=\"conclusion\"><h3>Looking Ahead</h3><p id=\"conclusionText\">{}</p></div>",
        escape(&newsletter.conclusion)
    );

    if !newsletter.sources.is_empty() {
        out.push_str("<div id=\"sourcesSection\"><h3>Sources</h3><div id=\"sourcesList\">\n");
        for (i, source) in newsletter.sources.iter().enumerate() {
            let title = if source.title.trim().is_empty() {
                "Source"
            } else {
                source.title.as_str()
            };
            let _ = writeln!(
                out,
                "<a class=\"source-item\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">\
                 <span class=\"source-number\">{}</span><span class=\"source-title\">{}</span></a>",
                escape(&source.url),
                i + 1,
                escape(title)
            );
        }
        out.push_str("</div></div>\n");
    }
    out.push_str("</div>\n");
    out
}

fn archive_html(archive: Option<&[ArchiveEntry]>) -> String {
    let mut out = String::from("<section class=\"archive\"><h2>Archive</h2><div id=\"archiveList\">\n");
    match archive {
        None => out.push_str("<p class=\"error-text\">Failed to load archive</p>\n"),
        Some([]) => {
            out.push_str("<p class=\"archive-empty\">No historical newsletters available yet</p>\n")
        }
        Some(entries) => {
            for group in group_archive_by_month(entries) {
                let _ = writeln!(
                    out,
                    "<div class=\"archive-month\"><h3>{}</h3>",
                    escape(&group.label)
                );
                for entry in &group.entries {
                    let date = parse_date(&entry.publish_date)
                        .map(format_short_date)
                        .unwrap_or_else(|| entry.publish_date.clone());
                    let _ = writeln!(
                        out,
                        "<div class=\"archive-item\"><div class=\"archive-date\">{}</div>\
                         <div class=\"archive-title\">{}</div>\
                         <a class=\"archive-view-btn\" href=\"/daily-pulse?date={}\">View</a></div>",
                        escape(&date),
                        escape(&entry.title),
                        escape(&entry.publish_date)
                    );
                }
                out.push_str("</div>\n");
            }
        }
    }
    out.push_str("</div></section>\n");
    out
}

/// Daily Pulse page. `newsletter` carries the error message on failure;
/// `archive` is None when the archive could not be loaded.
pub fn render_pulse_page(
    newsletter: Result<&Newsletter, &str>,
    archive: Option<&[ArchiveEntry]>,
) -> String {
    let mut body = String::new();
    match newsletter {
        Ok(newsletter) => body.push_str(&newsletter_html(newsletter)),
        Err(message) => {
            let _ = writeln!(
                body,
                "<div id=\"errorState\" class=\"error-state\"><p id=\"errorMessage\">{}</p></div>",
                escape(message)
            );
        }
    }
    body.push_str(&archive_html(archive));
    layout("Daily Pulse", "/daily-pulse", &body)
}
