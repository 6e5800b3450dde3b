// Core structs: AnalysisView, SecularView, Newsletter, SpxPrice and the error enums
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One of the three market-cycle analysis perspectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Gamma,
    Delta,
    Fusion,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Gamma, Domain::Delta, Domain::Fusion];

    /// Key used both in the upstream payload and in portal routes.
    pub fn key(self) -> &'static str {
        match self {
            Domain::Gamma => "gamma",
            Domain::Delta => "delta",
            Domain::Fusion => "fusion",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Domain::Gamma => "Gamma",
            Domain::Delta => "Delta",
            Domain::Fusion => "Fusion",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.key() == key)
    }

    /// Domains whose documents this domain reads through.
    pub fn peers(self) -> &'static [Domain] {
        match self {
            Domain::Fusion => &[Domain::Gamma, Domain::Delta],
            _ => &[],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FragilityColor {
    Green,
    Yellow,
    Orange,
    Red,
    #[default]
    Unknown,
}

impl FragilityColor {
    pub fn css_class(self) -> &'static str {
        match self {
            FragilityColor::Green => "green",
            FragilityColor::Yellow => "yellow",
            FragilityColor::Orange => "orange",
            FragilityColor::Red => "red",
            FragilityColor::Unknown => "neutral",
        }
    }
}

/// Delta stress dimensions, each scored 0..=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Breadth,
    Liquidity,
    Volatility,
    Leadership,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Breadth,
        Dimension::Liquidity,
        Dimension::Volatility,
        Dimension::Leadership,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Breadth => "Breadth",
            Dimension::Liquidity => "Liquidity",
            Dimension::Volatility => "Volatility",
            Dimension::Leadership => "Leadership",
        }
    }
}

pub const MAX_DIMENSION_SCORE: u8 = 2;
pub const MAX_FRAGILITY_SCORE: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewStatus {
    #[default]
    Ready,
    NoData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragility {
    pub color: FragilityColor,
    pub label: String,
    pub score: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub used: String,
    pub confidence: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub headline: String,
    pub rationale_bullets: Vec<String>,
    pub plain_english_summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trigger {
    pub condition: String,
    pub effect: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaDomainStatus {
    pub name: String,
    pub color: FragilityColor,
    pub bias_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaDomainDetail {
    pub name: String,
    pub summary: String,
    pub observations: String,
    pub interpretation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaDetail {
    pub cycle_stage_primary: String,
    pub cycle_stage_transition: String,
    pub macro_posture_label: String,
    pub cycle_tone: String,
    pub domains: Vec<GammaDomainStatus>,
    pub domain_details: Vec<GammaDomainDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaDetail {
    pub template_code: String,
    pub template_name: String,
    pub pattern_plain: String,
    pub posture_label: String,
    pub key_drivers: Vec<String>,
    pub next_watch: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FusionDetail {
    pub cycle_stage: String,
    pub guidance_label: String,
    pub cycle_tone: String,
    pub watch_commentary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DomainDetail {
    Gamma(GammaDetail),
    Delta(DeltaDetail),
    Fusion(FusionDetail),
}

impl DomainDetail {
    fn empty(domain: Domain) -> Self {
        match domain {
            Domain::Gamma => DomainDetail::Gamma(GammaDetail::default()),
            Domain::Delta => DomainDetail::Delta(DeltaDetail::default()),
            Domain::Fusion => DomainDetail::Fusion(FusionDetail::default()),
        }
    }
}

/// Render-ready record for one domain. Text fields are empty when unresolved,
/// lists are empty when absent upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisView {
    pub domain: Domain,
    pub status: ViewStatus,
    pub as_of_date: Option<NaiveDate>,
    pub fragility: Fragility,
    pub phase: Phase,
    pub dimension_scores: BTreeMap<Dimension, u8>,
    pub dimension_commentary: BTreeMap<Dimension, String>,
    pub narrative: Narrative,
    pub next_triggers: Vec<Trigger>,
    pub detail: DomainDetail,
}

impl AnalysisView {
    pub fn empty(domain: Domain) -> Self {
        Self {
            domain,
            status: ViewStatus::Ready,
            as_of_date: None,
            fragility: Fragility::default(),
            phase: Phase::default(),
            dimension_scores: BTreeMap::new(),
            dimension_commentary: BTreeMap::new(),
            narrative: Narrative::default(),
            next_triggers: Vec::new(),
            detail: DomainDetail::empty(domain),
        }
    }

    pub fn no_data(domain: Domain) -> Self {
        Self {
            status: ViewStatus::NoData,
            ..Self::empty(domain)
        }
    }

    pub fn has_data(&self) -> bool {
        self.status == ViewStatus::Ready
    }
}

/// The three views derived from one upstream payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalViews {
    pub gamma: AnalysisView,
    pub delta: AnalysisView,
    pub fusion: AnalysisView,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PortalViews {
    pub fn view(&self, domain: Domain) -> &AnalysisView {
        match domain {
            Domain::Gamma => &self.gamma,
            Domain::Delta => &self.delta,
            Domain::Fusion => &self.fusion,
        }
    }
}

// Secular assistant (Fusion v2)

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecularLayer1 {
    pub trend: String,
    pub phase: String,
    pub strength: String,
    pub momentum: String,
    pub support: String,
    pub resistance: String,
    pub outlook: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,
    /// Percent, 0..=100.
    pub probability: f64,
    pub trigger: String,
    pub price_target: String,
    pub expected_move: String,
    pub key_levels: String,
    pub catalysts: String,
    pub risks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecularLayer3 {
    pub primary_message: String,
    pub actionable_insight: String,
    pub risk_warning: String,
    pub key_level: String,
    pub time_horizon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecularMetadata {
    pub total_scenarios: u32,
    pub most_likely: String,
    pub recommendation: String,
    pub timestamp: String,
    pub chart_url: String,
    pub annotated_chart_url: String,
    pub as_of_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecularView {
    pub layer1: SecularLayer1,
    pub scenarios: Vec<Scenario>,
    pub layer3: SecularLayer3,
    pub metadata: SecularMetadata,
}

// Daily Pulse

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub heading: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Newsletter {
    #[serde(alias = "publish_date", default, deserialize_with = "null_as_default")]
    pub publish_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hook: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: Vec<NewsletterSection>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conclusion: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<NewsletterSource>,
    #[serde(alias = "audio_url", default)]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    #[serde(alias = "publish_date", default, deserialize_with = "null_as_default")]
    pub publish_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
}

// Price script output

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpxPrice {
    pub date: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    #[serde(default)]
    pub prices: Vec<SpxPrice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_verified: Option<bool>,
}

// Errors

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("failed to run price script: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("price script exited with {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },
    #[error("price script produced invalid JSON: {0}")]
    Output(#[from] serde_json::Error),
    #[error("price script reported: {0}")]
    Script(String),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server stopped: {0}")]
    Serve(std::io::Error),
}
