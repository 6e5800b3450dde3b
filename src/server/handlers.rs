use super::AppState;
use crate::model::{
    AnalysisView, Domain, FetchError, Newsletter, PortalViews, PriceError, SecularView,
};
use crate::normalizer::{normalize, normalize_all, normalize_secular};
use crate::prices::{clamp_days, fetch_prices};
use crate::render::{
    newsletter_to_text, render_delta_page, render_error_page, render_fusion_page,
    render_gamma_page, render_portal_page, render_pulse_page, text_filename,
};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

const DEFAULT_HISTORY_DAYS: u32 = 7;
const MAX_HISTORY_DAYS: u32 = 365;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown domain: {0}")]
    UnknownDomain(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error(transparent)]
    Upstream(#[from] FetchError),
    #[error(transparent)]
    Prices(#[from] PriceError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownDomain(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) | ApiError::Prices(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PulseQuery {
    pub date: Option<String>,
}

fn parse_iso_date(date: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| ApiError::InvalidDate(date.to_string()))
}

/// Latest payload and, under Fusion v2, the secular view, fetched concurrently.
/// A secular failure only degrades the Fusion section.
async fn load_views(
    state: &AppState,
    with_secular: bool,
) -> Result<(PortalViews, Option<SecularView>), FetchError> {
    let secular = async {
        if !with_secular || !state.config.uses_secular() {
            return None;
        }
        match state.analysis.secular().await {
            Ok(response) => normalize_secular(&response, &state.config.secular_api_url),
            Err(e) => {
                warn!("Secular analysis unavailable: {}", e);
                None
            }
        }
    };
    let (latest, secular) = tokio::join!(state.analysis.latest(), secular);
    let raw = latest?;
    Ok((normalize_all(&raw), secular))
}

fn page_failure(title: &str, active: &str, e: FetchError) -> Response {
    error!("Failed to load analysis for {}: {}", active, e);
    (StatusCode::BAD_GATEWAY, Html(render_error_page(title, active))).into_response()
}

pub async fn portal(State(state): State<AppState>) -> Response {
    match load_views(&state, true).await {
        Ok((views, secular)) => {
            Html(render_portal_page(&views, secular.as_ref(), &state.config)).into_response()
        }
        Err(e) => page_failure("Portal", "/", e),
    }
}

pub async fn gamma_page(State(state): State<AppState>) -> Response {
    match load_views(&state, false).await {
        Ok((views, _)) => {
            Html(render_gamma_page(&views.gamma, &state.config, views.updated_at)).into_response()
        }
        Err(e) => page_failure("Gamma", "/gamma", e),
    }
}

pub async fn delta_page(State(state): State<AppState>) -> Response {
    match load_views(&state, false).await {
        Ok((views, _)) => {
            Html(render_delta_page(&views.delta, &state.config, views.updated_at)).into_response()
        }
        Err(e) => page_failure("Delta", "/delta", e),
    }
}

pub async fn fusion_page(State(state): State<AppState>) -> Response {
    match load_views(&state, true).await {
        Ok((views, secular)) => Html(render_fusion_page(
            &views.fusion,
            secular.as_ref(),
            &state.config,
            views.updated_at,
        ))
        .into_response(),
        Err(e) => page_failure("Fusion", "/fusion", e),
    }
}

async fn load_newsletter(state: &AppState, date: Option<&str>) -> Result<Newsletter, ApiError> {
    match date {
        Some(date) => {
            parse_iso_date(date)?;
            Ok(state.pulse.newsletter_by_date(date).await?)
        }
        None => Ok(state.pulse.latest_newsletter().await?),
    }
}

/// Newsletter and archive are fetched together; a failed archive only hides the sidebar.
pub async fn daily_pulse(
    State(state): State<AppState>,
    Query(query): Query<PulseQuery>,
) -> Response {
    let (newsletter, archive) = futures::future::join(
        load_newsletter(&state, query.date.as_deref()),
        state.pulse.archive(state.config.archive_limit),
    )
    .await;

    let archive = archive
        .map_err(|e| warn!("Daily Pulse archive unavailable: {}", e))
        .ok();
    match newsletter {
        Ok(newsletter) => {
            Html(render_pulse_page(Ok(&newsletter), archive.as_deref())).into_response()
        }
        Err(e) => {
            warn!("Daily Pulse newsletter unavailable: {}", e);
            let message = e.to_string();
            (
                e.status(),
                Html(render_pulse_page(Err(message.as_str()), archive.as_deref())),
            )
                .into_response()
        }
    }
}

pub async fn pulse_text(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Response, ApiError> {
    parse_iso_date(&date)?;
    let newsletter = state.pulse.newsletter_by_date(&date).await?;
    let disposition = format!("attachment; filename=\"{}\"", text_filename(&date));
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        newsletter_to_text(&newsletter),
    )
        .into_response())
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

pub async fn client_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.config.client_config())
}

pub async fn api_views(State(state): State<AppState>) -> Result<Json<PortalViews>, ApiError> {
    let raw = state.analysis.latest().await?;
    Ok(Json(normalize_all(&raw)))
}

pub async fn api_view(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<AnalysisView>, ApiError> {
    let domain = Domain::from_key(&key).ok_or(ApiError::UnknownDomain(key))?;
    let raw = state.analysis.latest().await?;
    Ok(Json(normalize(&raw, domain)))
}

/// Delta views for the last N days.
pub async fn api_history(
    State(state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<Vec<AnalysisView>>, ApiError> {
    let days = query
        .days
        .unwrap_or(DEFAULT_HISTORY_DAYS)
        .clamp(1, MAX_HISTORY_DAYS);
    let payloads = state.analysis.history(days).await?;
    let views = payloads
        .iter()
        .map(|raw| normalize(raw, Domain::Delta))
        .collect();
    Ok(Json(views))
}

pub async fn api_spx_prices(
    State(state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> Result<Response, ApiError> {
    let script = &state.config.price_script;
    let days = clamp_days(query.days, script);
    let series = fetch_prices(script, days).await?;
    info!("Served {} SPX prices", series.prices.len());
    Ok(Json(series).into_response())
}
