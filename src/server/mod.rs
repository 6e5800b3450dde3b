// HTTP surface: portal pages, JSON API and static assets.

pub mod handlers;
pub mod static_files;

use crate::config::AppConfig;
use crate::fetcher::{AnalysisSource, PulseSource};
use crate::model::ServerError;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub analysis: Arc<dyn AnalysisSource>,
    pub pulse: Arc<dyn PulseSource>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::portal))
        .route("/gamma", get(handlers::gamma_page))
        .route("/delta", get(handlers::delta_page))
        .route("/fusion", get(handlers::fusion_page))
        .route("/daily-pulse", get(handlers::daily_pulse))
        .route("/daily-pulse/:date/text", get(handlers::pulse_text))
        .route("/health", get(handlers::health))
        .route("/api/config", get(handlers::client_config))
        .route("/api/views", get(handlers::api_views))
        .route("/api/views/:domain", get(handlers::api_view))
        .route("/api/history", get(handlers::api_history))
        .route("/api/spx-prices", get(handlers::api_spx_prices))
        .fallback(static_files::serve_static)
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl+C.
pub async fn serve(state: AppState) -> Result<(), ServerError> {
    let addr = format!("{}:{}", state.config.bind_address, state.config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!("🚀 CycleScope portal listening on http://{}", addr);
    info!(
        "Fusion {} | static files from {}",
        state.config.fusion_version.as_str(),
        state.config.static_dir
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FusionVersion;
    use crate::model::{ArchiveEntry, FetchError, Newsletter};
    use crate::parser::RawAnalysisPayload;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct StubAnalysis {
        fail: bool,
    }

    fn upstream_down() -> FetchError {
        FetchError::Status {
            status: 503,
            url: "http://upstream/api/trpc/analysis.latest".to_string(),
        }
    }

    fn stub_payload() -> RawAnalysisPayload {
        RawAnalysisPayload::from_value(&json!({
            "updatedAt": "2025-11-05T21:30:00Z",
            "delta": {
                "asofDate": "2025-11-05",
                "fragilityColor": "YELLOW",
                "fragilityLabel": "Caution Warranted",
                "fragilityScore": 3,
                "headlineSummary": "Internals are softening."
            },
            "gamma": {
                "asofDate": "2025-11-05",
                "cycleStagePrimary": "Late Expansion",
                "headlineSummary": "Cycle is maturing."
            }
        }))
    }

    #[async_trait::async_trait]
    impl AnalysisSource for StubAnalysis {
        async fn latest(&self) -> Result<RawAnalysisPayload, FetchError> {
            if self.fail {
                return Err(upstream_down());
            }
            Ok(stub_payload())
        }

        async fn history(&self, days: u32) -> Result<Vec<RawAnalysisPayload>, FetchError> {
            Ok((0..days.min(5)).map(|_| stub_payload()).collect())
        }

        async fn secular(&self) -> Result<Value, FetchError> {
            Err(upstream_down())
        }
    }

    struct StubPulse;

    #[async_trait::async_trait]
    impl PulseSource for StubPulse {
        async fn latest_newsletter(&self) -> Result<Newsletter, FetchError> {
            self.newsletter_by_date("2025-11-05").await
        }

        async fn newsletter_by_date(&self, date: &str) -> Result<Newsletter, FetchError> {
            Ok(Newsletter {
                publish_date: date.to_string(),
                title: "Risk Wobbles".to_string(),
                hook: "Tech led the dip.".to_string(),
                conclusion: "Watch CPI.".to_string(),
                ..Newsletter::default()
            })
        }

        async fn archive(&self, _limit: u32) -> Result<Vec<ArchiveEntry>, FetchError> {
            Ok(vec![ArchiveEntry {
                publish_date: "2025-11-04".to_string(),
                title: "Quiet Tuesday".to_string(),
            }])
        }
    }

    fn app_with(fail: bool, config: AppConfig) -> Router {
        router(AppState {
            config: Arc::new(config),
            analysis: Arc::new(StubAnalysis { fail }),
            pulse: Arc::new(StubPulse),
        })
    }

    fn app(fail: bool) -> Router {
        app_with(fail, AppConfig::default())
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let (status, body) = get_body(app(false), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "healthy");
        assert!(value["timestamp"].is_string());
    }

    #[tokio::test]
    async fn client_config_exposes_flags() {
        let config = AppConfig {
            fusion_version: FusionVersion::V1,
            ..AppConfig::default()
        };
        let (status, body) = get_body(app_with(false, config), "/api/config").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["FUSION_VERSION"], "v1");
        assert_eq!(value["ENABLE_SECULAR_CHARTS"], false);
        assert!(value["API_BASE_URL"].is_string());
    }

    #[tokio::test]
    async fn single_view_by_domain_key() {
        let (status, body) = get_body(app(false), "/api/views/delta").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["fragility"]["label"], "Caution Warranted");

        let (status, body) = get_body(app(false), "/api/views/omega").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("unknown domain"));
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway() {
        let (status, body) = get_body(app(true), "/api/views").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("error"));

        let (status, body) = get_body(app(true), "/").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("Failed to load analysis data. Please refresh the page."));
    }

    #[tokio::test]
    async fn delta_page_renders_normalized_view() {
        let (status, body) = get_body(app(false), "/delta").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Caution Warranted"));
        assert!(body.contains("Internals are softening."));
    }

    #[tokio::test]
    async fn portal_survives_missing_secular_view() {
        let (status, body) = get_body(app(false), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("deltaSection"));
    }

    #[tokio::test]
    async fn history_returns_delta_views() {
        let (status, body) = get_body(app(false), "/api/history?days=3").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn pulse_text_export() {
        let resp = app(false)
            .oneshot(
                Request::builder()
                    .uri("/daily-pulse/2025-11-05/text")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert_eq!(disposition, "attachment; filename=\"daily-pulse-2025-11-05.txt\"");
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).starts_with("DAILY MARKET PULSE"));

        let (status, _) = get_body(app(false), "/daily-pulse/yesterday/text").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn daily_pulse_page_lists_archive() {
        let (status, body) = get_body(app(false), "/daily-pulse").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Risk Wobbles"));
        assert!(body.contains("Quiet Tuesday"));

        let (status, _) = get_body(app(false), "/daily-pulse?date=11-05-2025").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn static_files_stay_inside_root() {
        let config = AppConfig {
            static_dir: "src".to_string(),
            ..AppConfig::default()
        };
        let (status, body) = get_body(app_with(false, config.clone()), "/main.rs").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("fn main"));

        let (status, _) = get_body(app_with(false, config.clone()), "/../Cargo.toml").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_body(app_with(false, config), "/missing.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
