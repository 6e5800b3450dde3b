use super::traits::{AnalysisSource, PulseSource};
use crate::config::AppConfig;
use crate::model::{ArchiveEntry, FetchError, Newsletter};
use crate::parser::{RawAnalysisPayload, parse_archive, parse_newsletter, unwrap_trpc};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("CycleScopePortal/", env!("CARGO_PKG_VERSION"));

/// HTTP client for every upstream the portal reads from.
pub struct ApiClient {
    client: Client,
    analysis_base: String,
    secular_base: String,
    pulse_base: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            analysis_base: trim_base(&config.analysis_api_url),
            secular_base: trim_base(&config.secular_api_url),
            pulse_base: trim_base(&config.daily_pulse_api_url),
        })
    }

    fn trpc_url(&self, procedure: &str) -> String {
        format!("{}/api/trpc/{}", self.analysis_base, procedure)
    }

    fn secular_url(&self) -> String {
        format!("{}/analysis/latest", self.secular_base)
    }

    fn pulse_url(&self, path: &str) -> String {
        format!("{}/newsletter/{}", self.pulse_base, path)
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream {} answered {}", url, status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    async fn get_trpc(&self, procedure: &str, input: Value) -> Result<Option<Value>, FetchError> {
        let url = self.trpc_url(procedure);
        let body = self
            .get_json(&url, &[("batch", "1".to_string()), ("input", input.to_string())])
            .await?;
        Ok(unwrap_trpc(&body).cloned())
    }
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn history_input(days: u32) -> Value {
    json!({ "0": { "json": { "days": days } } })
}

/// History data is a list of payloads; anything else counts as no history.
fn history_payloads(data: Option<Value>) -> Vec<RawAnalysisPayload> {
    match data {
        Some(Value::Array(items)) => items.iter().map(RawAnalysisPayload::from_value).collect(),
        Some(other) => {
            warn!("Unexpected history shape: {}", other);
            Vec::new()
        }
        None => Vec::new(),
    }
}

#[async_trait::async_trait]
impl AnalysisSource for ApiClient {
    async fn latest(&self) -> Result<RawAnalysisPayload, FetchError> {
        match self.get_trpc("analysis.latest", json!({})).await? {
            Some(data) => {
                let payload = RawAnalysisPayload::from_value(&data);
                info!("📥 Fetched latest analysis");
                Ok(payload)
            }
            None => {
                warn!("Analysis envelope carried no data");
                Ok(RawAnalysisPayload::default())
            }
        }
    }

    async fn history(&self, days: u32) -> Result<Vec<RawAnalysisPayload>, FetchError> {
        let data = self.get_trpc("analysis.history", history_input(days)).await?;
        let payloads = history_payloads(data);
        info!("📥 Fetched {} historical analyses ({} days)", payloads.len(), days);
        Ok(payloads)
    }

    async fn secular(&self) -> Result<Value, FetchError> {
        self.get_json(&self.secular_url(), &[]).await
    }
}

#[async_trait::async_trait]
impl PulseSource for ApiClient {
    async fn latest_newsletter(&self) -> Result<Newsletter, FetchError> {
        let body = self.get_json(&self.pulse_url("latest"), &[]).await?;
        parse_newsletter(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }

    async fn newsletter_by_date(&self, date: &str) -> Result<Newsletter, FetchError> {
        let body = self.get_json(&self.pulse_url(date), &[]).await?;
        parse_newsletter(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }

    async fn archive(&self, limit: u32) -> Result<Vec<ArchiveEntry>, FetchError> {
        let body = self
            .get_json(&self.pulse_url("history"), &[("limit", limit.to_string())])
            .await?;
        parse_archive(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Domain;

    fn client() -> ApiClient {
        let config = AppConfig {
            analysis_api_url: "https://analysis.example.com/".to_string(),
            secular_api_url: "https://secular.example.com".to_string(),
            daily_pulse_api_url: "https://pulse.example.com/api/".to_string(),
            ..AppConfig::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn builds_upstream_urls() {
        let client = client();
        assert_eq!(
            client.trpc_url("analysis.latest"),
            "https://analysis.example.com/api/trpc/analysis.latest"
        );
        assert_eq!(client.secular_url(), "https://secular.example.com/analysis/latest");
        assert_eq!(
            client.pulse_url("2025-11-05"),
            "https://pulse.example.com/api/newsletter/2025-11-05"
        );
    }

    #[test]
    fn history_input_matches_trpc_batch_shape() {
        assert_eq!(
            history_input(7).to_string(),
            r#"{"0":{"json":{"days":7}}}"#
        );
    }

    #[test]
    fn history_payloads_accept_lists_only() {
        let payloads = history_payloads(Some(json!([
            { "delta": { "fragilityScore": 3 } },
            { "delta": { "fragilityScore": 4 } }
        ])));
        assert_eq!(payloads.len(), 2);
        assert!(payloads[1].flat(Domain::Delta).is_some());
        assert!(history_payloads(Some(json!({ "delta": {} }))).is_empty());
        assert!(history_payloads(None).is_empty());
    }
}
