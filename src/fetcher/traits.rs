use crate::model::{ArchiveEntry, FetchError, Newsletter};
use crate::parser::RawAnalysisPayload;
use serde_json::Value;

/// Analysis API plus the secular assistant.
#[async_trait::async_trait]
pub trait AnalysisSource: Send + Sync {
    /// Latest payload; empty when the envelope carries no data.
    async fn latest(&self) -> Result<RawAnalysisPayload, FetchError>;
    async fn history(&self, days: u32) -> Result<Vec<RawAnalysisPayload>, FetchError>;
    /// Raw secular assistant response, normalized by the caller.
    async fn secular(&self) -> Result<Value, FetchError>;
}

/// Daily Pulse newsletter API.
#[async_trait::async_trait]
pub trait PulseSource: Send + Sync {
    async fn latest_newsletter(&self) -> Result<Newsletter, FetchError>;
    async fn newsletter_by_date(&self, date: &str) -> Result<Newsletter, FetchError>;
    async fn archive(&self, limit: u32) -> Result<Vec<ArchiveEntry>, FetchError>;
}
