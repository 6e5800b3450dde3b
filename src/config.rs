use crate::model::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionVersion {
    /// Fusion page built from the analysis API.
    V1,
    /// Fusion page built from the secular assistant.
    #[default]
    V2,
}

impl FusionVersion {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "v1" => Some(Self::V1),
            "v2" => Some(Self::V2),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PriceScriptConfig {
    pub program: String,
    pub args: Vec<String>,
    pub default_days: u32,
    pub max_days: u32,
}

impl Default for PriceScriptConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["fetch_spx_data.py".to_string()],
            default_days: 30,
            max_days: 365,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub bind_address: String,
    pub static_dir: String,
    pub fusion_version: FusionVersion,
    pub analysis_api_url: String,
    pub secular_api_url: String,
    pub daily_pulse_api_url: String,
    pub enable_secular_charts: bool,
    pub request_timeout_seconds: u64,
    pub archive_limit: u32,
    pub price_script: PriceScriptConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            static_dir: "public".to_string(),
            fusion_version: FusionVersion::V2,
            analysis_api_url: "https://cyclescope-api-production.up.railway.app".to_string(),
            secular_api_url: "https://cyclescope-secular-production.up.railway.app".to_string(),
            daily_pulse_api_url: "https://cyclescope-daily-pulse-production.up.railway.app/api"
                .to_string(),
            enable_secular_charts: false,
            request_timeout_seconds: 10,
            archive_limit: 365,
            price_script: PriceScriptConfig::default(),
        }
    }
}

/// Client-side flags served at `/api/config`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientConfig {
    #[serde(rename = "FUSION_VERSION")]
    pub fusion_version: FusionVersion,
    #[serde(rename = "API_BASE_URL")]
    pub api_base_url: String,
    #[serde(rename = "ENABLE_SECULAR_CHARTS")]
    pub enable_secular_charts: bool,
}

impl AppConfig {
    /// Environment overrides on top of file values. `lookup` is
    /// `std::env::var(..).ok()` outside tests.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT={}", port)))?;
        }
        if let Some(version) = lookup("FUSION_VERSION") {
            self.fusion_version = FusionVersion::parse(&version)
                .ok_or_else(|| ConfigError::Invalid(format!("FUSION_VERSION={}", version)))?;
        }
        if let Some(url) = lookup("API_BASE_URL") {
            self.secular_api_url = url;
        }
        if let Some(url) = lookup("ANALYSIS_API_URL") {
            self.analysis_api_url = url;
        }
        if let Some(url) = lookup("DAILY_PULSE_API_URL") {
            self.daily_pulse_api_url = url;
        }
        if let Some(flag) = lookup("ENABLE_SECULAR_CHARTS") {
            // Only the literal "true" enables the flag.
            self.enable_secular_charts = flag.trim() == "true";
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            self.static_dir = dir;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, url) in [
            ("analysis_api_url", &self.analysis_api_url),
            ("secular_api_url", &self.secular_api_url),
            ("daily_pulse_api_url", &self.daily_pulse_api_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!("{} must be an http(s) URL: {}", key, url)));
            }
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("request_timeout_seconds must be positive".into()));
        }
        if self.price_script.program.trim().is_empty() {
            return Err(ConfigError::Invalid("price_script.program is empty".into()));
        }
        if self.price_script.max_days == 0 {
            return Err(ConfigError::Invalid("price_script.max_days must be positive".into()));
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("bind_address={}", self.bind_address)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            fusion_version: self.fusion_version,
            api_base_url: self.secular_api_url.clone(),
            enable_secular_charts: self.enable_secular_charts,
        }
    }

    /// Fusion v2 needs the secular assistant.
    pub fn uses_secular(&self) -> bool {
        self.fusion_version == FusionVersion::V2
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let mut config = read_config(Path::new(path))?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}
