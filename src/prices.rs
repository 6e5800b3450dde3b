// SPX price history via the external price script
use crate::config::PriceScriptConfig;
use crate::model::{PriceError, PriceSeries};
use serde_json::Value;
use tokio::process::Command;
use tracing::{info, warn};

/// Requested days clamped to `1..=max_days`; None means the configured default.
pub fn clamp_days(requested: Option<u32>, script: &PriceScriptConfig) -> u32 {
    let max = script.max_days.max(1);
    requested
        .unwrap_or(script.default_days)
        .clamp(1, max)
}

/// Runs the script with `days` as its last argument and parses its stdout.
pub async fn fetch_prices(script: &PriceScriptConfig, days: u32) -> Result<PriceSeries, PriceError> {
    let output = Command::new(&script.program)
        .args(&script.args)
        .arg(days.to_string())
        .kill_on_drop(true)
        .output()
        .await?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !output.status.success() {
        warn!("Price script failed: {:?} {}", output.status.code(), stderr);
        return Err(PriceError::ExitStatus {
            code: output.status.code(),
            stderr,
        });
    }
    if !stderr.is_empty() {
        info!("Price script: {}", stderr);
    }

    let series = parse_price_output(&output.stdout)?;
    info!("📈 Loaded {} SPX prices ({} days requested)", series.prices.len(), days);
    Ok(series)
}

pub fn parse_price_output(stdout: &[u8]) -> Result<PriceSeries, PriceError> {
    let value: Value = serde_json::from_slice(stdout)?;
    if let Some(message) = value.get("error").filter(|e| !e.is_null()) {
        let message = message
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| message.to_string());
        return Err(PriceError::Script(message));
    }
    Ok(serde_json::from_value(value)?)
}
