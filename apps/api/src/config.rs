use std::time::Duration;

use anyhow::{Context, Result};

use crate::ai_client::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::overlay::geometry::{
    PlacementConfig, DEFAULT_MIN_SIZE_UNITS, DEFAULT_OVERLAY_SIZE_UNITS, DEFAULT_PX_PER_UNIT,
};

/// Request body cap for the AI routes; a base64 phone photo runs well past
/// axum's 2 MB default.
pub const DEFAULT_AI_BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;
/// Overlay boards untouched this long are discarded.
pub const DEFAULT_BOARD_IDLE_TTL_SECS: u64 = 60 * 60;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub ai_api_key: String,
    pub ai_api_url: String,
    pub ai_model: String,
    pub ai_body_limit_bytes: usize,
    pub placement: PlacementConfig,
    pub board_idle_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so parsing is testable without
    /// touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let placement = PlacementConfig {
            px_per_unit: parse_or(&lookup, "PX_PER_UNIT", DEFAULT_PX_PER_UNIT)?,
            min_size_units: parse_or(&lookup, "MIN_OVERLAY_UNITS", DEFAULT_MIN_SIZE_UNITS)?,
            default_size_units: parse_or(
                &lookup,
                "DEFAULT_OVERLAY_UNITS",
                DEFAULT_OVERLAY_SIZE_UNITS,
            )?,
        };
        placement
            .validate()
            .context("Invalid overlay placement settings")?;

        let idle_secs: u64 = parse_or(&lookup, "BOARD_IDLE_TTL_SECS", DEFAULT_BOARD_IDLE_TTL_SECS)?;
        if idle_secs == 0 {
            anyhow::bail!("Environment variable 'BOARD_IDLE_TTL_SECS' must be at least 1");
        }

        Ok(Config {
            ai_api_key: lookup("AI_API_KEY").with_context(|| {
                "Required environment variable 'AI_API_KEY' is not set".to_string()
            })?,
            ai_api_url: lookup("AI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            ai_model: lookup("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ai_body_limit_bytes: parse_or(
                &lookup,
                "AI_BODY_LIMIT_BYTES",
                DEFAULT_AI_BODY_LIMIT_BYTES,
            )?,
            placement,
            board_idle_ttl: Duration::from_secs(idle_secs),
            port: parse_or(&lookup, "PORT", 8080u16)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("AI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.ai_api_url, DEFAULT_API_URL);
        assert_eq!(config.ai_model, DEFAULT_MODEL);
        assert_eq!(config.placement, PlacementConfig::default());
        assert_eq!(config.ai_body_limit_bytes, DEFAULT_AI_BODY_LIMIT_BYTES);
        assert_eq!(config.board_idle_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_limits_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("AI_API_KEY", "k"),
            ("AI_BODY_LIMIT_BYTES", "1048576"),
            ("BOARD_IDLE_TTL_SECS", "90"),
        ]))
        .unwrap();
        assert_eq!(config.ai_body_limit_bytes, 1_048_576);
        assert_eq!(config.board_idle_ttl, Duration::from_secs(90));

        assert!(Config::from_lookup(lookup(&[
            ("AI_API_KEY", "k"),
            ("BOARD_IDLE_TTL_SECS", "0")
        ]))
        .is_err());
    }

    #[test]
    fn test_missing_api_key_fails() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("AI_API_KEY"));
    }

    #[test]
    fn test_placement_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("AI_API_KEY", "k"),
            ("PX_PER_UNIT", "4.0"),
            ("MIN_OVERLAY_UNITS", "8"),
            ("DEFAULT_OVERLAY_UNITS", "25"),
            ("PORT", "3000"),
        ]))
        .unwrap();
        assert_eq!(config.placement.px_per_unit, 4.0);
        assert_eq!(config.placement.min_size_units, 8.0);
        assert_eq!(config.placement.default_size_units, 25.0);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(Config::from_lookup(lookup(&[("AI_API_KEY", "k"), ("PORT", "http")])).is_err());
        assert!(
            Config::from_lookup(lookup(&[("AI_API_KEY", "k"), ("PX_PER_UNIT", "-1")])).is_err()
        );
        assert!(Config::from_lookup(lookup(&[
            ("AI_API_KEY", "k"),
            ("MIN_OVERLAY_UNITS", "30")
        ]))
        .is_err());
    }
}
