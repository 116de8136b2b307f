// src/config.rs
use anyhow::{Context, Result};
use std::env;

use crate::services::session_store::DEFAULT_IDLE_TTL_SECS;

pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_image_model: String,
    pub gemini_base_url: String,
    pub bind_addr: String,
    pub static_dir: String,
    pub max_image_dimension: u32,
    pub max_upload_bytes: usize,
    pub session_idle_ttl_secs: i64,
}

fn positive<T>(raw: Option<String>, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match non_empty(raw) {
        Some(raw) => raw
            .parse::<T>()
            .ok()
            .filter(|value| *value > T::default())
            .with_context(|| format!("{name} must be a positive integer, got {raw:?}")),
        None => Ok(default),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any key lookup. A missing API key is not an
    /// error here; submissions report it instead.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let string_or = |name: &str, default: &str| {
            non_empty(lookup(name)).unwrap_or_else(|| default.to_string())
        };

        let gemini_api_key =
            non_empty(lookup("GEMINI_API_KEY")).or_else(|| non_empty(lookup("API_KEY")));

        let max_image_dimension = positive(lookup("MAX_IMAGE_DIMENSION"), "MAX_IMAGE_DIMENSION", 4096u32)?;
        let max_upload_bytes =
            positive(lookup("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", 20 * 1024 * 1024usize)?;
        let session_idle_ttl_secs = positive(
            lookup("SESSION_IDLE_TTL_SECS"),
            "SESSION_IDLE_TTL_SECS",
            DEFAULT_IDLE_TTL_SECS,
        )?;

        Ok(Self {
            gemini_api_key,
            gemini_image_model: string_or("GEMINI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            gemini_base_url: string_or("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            bind_addr: string_or("BIND_ADDR", "0.0.0.0:8080"),
            static_dir: string_or("STATIC_DIR", "./static"),
            max_image_dimension,
            max_upload_bytes,
            session_idle_ttl_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.static_dir, "./static");
        assert_eq!(config.max_image_dimension, 4096);
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.session_idle_ttl_secs, 86400);
    }

    #[test]
    fn falls_back_to_generic_api_key() {
        let config = load(&[("API_KEY", "fallback"), ("GEMINI_API_KEY", "  ")]).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("fallback"));

        let config = load(&[("API_KEY", "fallback"), ("GEMINI_API_KEY", "primary")]).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn reads_upload_cap_and_session_ttl() {
        let config = load(&[("MAX_UPLOAD_BYTES", "1048576"), ("SESSION_IDLE_TTL_SECS", "600")]).unwrap();
        assert_eq!(config.max_upload_bytes, 1_048_576);
        assert_eq!(config.session_idle_ttl_secs, 600);
        assert!(load(&[("SESSION_IDLE_TTL_SECS", "-5")]).is_err());
    }

    #[test]
    fn rejects_bad_dimension() {
        assert!(load(&[("MAX_IMAGE_DIMENSION", "huge")]).is_err());
        assert!(load(&[("MAX_IMAGE_DIMENSION", "0")]).is_err());
        assert_eq!(
            load(&[("MAX_IMAGE_DIMENSION", "2048")])
                .unwrap()
                .max_image_dimension,
            2048
        );
    }
}
