//! Runtime configuration for the model client and the comparative analyzer.
//!
//! Settings come from an optional YAML file; every key has a default so an
//! empty or missing file is valid. The API credential is never read from the
//! YAML file: it arrives through the CLI (which falls back to the
//! `GOOGLE_API_KEY` environment variable) and loading fails fast when it is
//! absent.
//!
//! ```yaml
//! base_url: https://generativelanguage.googleapis.com/v1beta
//! models: [gemini-2.0-flash, gemini-1.5-flash]
//! temperature: 0.2
//! max_retries: 3
//! base_delay_ms: 1000
//! ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::error::SkepticError;
use crate::llm::FallbackPolicy;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Tunable settings, as found in the YAML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the Generative Language REST API.
    pub base_url: String,
    /// Models to try, in order.
    pub models: Vec<String>,
    pub temperature: f32,
    /// Attempts per model when the failure is a rate limit.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_jitter_ms: u64,
    /// Upper bound on related articles fetched for the comparison.
    pub max_related_articles: usize,
    /// Characters of each article included in the comparison prompt.
    pub related_excerpt_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            models: vec![
                "gemini-2.0-flash".to_string(),
                "gemini-1.5-flash".to_string(),
                "gemini-1.0-flash".to_string(),
            ],
            temperature: 0.2,
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            max_jitter_ms: 1_000,
            max_related_articles: 3,
            related_excerpt_chars: 1_000,
        }
    }
}

/// Fully resolved configuration handed to the model client at construction.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub settings: Settings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("settings", &self.settings)
            .finish()
    }
}

impl Config {
    /// Build the configuration from an optional YAML file and the credential.
    ///
    /// # Errors
    ///
    /// - [`SkepticError::MissingCredential`] when `api_key` is absent or blank
    /// - [`SkepticError::Config`] when the file is unreadable, malformed, or
    ///   lists no models
    #[instrument(level = "info", skip(api_key))]
    pub fn load(path: Option<&Path>, api_key: Option<String>) -> Result<Self, SkepticError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(SkepticError::MissingCredential(API_KEY_ENV))?;

        let settings = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| SkepticError::Config {
                    path: p.to_path_buf(),
                    reason: e.to_string(),
                })?;
                let settings = Settings::from_yaml(&raw).map_err(|reason| SkepticError::Config {
                    path: p.to_path_buf(),
                    reason,
                })?;
                info!(config_path = %p.display(), "Loaded configuration");
                settings
            }
            None => Settings::default(),
        };
        debug!(?settings, "Resolved settings");

        Ok(Self { api_key, settings })
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        let s = &self.settings;
        FallbackPolicy {
            models: s.models.clone(),
            max_retries: s.max_retries.max(1),
            base_delay: Duration::from_millis(s.base_delay_ms),
            max_delay: Duration::from_millis(s.max_delay_ms),
            max_jitter: Duration::from_millis(s.max_jitter_ms),
        }
    }
}

impl Settings {
    /// Parse and validate YAML settings. An empty document yields defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, String> {
        let settings: Settings = if raw.trim().is_empty() {
            Settings::default()
        } else {
            serde_yaml::from_str(raw).map_err(|e| e.to_string())?
        };
        if settings.models.is_empty() {
            return Err("`models` must list at least one model".to_string());
        }
        Ok(settings)
    }
}
