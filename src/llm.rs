//! Model interaction with per-model retry and cross-model fallback.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait, "send this prompt to this model"
//! - [`GeminiClient`]: Generative Language REST implementation of [`AskAsync`]
//! - [`FallbackState`]: explicit state machine deciding what to try next
//! - [`ask_with_fallback`]: drives the state machine against any [`AskAsync`]
//!
//! # Retry Strategy
//!
//! Only rate limiting is retried, and only on the same model:
//!
//! ```text
//! delay = min(base_delay * 2^attempt, max_delay) + random_jitter(0..=max_jitter)
//! ```
//!
//! Any other failure abandons the current model immediately. When the last
//! model is abandoned the caller receives `None` and falls back to a
//! placeholder analysis.

use rand::{Rng, rng};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::error::SkepticError;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("rate limited (status={status}): {message}")]
    RateLimited { status: StatusCode, message: String },

    #[error("upstream returned error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model reply contained no text")]
    EmptyReply,
}

impl ModelError {
    /// Classify an upstream failure, treating 429 and quota messages as rate limits.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS || message.to_lowercase().contains("quota") {
            Self::RateLimited { status, message }
        } else {
            Self::Upstream { status, message }
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Trait for async model interaction.
///
/// Implementors send a prompt to the named model and return its text reply.
/// Tests substitute scripted implementations.
pub trait AskAsync {
    async fn ask(&self, model: &str, prompt: &str) -> Result<String, ModelError>;
}

/// Client for the Generative Language `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    temperature: f32,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, SkepticError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("digital_skeptic/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.settings.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            temperature: config.settings.temperature,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorObject,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    message: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

impl AskAsync for GeminiClient {
    #[instrument(level = "info", skip_all, fields(%model))]
    async fn ask(&self, model: &str, prompt: &str) -> Result<String, ModelError> {
        let t0 = Instant::now();
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(raw);
            let err = ModelError::from_status(status, message);
            warn!(elapsed_ms = t0.elapsed().as_millis(), error = %err, "API call failed");
            return Err(err);
        }

        let parsed: GenerateResponse = resp.json().await?;
        let text = parsed.into_text().ok_or(ModelError::EmptyReply)?;
        debug!(elapsed_ms = t0.elapsed().as_millis(), bytes = text.len(), "API call succeeded");
        Ok(text)
    }
}

/// Ordered model list plus the rate-limit retry budget for each model.
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    pub models: Vec<String>,
    /// Attempts per model, including the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_jitter: Duration,
}

impl FallbackPolicy {
    /// Backoff before retry number `attempt + 1` of the same model.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let mult = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(mult).min(self.max_delay);
        let jitter_cap = self.max_jitter.as_millis() as u64;
        let jitter_ms: u64 = rng().random_range(0..=jitter_cap);
        delay + Duration::from_millis(jitter_ms)
    }
}

/// Outcome of a single model call, as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RateLimited,
    HardFailure,
}

impl AttemptOutcome {
    pub fn of<T>(result: &Result<T, ModelError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) if e.is_rate_limited() => Self::RateLimited,
            Err(_) => Self::HardFailure,
        }
    }
}

/// Where the fallback loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackState {
    /// Call `models[index]`; `attempt` counts from 0.
    TryModel { index: usize, attempt: u32 },
    /// A call succeeded on `models[index]`.
    Succeeded { index: usize },
    /// Every model was abandoned.
    Exhausted,
}

impl FallbackState {
    pub fn start(model_count: usize) -> Self {
        if model_count == 0 {
            Self::Exhausted
        } else {
            Self::TryModel { index: 0, attempt: 0 }
        }
    }

    /// Deterministic transition after an attempt in state `TryModel`.
    pub fn advance(self, outcome: AttemptOutcome, model_count: usize, max_retries: u32) -> Self {
        let Self::TryModel { index, attempt } = self else {
            return self;
        };
        let next_model = || {
            if index + 1 < model_count {
                Self::TryModel { index: index + 1, attempt: 0 }
            } else {
                Self::Exhausted
            }
        };
        match outcome {
            AttemptOutcome::Success => Self::Succeeded { index },
            AttemptOutcome::RateLimited if attempt + 1 < max_retries => Self::TryModel {
                index,
                attempt: attempt + 1,
            },
            AttemptOutcome::RateLimited | AttemptOutcome::HardFailure => next_model(),
        }
    }
}

/// A successful reply and the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    pub model: String,
    pub text: String,
}

/// Send `prompt` through the fallback policy.
///
/// # Arguments
///
/// * `client` - Anything that can ask one named model
/// * `policy` - Model order, attempts per model and backoff bounds
/// * `prompt` - The full prompt text
///
/// # Returns
///
/// The first successful reply, or `None` once every model has been
/// abandoned. Callers degrade to a placeholder result instead of failing.
#[instrument(level = "info", skip_all, fields(models = policy.models.len()))]
pub async fn ask_with_fallback<A: AskAsync>(
    client: &A,
    policy: &FallbackPolicy,
    prompt: &str,
) -> Option<ModelReply> {
    let total_t0 = Instant::now();
    let model_count = policy.models.len();
    let mut state = FallbackState::start(model_count);

    while let FallbackState::TryModel { index, attempt } = state {
        let model = &policy.models[index];
        info!(%model, attempt = attempt + 1, max = policy.max_retries, "Asking model");
        let attempt_t0 = Instant::now();
        let result = client.ask(model, prompt).await;
        let outcome = AttemptOutcome::of(&result);
        let next = state.advance(outcome, model_count, policy.max_retries);

        match result {
            Ok(text) => {
                info!(
                    %model,
                    elapsed_ms_total = total_t0.elapsed().as_millis(),
                    "ask_with_fallback succeeded"
                );
                return Some(ModelReply {
                    model: model.clone(),
                    text,
                });
            }
            Err(e) => {
                let elapsed_ms_attempt = attempt_t0.elapsed().as_millis();
                match next {
                    FallbackState::TryModel { index: i, .. } if i == index => {
                        let delay = policy.backoff_delay(attempt);
                        warn!(%model, attempt = attempt + 1, elapsed_ms_attempt, ?delay, error = %e, "Rate limit hit; backing off");
                        sleep(delay).await;
                    }
                    _ => {
                        warn!(%model, attempt = attempt + 1, elapsed_ms_attempt, error = %e, "Giving up on model");
                    }
                }
            }
        }
        state = next;
    }

    error!(
        elapsed_ms_total = total_t0.elapsed().as_millis(),
        "All models failed"
    );
    None
}
