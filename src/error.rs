//! Error taxonomy for the analysis pipeline.
//!
//! Only two conditions are fatal: a missing model credential and an article
//! that cannot be obtained from any source. Fetch and parse failures are
//! represented here so they can be logged with context, but callers degrade
//! them into empty results or placeholder analyses instead of aborting.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SkepticError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error(
        "{0} environment variable is not set. Export it or pass --api-key before running an analysis."
    )]
    MissingCredential(&'static str),

    #[error("invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("structured output parse failed: {0}")]
    Parse(String),

    #[error("failed to obtain article content")]
    MissingContent,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SkepticError {
    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_names_the_variable() {
        let err = SkepticError::MissingCredential("GOOGLE_API_KEY");
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_fetch_error_display() {
        let err = SkepticError::fetch("https://example.com/a", "status 404");
        assert_eq!(
            err.to_string(),
            "failed to fetch https://example.com/a: status 404"
        );
    }
}
