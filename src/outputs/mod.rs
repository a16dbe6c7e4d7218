//! Report renderers and file output.
//!
//! # Submodules
//!
//! - [`markdown`]: the primary report, always written
//! - [`html`]: interactive Bootstrap page (`--html`)
//! - [`json`]: the full [`Report`](crate::models::Report) as JSON (`--json`)
//!
//! # Output Structure
//!
//! ```text
//! analysis_reports/
//! ├── Council_approves_budget.md
//! ├── Council_approves_budget.html   # --html
//! └── Council_approves_budget.json   # --json
//! ```
//!
//! `--output` replaces the Markdown path; the HTML and JSON files always sit
//! next to it with their own extension.

pub mod html;
pub mod json;
pub mod markdown;

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

use crate::error::SkepticError;
use crate::utils::safe_file_stem;

/// Markdown report path: the explicit one, else `<reports_dir>/<safe title>.md`.
pub fn report_path(output: Option<&Path>, reports_dir: &Path, title: &str) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => reports_dir.join(format!("{}.md", safe_file_stem(title))),
    }
}

/// Write `text` to `path`, creating parent directories first.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn save_report(text: &str, path: &Path) -> Result<(), SkepticError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, text).await?;
    info!(bytes = text.len(), "Report saved");
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_report() -> crate::models::Report {
    use crate::models::{
        AnalysisResult, AnalysisSource, Article, ComparativeAnalysis, CredibilityInfo, FieldValue,
        HeadlineAnalysis, HeadlineScore, RelatedArticle, Report,
    };

    Report {
        article: Article {
            title: "Council approves budget".to_string(),
            content: "Body".to_string(),
            url: "https://example.com/budget".to_string(),
            author: Some("Jane Reporter".to_string()),
            date: None,
        },
        analysis: AnalysisResult {
            core_claims: FieldValue::list(["Budget approved", "Taxes rise 2%"]),
            language_tone: FieldValue::text("Mostly neutral.\nOne emotive quote."),
            red_flags: FieldValue::list(["Single source"]),
            verification_questions: FieldValue::list(["Who voted?", "When does it start?"]),
            key_entities: FieldValue::list(["City Council"]),
            counter_argument: FieldValue::text("Critics call it too small."),
        },
        analysis_source: AnalysisSource::Structured {
            model: "gemini-2.0-flash".to_string(),
        },
        headline: HeadlineAnalysis {
            score: HeadlineScore {
                score: 15,
                indicators: vec!["Superlative language: best".to_string()],
            },
            commentary: Some("The headline is measured.".to_string()),
        },
        comparison: Some(ComparativeAnalysis {
            perspective_analysis: "Outlets agree.".to_string(),
            related_articles: vec![RelatedArticle {
                title: "Budget passes".to_string(),
                url: "https://news.google.com/articles/AAA".to_string(),
                source: "Daily Times".to_string(),
            }],
        }),
        credibility: CredibilityInfo {
            factors: vec!["Author is identified".to_string()],
            citation_count: 0,
            domain: "example.com".to_string(),
        },
        generated_at: "2025-05-06T10:00:00+00:00".to_string(),
    }
}
