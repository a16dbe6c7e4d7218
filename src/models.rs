//! Data models shared by the fetch, analysis and rendering stages.
//!
//! - [`Article`]: normalised article as produced by a source adapter
//! - [`FieldValue`] / [`AnalysisResult`]: the six-field critical analysis
//! - [`HeadlineScore`] / [`HeadlineAnalysis`]: headline sensationalism results
//! - [`CredibilityInfo`]: source credibility factors
//! - [`ComparativeAnalysis`] / [`RelatedArticle`]: cross-source comparison
//! - [`Report`]: everything the renderers need, merged once

use serde::{Deserialize, Serialize};

/// A news article normalised by one of the source adapters.
///
/// Articles are never mutated after construction; every later stage only
/// borrows them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Headline, or the file name when a local file has no title line.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Source URL, or `local://<path>` for local files.
    pub url: String,
    /// Byline, when the page exposes one.
    pub author: Option<String>,
    /// Publication date as printed on the page.
    pub date: Option<String>,
}

/// Host part of `url`, e.g. `"www.bbc.com"`; empty when it has none.
pub fn url_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

impl Article {
    /// Host part of the article URL.
    pub fn domain(&self) -> String {
        url_host(&self.url)
    }
}

/// Value of a single analysis field.
///
/// Models answer with either prose or a list, and nothing guarantees which.
/// Every consumer matches on these two cases.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    PlainText(String),
    BulletList(Vec<String>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::PlainText(s.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::BulletList(items.into_iter().map(Into::into).collect())
    }

    pub fn empty() -> Self {
        Self::BulletList(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::PlainText(s) => s.trim().is_empty(),
            Self::BulletList(items) => items.is_empty(),
        }
    }

    /// Collapse either shape into a single space-joined line.
    pub fn joined(&self) -> String {
        match self {
            Self::PlainText(s) => s.clone(),
            Self::BulletList(items) => items.join(" "),
        }
    }
}

/// The six analysis fields every analysis tier must produce.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalysisResult {
    pub core_claims: FieldValue,
    pub language_tone: FieldValue,
    pub red_flags: FieldValue,
    pub verification_questions: FieldValue,
    pub key_entities: FieldValue,
    pub counter_argument: FieldValue,
}

/// Which fallback tier produced an [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum AnalysisSource {
    /// The model reply parsed against the JSON schema.
    Structured { model: String },
    /// The schema parse failed; fields were recovered from section headings.
    Sections { model: String },
    /// No reply text was available at all.
    Placeholder,
    /// Every model failed; fields were synthesised from the article itself.
    Heuristic,
}

impl AnalysisSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Structured { model } => format!("structured output from {model}"),
            Self::Sections { model } => format!("section extraction from {model}"),
            Self::Placeholder => "placeholder (no model output)".to_string(),
            Self::Heuristic => "heuristic fallback (all models failed)".to_string(),
        }
    }
}

/// Result of the rule-based headline scorer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeadlineScore {
    /// Sensationalism score, always within `0..=100`.
    pub score: u8,
    /// One entry per rule that contributed to `score`, in rule order.
    pub indicators: Vec<String>,
}

/// Headline score plus optional model commentary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeadlineAnalysis {
    pub score: HeadlineScore,
    pub commentary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CredibilityInfo {
    pub factors: Vec<String>,
    pub citation_count: usize,
    pub domain: String,
}

/// A search hit for the same story from another outlet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelatedArticle {
    pub title: String,
    pub url: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ComparativeAnalysis {
    pub perspective_analysis: String,
    pub related_articles: Vec<RelatedArticle>,
}

/// Everything the renderers consume for one article.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Report {
    pub article: Article,
    pub analysis: AnalysisResult,
    pub analysis_source: AnalysisSource,
    pub headline: HeadlineAnalysis,
    pub comparison: Option<ComparativeAnalysis>,
    pub credibility: CredibilityInfo,
    /// Local timestamp of report generation, RFC 3339.
    pub generated_at: String,
}
