//! Cross-source comparison against related coverage of the same story.
//!
//! Related articles are discovered and fetched one at a time, trimmed to a
//! short excerpt, and handed to the model together with the original.

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::config::Settings;
use crate::llm::{AskAsync, FallbackPolicy, ask_with_fallback};
use crate::models::{Article, ComparativeAnalysis, RelatedArticle};
use crate::sources::{google_news, web};
use crate::utils::truncate_chars;

pub const NO_RELATED: &str = "Unable to find related articles for comparison.";
pub const NO_RELATED_CONTENT: &str = "Unable to fetch content from related articles.";

/// Excerpt of a related article as it goes into the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedExcerpt {
    pub title: String,
    pub source: String,
    pub content: String,
}

pub fn comparison_prompt(original: &Article, related: &[RelatedExcerpt], excerpt_chars: usize) -> String {
    let mut prompt = format!(
        "I'm going to provide you with an original article and {} related articles on the same topic.\n\
         Please compare how they cover the story and identify unique biases, differences in framing, \
         or details emphasized/omitted.\n\n\
         Original Article Title: {}\n\
         Original Article Excerpt: {}\n\n\
         Related Articles:\n",
        related.len(),
        original.title,
        truncate_chars(&original.content, excerpt_chars),
    );
    for (i, r) in related.iter().enumerate() {
        prompt.push_str(&format!(
            "\nArticle {} ({}) - {}:\n{}\n",
            i + 1,
            r.source,
            r.title,
            r.content
        ));
    }
    prompt.push_str(
        "\nPlease provide a comparative analysis that highlights:\n\
         1. Key differences in how these articles frame the same story\n\
         2. Important facts mentioned in some articles but omitted in others\n\
         3. Differences in tone and language between the sources\n\
         4. Potential biases revealed through this comparative analysis\n",
    );
    prompt
}

/// Fetch each related article sequentially and keep the ones with content.
#[instrument(level = "info", skip_all, fields(count = related.len()))]
async fn fetch_excerpts(
    client: &Client,
    related: &[RelatedArticle],
    excerpt_chars: usize,
) -> Vec<RelatedExcerpt> {
    let excerpts: Vec<RelatedExcerpt> = stream::iter(related)
        .then(|r| async move {
            match web::fetch_article(client, &r.url).await {
                Some(a) if !a.content.trim().is_empty() => Some(RelatedExcerpt {
                    title: r.title.clone(),
                    source: r.source.clone(),
                    content: truncate_chars(&a.content, excerpt_chars).to_string(),
                }),
                Some(_) => {
                    warn!(url = %r.url, "Related article produced no content");
                    None
                }
                None => None,
            }
        })
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(fetched = excerpts.len(), "Fetched related article contents");
    excerpts
}

/// Ask the model to compare already-fetched excerpts with the original.
pub async fn compare_article_perspectives<A: AskAsync>(
    client: &A,
    policy: &FallbackPolicy,
    original: &Article,
    related: Vec<RelatedArticle>,
    excerpts: &[RelatedExcerpt],
    excerpt_chars: usize,
) -> ComparativeAnalysis {
    if related.is_empty() {
        return ComparativeAnalysis {
            perspective_analysis: NO_RELATED.to_string(),
            related_articles: related,
        };
    }
    if excerpts.is_empty() {
        return ComparativeAnalysis {
            perspective_analysis: NO_RELATED_CONTENT.to_string(),
            related_articles: related,
        };
    }

    let prompt = comparison_prompt(original, excerpts, excerpt_chars);
    let perspective_analysis = match ask_with_fallback(client, policy, &prompt).await {
        Some(reply) => reply.text.trim().to_string(),
        None => "Error performing comparative analysis: every configured model failed.".to_string(),
    };
    ComparativeAnalysis {
        perspective_analysis,
        related_articles: related,
    }
}

/// Full comparison: search, fetch, compare.
#[instrument(level = "info", skip_all, fields(title = %original.title))]
pub async fn run_comparison<A: AskAsync>(
    model: &A,
    policy: &FallbackPolicy,
    http: &Client,
    settings: &Settings,
    original: &Article,
) -> ComparativeAnalysis {
    let related =
        google_news::find_related_articles(http, original, settings.max_related_articles).await;
    let excerpts = fetch_excerpts(http, &related, settings.related_excerpt_chars).await;
    compare_article_perspectives(
        model,
        policy,
        original,
        related,
        &excerpts,
        settings.related_excerpt_chars,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelError;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Recording {
        prompts: Mutex<Vec<String>>,
    }

    impl AskAsync for Recording {
        async fn ask(&self, _model: &str, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(" Outlets differ in framing. ".to_string())
        }
    }

    fn policy() -> FallbackPolicy {
        FallbackPolicy {
            models: vec!["m".to_string()],
            max_retries: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    fn original() -> Article {
        Article {
            title: "Budget passes".to_string(),
            content: "x".repeat(2000),
            url: "https://example.com/budget".to_string(),
            author: None,
            date: None,
        }
    }

    fn related() -> Vec<RelatedArticle> {
        vec![RelatedArticle {
            title: "Budget approved".to_string(),
            url: "https://news.google.com/articles/AAA".to_string(),
            source: "Daily Times".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_no_related_articles() {
        let model = Recording {
            prompts: Mutex::new(Vec::new()),
        };
        let c = compare_article_perspectives(&model, &policy(), &original(), vec![], &[], 1000).await;
        assert_eq!(c.perspective_analysis, NO_RELATED);
        assert!(c.related_articles.is_empty());
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_related_without_content() {
        let model = Recording {
            prompts: Mutex::new(Vec::new()),
        };
        let c = compare_article_perspectives(&model, &policy(), &original(), related(), &[], 1000).await;
        assert_eq!(c.perspective_analysis, NO_RELATED_CONTENT);
        assert_eq!(c.related_articles.len(), 1);
    }

    #[tokio::test]
    async fn test_comparison_uses_model_reply() {
        let model = Recording {
            prompts: Mutex::new(Vec::new()),
        };
        let excerpts = vec![RelatedExcerpt {
            title: "Budget approved".to_string(),
            source: "Daily Times".to_string(),
            content: "Short excerpt".to_string(),
        }];
        let c = compare_article_perspectives(&model, &policy(), &original(), related(), &excerpts, 1000)
            .await;
        assert_eq!(c.perspective_analysis, "Outlets differ in framing.");
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Article 1 (Daily Times) - Budget approved:\nShort excerpt"));
    }

    #[test]
    fn test_prompt_truncates_original_excerpt() {
        let prompt = comparison_prompt(&original(), &[], 1000);
        assert!(prompt.contains(&"x".repeat(1000)));
        assert!(!prompt.contains(&"x".repeat(1001)));
        assert!(prompt.contains("0 related articles"));
    }
}
