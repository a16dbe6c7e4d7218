//! Related-article discovery through the Google News search page.
//!
//! # URL Pattern
//!
//! Search: `https://news.google.com/search?q=<terms>&hl=en-US`. Results link
//! to relative `./articles/<id>` paths which are resolved to
//! `https://news.google.com/articles/<id>`.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

use crate::error::SkepticError;
use crate::models::{Article, RelatedArticle};

const SEARCH_URL: &str = "https://news.google.com/search";
const ARTICLE_BASE: &str = "https://news.google.com/articles/";

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "is", "are", "was", "were", "in", "on", "at", "to",
    "for", "with", "by", "says", "said",
];

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

static RESULT_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href^="./articles/"]"#).expect("valid selector"));
static RESULT_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3").expect("valid selector"));
static RESULT_SOURCE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div[data-n-tid]").expect("valid selector"));

/// Up to four significant words of the title, lower-cased.
pub fn extract_search_terms(title: &str) -> String {
    let cleaned = NON_WORD.replace_all(title, " ").to_lowercase();
    cleaned
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w) && w.chars().count() > 3)
        .take(4)
        .join(" ")
}

pub fn search_url(terms: &str) -> String {
    format!("{}?q={}&hl=en-US", SEARCH_URL, urlencoding::encode(terms))
}

/// Parse search results, skipping untitled hits, duplicate titles and hits
/// whose source name contains `own_domain`.
pub fn parse_search_results(html: &str, own_domain: &str, max: usize) -> Vec<RelatedArticle> {
    let document = Html::parse_document(html);
    let own_domain = own_domain.to_lowercase();

    document
        .select(&RESULT_LINK)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            let title = link
                .select(&RESULT_TITLE)
                .next()?
                .text()
                .collect::<String>()
                .trim()
                .to_string();
            if title.is_empty() {
                return None;
            }
            let source = link
                .select(&RESULT_SOURCE)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Unknown".to_string());
            if !own_domain.is_empty() && source.to_lowercase().contains(&own_domain) {
                debug!(%title, %source, "Skipping result from the original outlet");
                return None;
            }
            Some(RelatedArticle {
                title,
                url: format!("{}{}", ARTICLE_BASE, href.trim_start_matches("./articles/")),
                source,
            })
        })
        .unique_by(|a| a.title.clone())
        .take(max)
        .collect()
}

async fn try_find_related(
    client: &Client,
    article: &Article,
    max: usize,
) -> Result<Vec<RelatedArticle>, SkepticError> {
    let terms = extract_search_terms(&article.title);
    let url = search_url(&terms);
    info!(%terms, "Searching for related articles");

    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| SkepticError::fetch(&url, e))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SkepticError::fetch(&url, format!("HTTP status {status}")));
    }
    let html = resp.text().await.map_err(|e| SkepticError::fetch(&url, e))?;
    Ok(parse_search_results(&html, &article.domain(), max))
}

/// Find up to `max` articles on the same story from other outlets.
///
/// Errors are logged and reported as no results.
#[instrument(level = "info", skip_all, fields(title = %article.title))]
pub async fn find_related_articles(
    client: &Client,
    article: &Article,
    max: usize,
) -> Vec<RelatedArticle> {
    match try_find_related(client, article, max).await {
        Ok(found) => {
            info!(count = found.len(), "Indexed related article URLs");
            found
        }
        Err(e) => {
            warn!(error = %e, "Error finding related articles");
            Vec::new()
        }
    }
}
