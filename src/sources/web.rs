//! Generic article page scraper.
//!
//! Works on arbitrary news pages, so extraction is deliberately loose: the
//! `<title>` element for the headline, the first byline-like element for the
//! author, the first date-like element for the date, and the paragraphs of
//! the first article-like container (or of the whole page) for the body.

use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

use crate::error::SkepticError;
use crate::models::Article;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector")
}

static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static AUTHOR: Lazy<Selector> =
    Lazy::new(|| selector(r#".author, .byline, [rel="author"], [name="author"]"#));
static DATE: Lazy<Selector> = Lazy::new(|| {
    selector(r#"time, [datetime], .date, .published, [property="article:published_time"]"#)
});
static CONTAINER: Lazy<Selector> = Lazy::new(|| selector("article, .article, .content, .post, main"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));

/// Fetch and parse an article page.
///
/// Returns `None` on any network or HTTP error; the failure is logged.
#[instrument(level = "info", skip(client))]
pub async fn fetch_article(client: &Client, url: &str) -> Option<Article> {
    match try_fetch_article(client, url).await {
        Ok(article) => {
            info!(
                title = %article.title,
                bytes = article.content.len(),
                "Fetched article"
            );
            Some(article)
        }
        Err(e) => {
            warn!(error = %e, "Article fetch failed");
            None
        }
    }
}

async fn try_fetch_article(client: &Client, url: &str) -> Result<Article, SkepticError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| SkepticError::fetch(url, e))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SkepticError::fetch(url, format!("HTTP status {status}")));
    }
    let body = resp.text().await.map_err(|e| SkepticError::fetch(url, e))?;
    Ok(parse_article_html(&body, url))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Visible text of the element, else the first non-empty attribute among `attrs`.
fn text_or_attr(el: ElementRef<'_>, attrs: &[&str]) -> Option<String> {
    let text = element_text(el);
    if !text.is_empty() {
        return Some(text);
    }
    attrs
        .iter()
        .filter_map(|a| el.value().attr(a))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(String::from)
}

/// Parse an article out of page HTML. Scripts and styles never contribute
/// text because only `<p>` contents are collected.
pub fn parse_article_html(html: &str, url: &str) -> Article {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Unknown Title".to_string());

    let author = document
        .select(&AUTHOR)
        .next()
        .and_then(|el| text_or_attr(el, &["content"]));

    let date = document
        .select(&DATE)
        .next()
        .and_then(|el| text_or_attr(el, &["datetime", "content"]));

    let paragraphs: Vec<String> = match document.select(&CONTAINER).next() {
        Some(container) => container.select(&PARAGRAPH).map(element_text).collect(),
        None => document.select(&PARAGRAPH).map(element_text).collect(),
    };
    let content = paragraphs
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    debug!(%title, ?author, ?date, bytes = content.len(), "Parsed article HTML");
    Article {
        title,
        content,
        url: url.to_string(),
        author,
        date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title> Council Approves Budget </title>
  <meta name="author" content="Jane Reporter">
  <style>p { color: red; }</style>
</head>
<body>
  <nav><p>Navigation text</p></nav>
  <article>
    <time datetime="2025-05-06T10:00:00Z"></time>
    <p>The council approved the budget on Tuesday.</p>
    <script>var p = "<p>not text</p>";</script>
    <p>  Taxes will rise by 2%.  </p>
    <p></p>
  </article>
</body>
</html>"#;

    #[test]
    fn test_parse_article_html() {
        let a = parse_article_html(PAGE, "https://example.com/budget");
        assert_eq!(a.title, "Council Approves Budget");
        assert_eq!(a.author.as_deref(), Some("Jane Reporter"));
        assert_eq!(a.date.as_deref(), Some("2025-05-06T10:00:00Z"));
        assert_eq!(
            a.content,
            "The council approved the budget on Tuesday. Taxes will rise by 2%."
        );
        assert_eq!(a.url, "https://example.com/budget");
    }

    #[test]
    fn test_parse_without_container_uses_all_paragraphs() {
        let html = "<html><body><p>One.</p><div><p>Two.</p></div></body></html>";
        let a = parse_article_html(html, "https://example.com");
        assert_eq!(a.title, "Unknown Title");
        assert_eq!(a.content, "One. Two.");
        assert!(a.author.is_none());
        assert!(a.date.is_none());
    }

    #[test]
    fn test_byline_text_preferred() {
        let html = r#"<html><body><span class="byline"> By Sam Writer </span>
            <span class="date">May 6, 2025</span><main><p>Body</p></main></body></html>"#;
        let a = parse_article_html(html, "https://example.com");
        assert_eq!(a.author.as_deref(), Some("By Sam Writer"));
        assert_eq!(a.date.as_deref(), Some("May 6, 2025"));
        assert_eq!(a.content, "Body");
    }
}
