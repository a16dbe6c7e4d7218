//! Source credibility factors derived from the URL and the article body.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Article, CredibilityInfo, url_host};

static CITATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)according to [a-z]{2,}",
        r"(?i)cited [a-z]+",
        r"(?i)reported by",
        r"(?i)study (by|from|in)",
        r"(?i)research (by|from|in)",
        r"(?i)sources?:",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid citation regex"))
    .collect()
});

const BRIEF_ARTICLE_CHARS: usize = 1000;

/// Count how many distinct citation patterns occur in `content`.
pub fn count_citations(content: &str) -> usize {
    CITATION_PATTERNS
        .iter()
        .filter(|re| re.is_match(content))
        .count()
}

/// Derive credibility factors for an article. Never fails.
///
/// # Arguments
///
/// * `url` - The URL the article was requested from. The domain comes from
///   here rather than from `article.url`, which points at the local file
///   when the article was pasted in by hand.
/// * `article` - The article whose byline, date and body are inspected
///
/// # Returns
///
/// Factors in a fixed order: author, date, citations, then a brevity note
/// for bodies under 1000 characters.
pub fn analyze_source_credibility(url: &str, article: &Article) -> CredibilityInfo {
    let citation_count = count_citations(&article.content);
    let mut factors = Vec::new();

    factors.push(if article.author.is_some() {
        "Article identifies its author"
    } else {
        "Article does not identify an author"
    });

    factors.push(if article.date.is_some() {
        "Article includes a publication date"
    } else {
        "Article does not include a publication date"
    });

    factors.push(match citation_count {
        0 => "Article does not appear to cite sources",
        1..=3 => "Article includes some citations",
        _ => "Article cites multiple sources",
    });

    if article.content.chars().count() < BRIEF_ARTICLE_CHARS {
        factors.push("Article is very brief, which may limit comprehensive coverage");
    }

    CredibilityInfo {
        factors: factors.into_iter().map(String::from).collect(),
        citation_count,
        domain: url_host(url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::local::parse_article_text;
    use std::path::Path;

    const URL: &str = "https://news.example.org/story";

    fn article(content: &str, author: Option<&str>, date: Option<&str>) -> Article {
        Article {
            title: "Title".to_string(),
            content: content.to_string(),
            url: "https://news.example.org/story".to_string(),
            author: author.map(String::from),
            date: date.map(String::from),
        }
    }

    #[test]
    fn test_bare_article() {
        let info = analyze_source_credibility(URL, &article("Short text.", None, None));
        assert_eq!(info.domain, "news.example.org");
        assert_eq!(info.citation_count, 0);
        assert_eq!(
            info.factors,
            vec![
                "Article does not identify an author",
                "Article does not include a publication date",
                "Article does not appear to cite sources",
                "Article is very brief, which may limit comprehensive coverage",
            ]
        );
    }

    #[test]
    fn test_well_sourced_article() {
        let body = format!(
            "According to Reuters, prices rose. A study by the university found more. \
             Research from the institute agreed, as reported by local press. Sources: agency data. {}",
            "padding ".repeat(150)
        );
        let info = analyze_source_credibility(URL, &article(&body, Some("Jane Doe"), Some("2025-05-06")));
        assert_eq!(info.citation_count, 5);
        assert_eq!(
            info.factors,
            vec![
                "Article identifies its author",
                "Article includes a publication date",
                "Article cites multiple sources",
            ]
        );
    }

    #[test]
    fn test_some_citations() {
        assert_eq!(count_citations("It was cited widely."), 1);
        let info = analyze_source_credibility(URL, &article("It was cited widely.", None, None));
        assert_eq!(info.factors[2], "Article includes some citations");
    }

    #[test]
    fn test_local_fallback_uses_requested_url_domain() {
        let local = parse_article_text("Title\nBody", Path::new("local.txt"));
        let info = analyze_source_credibility("https://www.bbc.com/news/world-1", &local);
        assert_eq!(info.domain, "www.bbc.com");
    }

    #[test]
    fn test_according_to_needs_a_real_word() {
        assert_eq!(count_citations("according to a rumour"), 0);
        assert_eq!(count_citations("according to officials"), 1);
    }
}
