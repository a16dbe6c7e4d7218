//! Article source adapters.
//!
//! Every adapter produces a normalised [`Article`](crate::models::Article).
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Article web page | [`web`] | HTML scraping |
//! | Local text file | [`local`] | first line title, rest body |
//! | Google News search | [`google_news`] | HTML scraping of the results page |
//!
//! Web fetches never propagate errors to the pipeline: a failed fetch is
//! logged and reported as "no article", and the caller moves on to the next
//! source.

pub mod google_news;
pub mod local;
pub mod web;

use crate::error::SkepticError;

/// Desktop browser user agent sent with every page request.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP client used for article pages and search results.
pub fn http_client() -> Result<reqwest::Client, SkepticError> {
    Ok(reqwest::Client::builder()
        .user_agent(DESKTOP_USER_AGENT)
        .build()?)
}
