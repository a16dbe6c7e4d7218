//! # The Digital Skeptic
//!
//! A critical-thinking companion for news articles. Fetches one article,
//! scores its headline for sensationalism, asks a hosted language model for
//! a six-part critical analysis, optionally compares coverage with other
//! outlets, and writes the result as Markdown (plus HTML and JSON on request).
//!
//! ## Usage
//!
//! ```sh
//! GOOGLE_API_KEY=... digital_skeptic https://example.com/news/story --html
//! ```
//!
//! ## Architecture
//!
//! One article per run, in a single sequential pass:
//! 1. **Fetching**: download the article, else read the local fallback file
//! 2. **Scoring**: credibility factors and headline sensationalism (no model)
//! 3. **Analysis**: headline commentary and the six-field analysis, each
//!    through the model fallback policy
//! 4. **Comparison** (`--compare`): related coverage from Google News
//! 5. **Output**: Markdown, then optional HTML and JSON

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analyzer;
mod cli;
mod config;
mod error;
mod llm;
mod models;
mod outputs;
mod sources;
mod utils;

use analyzer::{comparative, content, credibility, headline};
use cli::Cli;
use config::Config;
use error::SkepticError;
use llm::GeminiClient;
use models::Report;
use outputs::{html, json, markdown};
use sources::local::TerminalPrompt;
use utils::{ensure_writable_dir, generated_at};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // Parse CLI first so --verbose can shape the log filter
    let args = Cli::parse();

    // --- Tracing init ---
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("digital_skeptic starting up");
    debug!(url = %args.url, output = ?args.output, reports_dir = %args.reports_dir.display(), "Parsed CLI arguments");

    // ---- Config (fails fast without a credential) ----
    let config = match Config::load(args.config.as_deref(), args.api_key.clone()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Configuration error");
            return Err(e.into());
        }
    };
    let policy = config.fallback_policy();

    // Early check: ensure the reports dir is writable
    if args.output.is_none() {
        if let Err(e) = ensure_writable_dir(&args.reports_dir).await {
            error!(
                path = %args.reports_dir.display(),
                error = %e,
                "Reports directory is not writable (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    }

    // ---- Fetch article ----
    let http = sources::http_client()?;
    let article = match sources::web::fetch_article(&http, &args.url).await {
        Some(a) if !a.content.trim().is_empty() => a,
        _ => {
            info!(local = %args.local.display(), "Web fetch failed; falling back to local file");
            match sources::local::obtain_local_article(&args.local, &TerminalPrompt).await {
                Some(a) => a,
                None => {
                    error!("Failed to fetch article content from web or local file. Exiting.");
                    return Err(SkepticError::MissingContent.into());
                }
            }
        }
    };
    info!(title = %article.title, bytes = article.content.len(), "Article ready for analysis");

    // ---- Score and analyze ----
    let credibility = credibility::analyze_source_credibility(&args.url, &article);
    let model = GeminiClient::new(&config)?;

    let headline = headline::analyze_headline(&model, &policy, &article.title).await;
    let (analysis, analysis_source) = content::analyze_article(&model, &policy, &article).await;

    let comparison = if args.compare {
        info!("Running comparative analysis");
        Some(comparative::run_comparison(&model, &policy, &http, &config.settings, &article).await)
    } else {
        None
    };

    let report = Report {
        article,
        analysis,
        analysis_source,
        headline,
        comparison,
        credibility,
        generated_at: generated_at(),
    };

    // ---- Output ----
    let md_path = outputs::report_path(args.output.as_deref(), &args.reports_dir, &report.article.title);
    outputs::save_report(&markdown::render_markdown(&report), &md_path).await?;
    info!(path = %md_path.display(), "Wrote Markdown report");

    if args.html {
        let html_path = md_path.with_extension("html");
        match outputs::save_report(&html::render_html(&report), &html_path).await {
            Ok(()) => info!(path = %html_path.display(), "Wrote HTML report"),
            Err(e) => error!(path = %html_path.display(), error = %e, "Failed writing HTML"),
        }
    }

    if args.json {
        let json_path = md_path.with_extension("json");
        if let Err(e) = json::write_report(&report, &json_path).await {
            error!(path = %json_path.display(), error = %e, "Failed writing JSON");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        source = %report.analysis_source.describe(),
        "Execution complete"
    );

    Ok(())
}
