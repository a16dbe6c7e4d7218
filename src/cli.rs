//! Command-line interface definitions for the Digital Skeptic.
//!
//! All options can be given as flags; the API key also falls back to the
//! `GOOGLE_API_KEY` environment variable.

use clap::Parser;
use std::path::PathBuf;

use crate::config::API_KEY_ENV;

/// Command-line arguments for the Digital Skeptic.
///
/// # Examples
///
/// ```sh
/// # Markdown report under ./analysis_reports
/// digital_skeptic https://example.com/news/story
///
/// # HTML and JSON next to an explicit Markdown path, with comparison
/// digital_skeptic https://example.com/news/story -o out/story.md --html --json --compare
///
/// # Offline: read the article from a local file when the fetch fails
/// digital_skeptic https://example.com/paywalled -l story.txt
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// URL of the news article to analyze
    pub url: String,

    /// Path for the Markdown report (default: <reports-dir>/<title>.md)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Local text file used when the article cannot be fetched
    #[arg(short, long, default_value = "local.txt")]
    pub local: PathBuf,

    /// Also write an interactive HTML report
    #[arg(long)]
    pub html: bool,

    /// Compare coverage with related articles from other outlets
    #[arg(long)]
    pub compare: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for reports when --output is not given
    #[arg(short, long, default_value = "analysis_reports")]
    pub reports_dir: PathBuf,

    /// Also write the full report as JSON
    #[arg(long)]
    pub json: bool,

    /// Google Generative Language API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["digital_skeptic", "https://example.com/story"]);

        assert_eq!(cli.url, "https://example.com/story");
        assert_eq!(cli.output, None);
        assert_eq!(cli.local, PathBuf::from("local.txt"));
        assert_eq!(cli.reports_dir, PathBuf::from("analysis_reports"));
        assert!(!cli.html);
        assert!(!cli.compare);
        assert!(!cli.json);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "digital_skeptic",
            "https://example.com/story",
            "-o",
            "/tmp/report.md",
            "-l",
            "/tmp/story.txt",
            "-c",
            "/tmp/config.yaml",
            "-r",
            "/tmp/reports",
            "-v",
        ]);

        assert_eq!(cli.output, Some(PathBuf::from("/tmp/report.md")));
        assert_eq!(cli.local, PathBuf::from("/tmp/story.txt"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.yaml")));
        assert_eq!(cli.reports_dir, PathBuf::from("/tmp/reports"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "digital_skeptic",
            "https://example.com/story",
            "--html",
            "--compare",
            "--json",
            "--api-key",
            "k",
        ]);

        assert!(cli.html);
        assert!(cli.compare);
        assert!(cli.json);
        assert_eq!(cli.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_cli_requires_url() {
        assert!(Cli::try_parse_from(["digital_skeptic"]).is_err());
    }
}
