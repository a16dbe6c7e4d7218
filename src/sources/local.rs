//! Local text-file articles and the interactive paste-in fallback.
//!
//! File format: the first line is the title, the rest is the body. A file
//! whose first line is blank takes its file name as the title.

use std::io::{self, BufRead, Write};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::SkepticError;
use crate::models::Article;

/// Contents written to a freshly created fallback file.
pub const TEMPLATE: &str = "Article Title\n\nPaste the article content here...";

/// Capability to pause until a human has edited the fallback file.
///
/// The pipeline never talks to the terminal directly, so tests can script
/// the human side.
pub trait HumanInput {
    fn wait_for_article(&self, path: &Path) -> io::Result<()>;
}

/// Prints instructions to stdout and waits for Enter on stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl HumanInput for TerminalPrompt {
    fn wait_for_article(&self, path: &Path) -> io::Result<()> {
        let rule = "=".repeat(80);
        let mut out = io::stdout().lock();
        writeln!(out, "\n{rule}")?;
        writeln!(
            out,
            "Please copy-paste the article text into the file '{}'",
            path.display()
        )?;
        writeln!(
            out,
            "Format: First line should be the article title, followed by the content."
        )?;
        writeln!(out, "Example:")?;
        writeln!(out, "  Article Title Here")?;
        writeln!(out, "  First paragraph of content...")?;
        writeln!(out, "  Second paragraph of content...")?;
        writeln!(out, "{rule}\n")?;
        write!(out, "Press Enter after you've saved the article text to continue...")?;
        out.flush()?;
        drop(out);

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

/// Parse file contents into an article.
pub fn parse_article_text(raw: &str, path: &Path) -> Article {
    let (first, rest) = raw.split_once('\n').unwrap_or((raw, ""));
    let (title, content) = if first.trim().is_empty() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        (name, raw.to_string())
    } else {
        (first.trim().to_string(), rest.to_string())
    };
    Article {
        title,
        content,
        url: format!("local://{}", path.display()),
        author: None,
        date: None,
    }
}

/// Read an article from a local file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_article_from_file(path: &Path) -> Result<Article, SkepticError> {
    let raw = fs::read_to_string(path).await?;
    let article = parse_article_text(&raw, path);
    info!(title = %article.title, bytes = article.content.len(), "Read local article");
    Ok(article)
}

async fn has_content(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file() && m.len() > 0)
}

/// Obtain the article from the local fallback file.
///
/// An existing non-empty file is read directly. Otherwise a template is
/// created (if missing), the human is asked to fill it in, and the file is
/// read afterwards. Returns `None` when nothing usable could be read.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn obtain_local_article(path: &Path, human: &dyn HumanInput) -> Option<Article> {
    if has_content(path).await {
        info!("Trying to read from existing file");
    } else {
        if fs::metadata(path).await.is_err() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                if let Err(e) = fs::create_dir_all(parent).await {
                    warn!(error = %e, "Could not create directory for template file");
                }
            }
            match fs::write(path, TEMPLATE).await {
                Ok(()) => info!("Empty template created; edit this file now"),
                Err(e) => warn!(error = %e, "Could not create template file"),
            }
        }
        if let Err(e) = human.wait_for_article(path) {
            warn!(error = %e, "Interactive prompt failed");
            return None;
        }
    }

    match read_article_from_file(path).await {
        Ok(article) if !article.content.trim().is_empty() => Some(article),
        Ok(_) => {
            warn!("Local article file has no body text");
            None
        }
        Err(e) => {
            warn!(error = %e, "Error reading local file");
            None
        }
    }
}
