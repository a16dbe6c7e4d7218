//! JSON report output.
//!
//! The whole [`Report`] is serialised, including which analysis tier
//! produced the six fields, so downstream tools can tell a model analysis
//! from a placeholder.

use std::path::Path;
use tracing::{info, instrument};

use crate::error::SkepticError;
use crate::models::Report;
use crate::outputs::save_report;

/// Write a [`Report`] as pretty-printed JSON to `path`.
///
/// Parent directories are created as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(report: &Report, path: &Path) -> Result<(), SkepticError> {
    let json = serde_json::to_string_pretty(report)?;
    save_report(&json, path).await?;
    info!("Wrote JSON report");
    Ok(())
}
