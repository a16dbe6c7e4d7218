//! Markdown report rendering.
//!
//! Section headings contain the analysis labels used by
//! [`recovery`](crate::analyzer::recovery), so a rendered report can be read
//! back with [`extract_sections`](crate::analyzer::recovery::extract_sections).

use crate::models::{FieldValue, Report};

/// Append a field: prose verbatim, lists as `*` bullets or numbered items.
fn push_field(md: &mut String, value: &FieldValue, numbered: bool, empty_note: &str) {
    match value {
        FieldValue::PlainText(text) if !text.trim().is_empty() => {
            md.push_str(text.trim());
            md.push('\n');
        }
        FieldValue::BulletList(items) if !items.is_empty() => {
            for (i, item) in items.iter().enumerate() {
                if numbered {
                    md.push_str(&format!("{}. {}\n", i + 1, item));
                } else {
                    md.push_str(&format!("* {item}\n"));
                }
            }
        }
        _ => {
            md.push_str(&format!("*{empty_note}*\n"));
        }
    }
    md.push('\n');
}

fn push_heading(md: &mut String, heading: &str) {
    md.push_str(&format!("## {heading}\n\n"));
}

/// Render the full report as a Markdown document.
pub fn render_markdown(report: &Report) -> String {
    let article = &report.article;
    let analysis = &report.analysis;
    let mut md = String::new();

    md.push_str(&format!("# Critical Analysis Report for: {}\n\n", article.title));
    md.push_str(&format!("**Source**: {}\n\n", article.url));
    if let Some(author) = &article.author {
        md.push_str(&format!("**Author**: {author}\n\n"));
    }
    if let Some(date) = &article.date {
        md.push_str(&format!("**Published**: {date}\n\n"));
    }
    md.push_str("---\n\n");

    push_heading(&mut md, "Headline Analysis");
    if let Some(commentary) = &report.headline.commentary {
        md.push_str(commentary.trim());
        md.push_str("\n\n");
    }
    md.push_str(&format!(
        "**Sensationalism Score**: {}/100\n\n",
        report.headline.score.score
    ));
    if !report.headline.score.indicators.is_empty() {
        md.push_str("**Clickbait Indicators**:\n\n");
        for indicator in &report.headline.score.indicators {
            md.push_str(&format!("* {indicator}\n"));
        }
        md.push('\n');
    }

    push_heading(&mut md, "Core Claims");
    push_field(&mut md, &analysis.core_claims, false, "No core claims identified.");

    push_heading(&mut md, "Language & Tone Analysis");
    push_field(&mut md, &analysis.language_tone, false, "No tone analysis available.");

    push_heading(&mut md, "Potential Red Flags");
    push_field(&mut md, &analysis.red_flags, false, "No red flags identified.");

    push_heading(&mut md, "Verification Questions");
    push_field(
        &mut md,
        &analysis.verification_questions,
        true,
        "No verification questions generated.",
    );

    push_heading(&mut md, "Key Entities to Investigate");
    push_field(&mut md, &analysis.key_entities, false, "No key entities identified.");

    push_heading(&mut md, "Counter-Argument Perspective");
    push_field(
        &mut md,
        &analysis.counter_argument,
        false,
        "No counter-argument generated.",
    );

    if let Some(comparison) = &report.comparison {
        push_heading(&mut md, "Comparative Analysis");
        md.push_str(comparison.perspective_analysis.trim());
        md.push_str("\n\n");
        if !comparison.related_articles.is_empty() {
            md.push_str("### Related Articles Analyzed\n\n");
            for related in &comparison.related_articles {
                md.push_str(&format!(
                    "* [{}]({}) - {}\n",
                    related.title, related.url, related.source
                ));
            }
            md.push('\n');
        }
    }

    push_heading(&mut md, "Source Credibility Factors");
    md.push_str(&format!("**Domain**: {}\n\n", report.credibility.domain));
    for factor in &report.credibility.factors {
        md.push_str(&format!("* {factor}\n"));
    }
    md.push('\n');

    md.push_str("---\n\n");
    md.push_str(&format!(
        "*Analysis: {}. Generated by The Digital Skeptic on {}.*\n",
        report.analysis_source.describe(),
        report.generated_at
    ));
    md
}
