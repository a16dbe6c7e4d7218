//! Six-field critical analysis of the article body.

use tracing::{info, instrument, warn};

use crate::analyzer::recovery::{self, FIELDS, RecoveryTier, SectionShape};
use crate::llm::{AskAsync, FallbackPolicy, ask_with_fallback};
use crate::models::{AnalysisResult, AnalysisSource, Article};

fn field_hint(shape: SectionShape) -> &'static str {
    match shape {
        SectionShape::Bulleted => "list of strings",
        SectionShape::Numbered => "list of questions",
        SectionShape::Prose => "string",
    }
}

/// Prompt asking for the six fields as a fenced JSON object.
///
/// The components are numbered and named after the section labels so a reply
/// that ignores the JSON instruction can still be split by heading.
pub fn analysis_prompt(article: &Article) -> String {
    let schema = FIELDS
        .iter()
        .map(|f| format!("  \"{}\": <{}: {}>", f.key, f.label, field_hint(f.shape)))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"You are The Digital Skeptic, an expert critical thinking assistant.
Analyze the following news article and provide a structured critical analysis.

ARTICLE TITLE: {title}

ARTICLE CONTENT:
{content}

Provide the following components:

1. Core Claims: 3-5 bullet points summarizing the main factual claims the article makes.
2. Language & Tone Analysis: a brief analysis of the language used. Is it neutral and objective, or is it emotionally charged, persuasive, or opinionated?
3. Potential Red Flags: signs of bias or poor reporting, such as anonymous sources, lack of data, dramatic language, or missing context.
4. Verification Questions: 3-4 specific questions a reader should ask to independently verify the article's claims.
5. Key Entities: the main people, organizations and locations mentioned, with what a reader should research about each.
6. Counter-Argument: a brief summary of the article's main argument from an opposing viewpoint.

Respond with a single JSON object inside a ```json code block, using exactly these keys:
{{
{schema}
}}"#,
        title = article.title,
        content = article.content,
    )
}

/// Run the six-field analysis through the fallback policy.
///
/// Never fails: a reply that does not parse is recovered from its headings,
/// a blank reply becomes the placeholder analysis, and when every model fails
/// the analysis is synthesised from the article itself.
#[instrument(level = "info", skip_all, fields(title = %article.title))]
pub async fn analyze_article<A: AskAsync>(
    client: &A,
    policy: &FallbackPolicy,
    article: &Article,
) -> (AnalysisResult, AnalysisSource) {
    let Some(reply) = ask_with_fallback(client, policy, &analysis_prompt(article)).await else {
        warn!("Every model failed; synthesising analysis from the article");
        return (recovery::heuristic_analysis(article), AnalysisSource::Heuristic);
    };

    let (analysis, tier) = recovery::recover(Some(&reply.text));
    let source = match tier {
        RecoveryTier::Structured => AnalysisSource::Structured { model: reply.model },
        RecoveryTier::Sections => AnalysisSource::Sections { model: reply.model },
        RecoveryTier::Placeholder => AnalysisSource::Placeholder,
    };
    info!(source = %source.describe(), "Article analysis complete");
    (analysis, source)
}
