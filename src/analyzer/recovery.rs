//! Recovery of the six analysis fields from model output.
//!
//! Three tiers, tried in order:
//!
//! 1. **Structured**: the reply contains a JSON object with all six keys.
//! 2. **Sections**: the reply is prose with headings; each field is cut out
//!    from under the heading that names it.
//! 3. **Placeholder**: there is no reply text at all.
//!
//! None of these functions return an error to the caller; a malformed reply
//! degrades to a less informative but well-formed [`AnalysisResult`].

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::SkepticError;
use crate::models::{AnalysisResult, Article, FieldValue};
use crate::utils::{looks_truncated, truncate_for_log};

/// How a field's lines are read in the section-extraction tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionShape {
    /// Lines carrying a bullet marker, marker removed.
    Bulleted,
    /// Every line, leading "1." / "1)" removed.
    Numbered,
    /// All lines joined with newlines; paragraph breaks survive.
    Prose,
}

/// One of the six fields: JSON key, heading label and extraction shape.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub shape: SectionShape,
}

/// The six fields in report order. Headings written by the renderers and
/// requested in prompts all contain these labels.
pub const FIELDS: [FieldSpec; 6] = [
    FieldSpec {
        key: "core_claims",
        label: "Core Claims",
        shape: SectionShape::Bulleted,
    },
    FieldSpec {
        key: "language_tone",
        label: "Language & Tone",
        shape: SectionShape::Prose,
    },
    FieldSpec {
        key: "red_flags",
        label: "Red Flags",
        shape: SectionShape::Bulleted,
    },
    FieldSpec {
        key: "verification_questions",
        label: "Verification Questions",
        shape: SectionShape::Numbered,
    },
    FieldSpec {
        key: "key_entities",
        label: "Key Entities",
        shape: SectionShape::Bulleted,
    },
    FieldSpec {
        key: "counter_argument",
        label: "Counter-Argument",
        shape: SectionShape::Prose,
    },
];

/// Which tier produced a recovered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryTier {
    Structured,
    Sections,
    Placeholder,
}

static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").expect("valid regex"));
static NUMBER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?\d+[.)]\s*").expect("valid regex"));

/// Recover an analysis from raw model text, falling through the tiers.
///
/// # Arguments
///
/// * `raw` - The model reply, or `None` when every model was abandoned
///
/// # Returns
///
/// The analysis and the tier that produced it. A JSON object (fenced or bare)
/// wins, then labelled sections, then the fixed empty analysis.
pub fn recover(raw: Option<&str>) -> (AnalysisResult, RecoveryTier) {
    let Some(text) = raw.filter(|t| !t.trim().is_empty()) else {
        warn!("No model text to recover from; using placeholder analysis");
        return (empty_analysis(), RecoveryTier::Placeholder);
    };

    match parse_structured(text) {
        Ok(analysis) => (analysis, RecoveryTier::Structured),
        Err(e) => {
            warn!(
                error = %e,
                response_preview = %truncate_for_log(text, 300),
                "Model returned non-conforming output; extracting sections"
            );
            (extract_sections(text), RecoveryTier::Sections)
        }
    }
}

fn json_candidate(text: &str) -> Option<&str> {
    if let Some(caps) = JSON_FENCE.captures(text) {
        return caps.get(1).map(|m| m.as_str());
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn field_from_json(value: &Value) -> Option<FieldValue> {
    match value {
        Value::String(s) => Some(FieldValue::PlainText(s.trim().to_string())),
        Value::Array(items) => Some(FieldValue::BulletList(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .collect(),
        )),
        _ => None,
    }
}

/// Schema-directed parse: a JSON object carrying all six keys.
pub fn parse_structured(text: &str) -> Result<AnalysisResult, SkepticError> {
    let candidate =
        json_candidate(text).ok_or_else(|| SkepticError::Parse("no JSON object found".into()))?;
    let value: Value = serde_json::from_str(candidate).map_err(|e| {
        if looks_truncated(&e) {
            debug!("JSON in model reply looks truncated");
        }
        SkepticError::Json(e)
    })?;
    let object = value
        .as_object()
        .ok_or_else(|| SkepticError::Parse("top-level JSON value is not an object".into()))?;

    let field = |key: &str| -> Result<FieldValue, SkepticError> {
        let v = object
            .get(key)
            .ok_or_else(|| SkepticError::Parse(format!("missing key `{key}`")))?;
        field_from_json(v)
            .ok_or_else(|| SkepticError::Parse(format!("key `{key}` is neither string nor list")))
    };

    Ok(AnalysisResult {
        core_claims: field("core_claims")?,
        language_tone: field("language_tone")?,
        red_flags: field("red_flags")?,
        verification_questions: field("verification_questions")?,
        key_entities: field("key_entities")?,
        counter_argument: field("counter_argument")?,
    })
}

fn is_heading(line: &str) -> bool {
    let t = line.trim();
    if t.starts_with('#') {
        return true;
    }
    let bold = t.trim_end_matches(':');
    bold.len() > 4
        && bold.starts_with("**")
        && bold.ends_with("**")
        && !bold[2..bold.len() - 2].contains("**")
        || t.len() > 5 && t.starts_with("**") && t.ends_with(":**")
}

/// Split text into `(heading, body lines)` pairs. Body lines are trimmed and
/// blank lines kept. Text before the first heading is dropped.
fn split_sections(text: &str) -> Vec<(&str, Vec<&str>)> {
    let mut sections: Vec<(&str, Vec<&str>)> = Vec::new();
    for line in text.lines() {
        if is_heading(line) {
            sections.push((line, Vec::new()));
        } else if let Some((_, body)) = sections.last_mut() {
            body.push(line.trim());
        }
    }
    sections
}

fn strip_bullet(line: &str) -> Option<&str> {
    ["* ", "- ", "• "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
}

/// Body without leading and trailing blank lines.
fn trim_blank_lines<'a, 'b>(body: &'b [&'a str]) -> &'b [&'a str] {
    let start = body.iter().position(|l| !l.is_empty()).unwrap_or(body.len());
    let end = body.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    &body[start..end]
}

/// A lone italic line such as `*No red flags identified.*`, which the
/// Markdown report writes in place of an empty field.
fn is_empty_field_note(body: &[&str]) -> bool {
    match body {
        [line] => {
            line.len() > 2 && line.starts_with('*') && line.ends_with('*') && !line.starts_with("**")
        }
        _ => false,
    }
}

fn read_section(body: &[&str], shape: SectionShape) -> FieldValue {
    let body = trim_blank_lines(body);
    let body = if is_empty_field_note(body) { &[][..] } else { body };
    match shape {
        SectionShape::Bulleted => {
            FieldValue::BulletList(
                body.iter()
                    .filter_map(|&l| strip_bullet(l))
                    .map(String::from)
                    .collect(),
            )
        }
        SectionShape::Numbered => FieldValue::BulletList(
            body.iter()
                .map(|&l| {
                    let l = strip_bullet(l).unwrap_or(l);
                    NUMBER_PREFIX.replace(l, "").trim().to_string()
                })
                .filter(|l| !l.is_empty())
                .collect(),
        ),
        SectionShape::Prose => FieldValue::PlainText(body.join("\n")),
    }
}

/// Extract a single field by its heading label.
///
/// The first heading containing `label` (case-insensitive) wins. A label that
/// is not found yields an empty list.
pub fn extract_section(text: &str, label: &str, shape: SectionShape) -> FieldValue {
    let needle = label.to_lowercase();
    split_sections(text)
        .into_iter()
        .find(|(heading, _)| heading.to_lowercase().contains(&needle))
        .map(|(_, body)| read_section(&body, shape))
        .unwrap_or_else(FieldValue::empty)
}

/// Section-extraction tier over all six fields.
pub fn extract_sections(text: &str) -> AnalysisResult {
    let [claims, tone, flags, questions, entities, counter] =
        FIELDS.map(|f| extract_section(text, f.label, f.shape));
    AnalysisResult {
        core_claims: claims,
        language_tone: tone,
        red_flags: flags,
        verification_questions: questions,
        key_entities: entities,
        counter_argument: counter,
    }
}

/// Fixed analysis used when no content is available at all.
pub fn empty_analysis() -> AnalysisResult {
    AnalysisResult {
        core_claims: FieldValue::list(["No article content available for analysis"]),
        language_tone: FieldValue::text("No content to analyze"),
        red_flags: FieldValue::list(["No content available for analysis"]),
        verification_questions: FieldValue::list([
            "Is the article content actually available?",
            "Is there a technical issue with the content retrieval?",
        ]),
        key_entities: FieldValue::empty(),
        counter_argument: FieldValue::text("No content to analyze"),
    }
}

/// Capitalised words that do not open a sentence, first five distinct.
fn entity_candidates(content: &str) -> Vec<String> {
    let words: Vec<&str> = content.split_whitespace().collect();
    words
        .iter()
        .enumerate()
        .filter(|(i, _)| *i > 0 && !words[i - 1].ends_with(['.', '!', '?', '"', '\'']))
        .map(|(_, w)| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > 1 && w.starts_with(char::is_uppercase))
        .unique()
        .take(5)
        .map(String::from)
        .collect()
}

/// Analysis synthesised from the article alone, used when every model failed.
pub fn heuristic_analysis(article: &Article) -> AnalysisResult {
    if article.content.trim().is_empty() {
        return empty_analysis();
    }
    AnalysisResult {
        core_claims: FieldValue::list([format!("The article discusses {}", article.title)]),
        language_tone: FieldValue::text("Unable to analyze the tone due to technical limitations."),
        red_flags: FieldValue::list(["Analysis unavailable - please read critically"]),
        verification_questions: FieldValue::list([
            "What are the primary sources cited in this article?",
            "Is there evidence presented to support the main claims?",
            "What perspectives might be missing from this reporting?",
        ]),
        key_entities: FieldValue::BulletList(
            entity_candidates(&article.content)
                .into_iter()
                .map(|e| format!("{e} - Consider researching this entity's background"))
                .collect(),
        ),
        counter_argument: FieldValue::text(
            "Unable to generate a counter-argument due to technical limitations. \
             Consider seeking alternative viewpoints on this topic.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTIONED: &str = "\
Here is my analysis.

### 1. Core Claims
* The council approved the budget.
* Taxes will rise by 2%.

### 2. Language & Tone Analysis
The tone is mostly neutral.
Some quotes are emotive.

### 3. Potential Red Flags
- Relies on a single anonymous source

### 4. Verification Questions
1. Who proposed the tax increase?
2) When does the budget take effect?

### 5. Key Entities Analysis
* City Council - check voting records

### 6. Counter-Argument Simulation
Supporters argue the increase is modest.
";

    #[test]
    fn test_no_text_returns_placeholder() {
        let (analysis, tier) = recover(None);
        assert_eq!(tier, RecoveryTier::Placeholder);
        assert_eq!(analysis, empty_analysis());

        let (_, tier) = recover(Some("   \n"));
        assert_eq!(tier, RecoveryTier::Placeholder);
    }

    #[test]
    fn test_empty_analysis_has_all_fields() {
        let a = empty_analysis();
        assert!(!a.core_claims.is_empty());
        assert!(!a.language_tone.is_empty());
        assert!(!a.red_flags.is_empty());
        assert!(!a.verification_questions.is_empty());
        assert_eq!(a.key_entities, FieldValue::empty());
        assert!(!a.counter_argument.is_empty());
    }

    #[test]
    fn test_structured_json_in_fence() {
        let text = r#"Sure.
```json
{
  "core_claims": ["A", "B"],
  "language_tone": "Neutral",
  "red_flags": [],
  "verification_questions": ["Q1?"],
  "key_entities": [{"name": "ACME"}],
  "counter_argument": "Opposing view"
}
```"#;
        let (a, tier) = recover(Some(text));
        assert_eq!(tier, RecoveryTier::Structured);
        assert_eq!(a.core_claims, FieldValue::list(["A", "B"]));
        assert_eq!(a.language_tone, FieldValue::text("Neutral"));
        assert_eq!(a.red_flags, FieldValue::empty());
        assert_eq!(a.key_entities, FieldValue::list([r#"{"name":"ACME"}"#]));
    }

    #[test]
    fn test_structured_bare_object() {
        let text = r#"{"core_claims": "one claim", "language_tone": "calm", "red_flags": ["x"],
            "verification_questions": ["q"], "key_entities": ["e"], "counter_argument": "c"}"#;
        let a = parse_structured(text).unwrap();
        assert_eq!(a.core_claims, FieldValue::text("one claim"));
    }

    #[test]
    fn test_missing_key_fails_structured_parse() {
        let text = r#"{"core_claims": ["A"]}"#;
        assert!(matches!(parse_structured(text), Err(SkepticError::Parse(_))));
    }

    #[test]
    fn test_truncated_json_falls_back_to_sections() {
        let text = "{\"core_claims\": [\"A\"\n### Core Claims\n* A\n";
        let (a, tier) = recover(Some(text));
        assert_eq!(tier, RecoveryTier::Sections);
        assert_eq!(a.core_claims, FieldValue::list(["A"]));
    }

    #[test]
    fn test_core_claims_two_bullets() {
        let text = "### Core Claims\n* First claim\n* Second claim\n";
        let (a, tier) = recover(Some(text));
        assert_eq!(tier, RecoveryTier::Sections);
        assert_eq!(a.core_claims, FieldValue::list(["First claim", "Second claim"]));
    }

    #[test]
    fn test_extract_all_sections() {
        let a = extract_sections(SECTIONED);
        assert_eq!(
            a.core_claims,
            FieldValue::list(["The council approved the budget.", "Taxes will rise by 2%."])
        );
        assert_eq!(
            a.language_tone,
            FieldValue::text("The tone is mostly neutral.\nSome quotes are emotive.")
        );
        assert_eq!(
            a.red_flags,
            FieldValue::list(["Relies on a single anonymous source"])
        );
        assert_eq!(
            a.verification_questions,
            FieldValue::list([
                "Who proposed the tax increase?",
                "When does the budget take effect?"
            ])
        );
        assert_eq!(
            a.key_entities,
            FieldValue::list(["City Council - check voting records"])
        );
        assert_eq!(
            a.counter_argument,
            FieldValue::text("Supporters argue the increase is modest.")
        );
    }

    #[test]
    fn test_missing_label_yields_empty_list() {
        let text = "### Core Claims\n* Only claims here\n";
        let a = extract_sections(text);
        assert_eq!(a.red_flags, FieldValue::empty());
        assert_eq!(a.counter_argument, FieldValue::empty());
    }

    #[test]
    fn test_prose_keeps_paragraph_breaks() {
        let text = "## Counter-Argument\n\nFirst paragraph.\n\nSecond paragraph.\n\n## Next\n";
        assert_eq!(
            extract_section(text, "Counter-Argument", SectionShape::Prose),
            FieldValue::text("First paragraph.\n\nSecond paragraph.")
        );
    }

    #[test]
    fn test_empty_field_note_reads_as_empty() {
        let text = "## Language & Tone\n\n*No tone analysis available.*\n\n\
                    ## Verification Questions\n\n*No verification questions generated.*\n";
        assert_eq!(
            extract_section(text, "Language & Tone", SectionShape::Prose),
            FieldValue::text("")
        );
        assert_eq!(
            extract_section(text, "Verification Questions", SectionShape::Numbered),
            FieldValue::empty()
        );
    }

    #[test]
    fn test_bulleted_section_ignores_unmarked_lines() {
        let text = "## Red Flags\nIntro sentence\n* Real flag\n";
        assert_eq!(
            extract_section(text, "Red Flags", SectionShape::Bulleted),
            FieldValue::list(["Real flag"])
        );
    }

    #[test]
    fn test_bold_headings_are_sections() {
        let text = "**Core Claims:**\n* Claim\n\n**Red Flags**\n* Flag\n";
        let a = extract_sections(text);
        assert_eq!(a.core_claims, FieldValue::list(["Claim"]));
        assert_eq!(a.red_flags, FieldValue::list(["Flag"]));
    }

    #[test]
    fn test_label_match_is_case_insensitive() {
        let text = "### CORE CLAIMS\n* shouted claim\n";
        assert_eq!(
            extract_section(text, "Core Claims", SectionShape::Bulleted),
            FieldValue::list(["shouted claim"])
        );
    }

    fn article(content: &str) -> Article {
        Article {
            title: "Budget vote".to_string(),
            content: content.to_string(),
            url: "https://example.com/budget".to_string(),
            author: None,
            date: None,
        }
    }

    #[test]
    fn test_heuristic_analysis() {
        let a = heuristic_analysis(&article(
            "Yesterday the Springfield council met with Mayor Quimby. The Mayor said Springfield would act.",
        ));
        assert_eq!(
            a.core_claims,
            FieldValue::list(["The article discusses Budget vote"])
        );
        let FieldValue::BulletList(entities) = a.key_entities else {
            panic!("entities should be a list");
        };
        assert_eq!(entities.len(), 3);
        assert!(entities[0].starts_with("Springfield - "));
        assert!(entities[1].starts_with("Mayor - "));
        assert!(entities[2].starts_with("Quimby - "));
        assert!(matches!(a.verification_questions, FieldValue::BulletList(ref q) if q.len() == 3));
    }

    #[test]
    fn test_entity_candidates_skip_sentence_openers() {
        let found = entity_candidates(
            "Officials met Reuters. Later, NASA spoke! Who told Acme? Everyone praised Acme and Bob.",
        );
        assert_eq!(found, vec!["Reuters", "NASA", "Acme", "Bob"]);
    }

    #[test]
    fn test_heuristic_analysis_without_content_is_empty_analysis() {
        assert_eq!(heuristic_analysis(&article("  ")), empty_analysis());
    }
}
