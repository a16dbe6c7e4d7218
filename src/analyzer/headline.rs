//! Headline sensationalism scoring.
//!
//! [`score_headline`] is a pure rule-based scorer; [`analyze_headline`] adds
//! an optional model commentary on top of it.
//!
//! # Rules
//!
//! | Rule | Match | Points |
//! |------|-------|--------|
//! | Clickbait phrase | substring | +20 each, at most 3 |
//! | Emotional word | whole word | +15 each, at most 3 |
//! | Question | trailing `?` or leading interrogative | +10 |
//! | Leading digit | first character | +10 |
//! | Superlative | whole word | +15 |
//! | News marker | substring | +5 |
//! | Length | more than 70 characters | +5 |
//! | All-caps word | longer than 2 characters | +5 |
//! | Morbid term | substring | +25 |
//! | "mom" | substring, title without "moment" | +15 |
//!
//! The total is capped at 100.

use crate::llm::{AskAsync, FallbackPolicy, ask_with_fallback};
use crate::models::{HeadlineAnalysis, HeadlineScore};
use tracing::{debug, info, instrument};

const CLICKBAIT_PHRASES: &[&str] = &[
    "you won't believe",
    "shocking",
    "mind blowing",
    "amazing",
    "jaw-dropping",
    "unbelievable",
    "incredible",
    "insane",
    "stunning",
    "never seen before",
    "secret",
    "hack",
    "trick",
    "they don't want you to know",
    "this one trick",
    "miracle",
    "breakthrough",
    "life changing",
    "game changing",
    "must see",
    "warning",
    "attention",
];

const EMOTIONAL_WORDS: &[&str] = &[
    "shocking",
    "explosive",
    "incredible",
    "devastating",
    "terrifying",
    "catastrophic",
    "horrifying",
    "amazing",
    "unbelievable",
    "extraordinary",
    "outrageous",
    "sensational",
    "scandalous",
    "bombshell",
    "staggering",
    "dramatic",
    "alarming",
    "jaw-dropping",
];

const INTERROGATIVES: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "is", "are", "can", "will", "should", "would",
    "could", "do", "does",
];

const SUPERLATIVES: &[&str] = &[
    "best",
    "worst",
    "most",
    "biggest",
    "greatest",
    "easiest",
    "deadliest",
    "highest",
    "lowest",
];

const NEWS_MARKERS: &[&str] = &["news", "breaking", "report", "exclusive"];

const MORBID_TERMS: &[&str] = &["serial killer", "murder", "kill", "dead", "death"];

const MAX_COUNTED_MATCHES: usize = 3;
const LONG_TITLE_CHARS: usize = 70;

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Lower-cased words of `title` for lexicon lookup.
///
/// Apostrophes and hyphens stay inside words ("won't", "jaw-dropping"), but
/// quote marks around a word and a trailing `'s` / `'re` are dropped.
fn words(lower: &str) -> Vec<&str> {
    lower
        .split(|c: char| !(c.is_alphanumeric() || is_apostrophe(c) || c == '-'))
        .map(|w| w.trim_matches(|c: char| is_apostrophe(c) || c == '-'))
        .map(|w| {
            ["'s", "\u{2019}s", "'re", "\u{2019}re"]
                .iter()
                .find_map(|suffix| w.strip_suffix(suffix))
                .filter(|stem| !stem.is_empty())
                .unwrap_or(w)
        })
        .filter(|w| !w.is_empty())
        .collect()
}

fn is_all_caps(word: &str) -> bool {
    word.chars().count() > 2
        && word.chars().any(char::is_uppercase)
        && !word.chars().any(char::is_lowercase)
}

struct Tally {
    score: u32,
    indicators: Vec<String>,
}

impl Tally {
    fn hit(&mut self, points: u32, indicator: String) {
        self.score += points;
        self.indicators.push(indicator);
    }
}

/// Score a headline for sensationalism.
///
/// Deterministic, no I/O. Every rule that adds points also adds exactly one
/// indicator, so `indicators` is empty exactly when `score` is 0.
///
/// # Arguments
///
/// * `title` - The headline as scraped; quotes and possessives are tolerated
///
/// # Returns
///
/// A [`HeadlineScore`] capped at 100 with one indicator per rule that fired.
pub fn score_headline(title: &str) -> HeadlineScore {
    let title = title.trim();
    if title.is_empty() {
        return HeadlineScore::default();
    }

    let lower = title.to_lowercase();
    let tokens = words(&lower);
    let has_word = |w: &str| tokens.contains(&w);
    let mut tally = Tally {
        score: 0,
        indicators: Vec::new(),
    };

    let clickbait: Vec<&str> = CLICKBAIT_PHRASES
        .iter()
        .copied()
        .filter(|p| lower.contains(p))
        .collect();
    if !clickbait.is_empty() {
        tally.hit(
            20 * clickbait.len().min(MAX_COUNTED_MATCHES) as u32,
            format!("Uses clickbait phrases: {}", clickbait.join(", ")),
        );
    }

    let emotional: Vec<&str> = EMOTIONAL_WORDS.iter().copied().filter(|w| has_word(w)).collect();
    if !emotional.is_empty() {
        tally.hit(
            15 * emotional.len().min(MAX_COUNTED_MATCHES) as u32,
            format!("Uses emotional language: {}", emotional.join(", ")),
        );
    }

    let opens_with_interrogative = tokens
        .first()
        .is_some_and(|first| INTERROGATIVES.contains(first));
    if title.ends_with('?') || opens_with_interrogative {
        tally.hit(
            10,
            "Headline poses a question (often used to create curiosity)".to_string(),
        );
    }

    if title.starts_with(|c: char| c.is_ascii_digit()) {
        tally.hit(
            10,
            "Headline starts with a number (common clickbait format)".to_string(),
        );
    }

    let superlatives: Vec<&str> = SUPERLATIVES.iter().copied().filter(|w| has_word(w)).collect();
    if !superlatives.is_empty() {
        tally.hit(
            15,
            format!("Uses superlatives: {}", superlatives.join(", ")),
        );
    }

    let markers: Vec<&str> = NEWS_MARKERS
        .iter()
        .copied()
        .filter(|m| lower.contains(m))
        .collect();
    if !markers.is_empty() {
        tally.hit(5, format!("Uses generic news markers: {}", markers.join(", ")));
    }

    let length = title.chars().count();
    if length > LONG_TITLE_CHARS {
        tally.hit(
            5,
            format!("Headline is unusually long ({length} characters)"),
        );
    }

    let caps: Vec<&str> = title.split_whitespace().filter(|w| is_all_caps(w)).collect();
    if !caps.is_empty() {
        tally.hit(5, format!("Uses all-caps words: {}", caps.join(", ")));
    }

    let morbid: Vec<&str> = MORBID_TERMS
        .iter()
        .copied()
        .filter(|t| lower.contains(t))
        .collect();
    if !morbid.is_empty() {
        tally.hit(
            25,
            format!(
                "Uses morbid/shocking terminology to grab attention: {}",
                morbid.join(", ")
            ),
        );
    }

    if lower.contains("mom") && !lower.contains("moment") {
        tally.hit(
            15,
            "Uses 'mom' in headline (common clickbait approach to create relatability)"
                .to_string(),
        );
    }

    let score = tally.score.min(100) as u8;
    debug!(%title, score, indicators = tally.indicators.len(), "Scored headline");
    HeadlineScore {
        score,
        indicators: tally.indicators,
    }
}

fn headline_prompt(title: &str) -> String {
    format!(
        r#"Analyze this news headline for sensationalism, clickbait tactics, and framing choices:

"{title}"

Please provide:
1. An objective assessment of whether the headline appears sensationalist or clickbaity
2. Analysis of specific language choices and framing
3. How the headline might set reader expectations
4. Suggestions for a more neutral version of the headline

Keep your analysis concise but insightful."#
    )
}

/// Score the headline and ask the model for a short commentary on it.
///
/// The score never depends on the model. When every model fails the
/// commentary is an explicit "unavailable" note.
#[instrument(level = "info", skip_all)]
pub async fn analyze_headline<A: AskAsync>(
    client: &A,
    policy: &FallbackPolicy,
    title: &str,
) -> HeadlineAnalysis {
    let score = score_headline(title);
    info!(score = score.score, indicators = ?score.indicators, "Headline scored");

    if title.trim().is_empty() {
        return HeadlineAnalysis {
            score,
            commentary: Some("No headline available for analysis".to_string()),
        };
    }

    let commentary = match ask_with_fallback(client, policy, &headline_prompt(title)).await {
        Some(reply) => reply.text.trim().to_string(),
        None => "Headline commentary unavailable: every configured model failed.".to_string(),
    };
    HeadlineAnalysis {
        score,
        commentary: Some(commentary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelError;
    use std::time::Duration;

    #[test]
    fn test_empty_title() {
        let s = score_headline("");
        assert_eq!(s.score, 0);
        assert!(s.indicators.is_empty());
        assert_eq!(score_headline("   ").score, 0);
    }

    #[test]
    fn test_question_only() {
        let s = score_headline("What time is it?");
        assert_eq!(s.score, 10);
        assert_eq!(s.indicators.len(), 1);
        assert!(s.indicators[0].contains("question"));
    }

    #[test]
    fn test_breaking_shocking_secret() {
        let s = score_headline("BREAKING: You Won't Believe This Shocking Secret!");
        // clickbait 3 * 20, emotional 15, news marker 5, all caps 5
        assert_eq!(s.score, 85);
        assert!(s.score > 50);
        assert_eq!(s.indicators.len(), 4);
        assert!(s.indicators[0].starts_with("Uses clickbait phrases"));
        assert!(s.indicators[0].contains("you won't believe"));
        assert!(s.indicators[1].starts_with("Uses emotional language: shocking"));
        assert!(s.indicators[2].contains("breaking"));
        assert!(s.indicators[3].contains("BREAKING:"));
    }

    #[test]
    fn test_clickbait_contribution_is_capped() {
        // secret, hack, trick, warning: four phrases, nothing else fires
        let s = score_headline("Warning: secret hack and trick");
        assert_eq!(s.score, 60);
        assert_eq!(s.indicators.len(), 1);
        assert!(s.indicators[0].contains("warning"));
    }

    #[test]
    fn test_emotional_words_need_word_boundaries() {
        // "dramatically" must not count as "dramatic"
        let s = score_headline("Prices rose dramatically");
        assert_eq!(s.score, 0);
        let s = score_headline("Prices rose in a dramatic fashion");
        assert_eq!(s.score, 15);
    }

    #[test]
    fn test_emotional_contribution_is_capped() {
        let s = score_headline("explosive devastating terrifying catastrophic");
        assert_eq!(s.score, 45);
    }

    #[test]
    fn test_leading_number() {
        let s = score_headline("7 ways to save on groceries");
        assert_eq!(s.score, 10);
    }

    #[test]
    fn test_interrogative_must_be_a_word() {
        assert_eq!(score_headline("Island council approves budget").score, 0);
        assert_eq!(score_headline("Is the council approving budgets").score, 10);
    }

    #[test]
    fn test_quoted_emotional_word() {
        let s = score_headline("Officials call flood 'catastrophic'");
        assert_eq!(s.score, 15);
        assert_eq!(
            s.indicators,
            vec!["Uses emotional language: catastrophic".to_string()]
        );
        assert_eq!(score_headline("Officials call flood \u{2018}catastrophic\u{2019}").score, 15);
    }

    #[test]
    fn test_contracted_interrogative() {
        assert_eq!(score_headline("Who's behind the council vote").score, 10);
        assert_eq!(score_headline("Who\u{2019}s behind the council vote").score, 10);
        assert_eq!(score_headline("What's the 'best' plan").score, 25);
    }

    #[test]
    fn test_inner_apostrophes_and_hyphens_kept() {
        assert_eq!(words("you won't believe it"), vec!["you", "won't", "believe", "it"]);
        assert_eq!(words("a jaw-dropping 'shocking' day"), vec!["a", "jaw-dropping", "shocking", "day"]);
        assert_eq!(words("the mayor's plan"), vec!["the", "mayor", "plan"]);
    }

    #[test]
    fn test_superlative() {
        let s = score_headline("The biggest storm this year");
        assert_eq!(s.score, 15);
        assert_eq!(s.indicators, vec!["Uses superlatives: biggest".to_string()]);
    }

    #[test]
    fn test_long_title() {
        let title = "Council members met on Tuesday to discuss a range of local zoning matters";
        assert!(title.chars().count() > 70);
        let s = score_headline(title);
        assert_eq!(s.score, 5);
        assert!(s.indicators[0].contains("long"));
    }

    #[test]
    fn test_morbid_terms() {
        let s = score_headline("Police investigate murder downtown");
        assert_eq!(s.score, 25);
    }

    #[test]
    fn test_mom_but_not_moment() {
        assert_eq!(score_headline("Local mom wins award").score, 15);
        assert_eq!(score_headline("A quiet moment for mom").score, 0);
    }

    #[test]
    fn test_short_caps_words_ignored() {
        assert_eq!(score_headline("US and UK sign accord").score, 0);
        assert_eq!(score_headline("NASA launches probe").score, 5);
    }

    #[test]
    fn test_score_is_capped_at_100() {
        let s = score_headline(
            "BREAKING NEWS: 10 shocking, explosive secrets about the deadliest murder mom case you won't believe?",
        );
        assert_eq!(s.score, 100);
        assert!(s.indicators.len() >= 8);
    }

    #[test]
    fn test_indicators_mirror_score() {
        for title in [
            "Ordinary council meeting",
            "What happened?",
            "EXCLUSIVE report on the best schools",
            "5 stunning photos",
        ] {
            let s = score_headline(title);
            assert!(s.score <= 100);
            assert_eq!(s.score == 0, s.indicators.is_empty(), "{title}");
        }
    }

    struct Unavailable;

    impl AskAsync for Unavailable {
        async fn ask(&self, _model: &str, _prompt: &str) -> Result<String, ModelError> {
            Err(ModelError::EmptyReply)
        }
    }

    struct Echo;

    impl AskAsync for Echo {
        async fn ask(&self, _model: &str, prompt: &str) -> Result<String, ModelError> {
            Ok(format!("  commentary for {} chars  ", prompt.len()))
        }
    }

    fn policy() -> FallbackPolicy {
        FallbackPolicy {
            models: vec!["m".to_string()],
            max_retries: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_analyze_headline_with_commentary() {
        let a = analyze_headline(&Echo, &policy(), "What time is it?").await;
        assert_eq!(a.score.score, 10);
        assert!(a.commentary.unwrap().starts_with("commentary for"));
    }

    #[tokio::test]
    async fn test_analyze_headline_model_failure_keeps_score() {
        let a = analyze_headline(&Unavailable, &policy(), "Local mom wins award").await;
        assert_eq!(a.score.score, 15);
        assert!(a.commentary.unwrap().contains("unavailable"));
    }
}
