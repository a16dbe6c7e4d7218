//! Article analysis stages.
//!
//! # Submodules
//!
//! - [`headline`]: rule-based sensationalism scorer plus model commentary
//! - [`credibility`]: source credibility factors from URL and body text
//! - [`content`]: six-field critical analysis of the article body
//! - [`recovery`]: fallback tiers that rebuild the six fields from any reply
//! - [`comparative`]: cross-source comparison with related coverage
//!
//! The scorers are pure. Everything that talks to a model is generic over
//! [`AskAsync`](crate::llm::AskAsync) and degrades to placeholder text
//! instead of returning an error.

pub mod comparative;
pub mod content;
pub mod credibility;
pub mod headline;
pub mod recovery;
