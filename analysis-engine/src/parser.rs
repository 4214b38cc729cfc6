//! Reading labels out of the model's free-text answers.
//!
//! The model replies with a small markdown blob. One line carries the
//! prediction, e.g. `**🧠 Predicted Sentiment:** Anxiety`; the rest is
//! confidence figures and an echo of the cleaned input.

use mindscan_core::{InferenceOutcome, SentimentLabel};
use once_cell::sync::Lazy;
use regex::Regex;

static PREDICTED_SENTIMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*🧠 Predicted Sentiment:\*\* ([^\n]+)")
        .expect("predicted sentiment pattern is valid")
});

static NOISE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)cleaned text").expect("noise pattern is valid"));

pub const ANALYSIS_FAILED_TEXT: &str = "Analysis failed.";
pub const NO_TEXT_TEXT: &str = "No text to analyze.";

/// Label named by the first prediction marker in `raw`.
///
/// Never fails: a missing marker, or a value that is not exactly one of the
/// model's display names, yields [`SentimentLabel::Unknown`].
pub fn parse_label(raw: &str) -> SentimentLabel {
    PREDICTED_SENTIMENT
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|value| SentimentLabel::from_display_name(value.as_str()))
        .unwrap_or(SentimentLabel::Unknown)
}

/// Display form of a raw answer: noise lines dropped, emphasis removed,
/// leading indentation trimmed from every line.
pub fn sanitize(raw: &str) -> String {
    raw.split('\n')
        .filter(|line| !NOISE_LINE.is_match(line))
        .map(|line| line.replace('*', ""))
        .map(|line| line.trim_start().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable text shown next to a post.
pub fn display_text(outcome: &InferenceOutcome) -> String {
    match (&outcome.raw_response, outcome.failed) {
        (Some(raw), _) => sanitize(raw),
        (None, true) => ANALYSIS_FAILED_TEXT.to_string(),
        (None, false) => NO_TEXT_TEXT.to_string(),
    }
}
