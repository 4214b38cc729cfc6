use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Metadata about the community a run was started against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunitySnapshot {
    pub name: String,
    pub subscriber_count: u64,
    pub description: String,
    pub icon_url: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
    Link,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub body_text: String,
    pub external_url: String,
    pub thumbnail_url: Option<String>,
    pub flair: Option<String>,
    pub media_kind: MediaKind,
}

impl Post {
    /// Text submitted for classification: the body, falling back to the title.
    pub fn analysis_text(&self) -> Option<&str> {
        if !self.body_text.is_empty() {
            Some(&self.body_text)
        } else if !self.title.is_empty() {
            Some(&self.title)
        } else {
            None
        }
    }

    /// Case-insensitive keyword match over title, body, author and flair.
    /// A blank keyword matches every post.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return true;
        }

        [
            Some(self.title.as_str()),
            Some(self.body_text.as_str()),
            Some(self.author.as_str()),
            self.flair.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&keyword))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    New,
    Hot,
    Top,
    Rising,
    Controversial,
}

impl SortMode {
    pub const ALL: [SortMode; 5] = [
        SortMode::New,
        SortMode::Hot,
        SortMode::Top,
        SortMode::Rising,
        SortMode::Controversial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::New => "new",
            SortMode::Hot => "hot",
            SortMode::Top => "top",
            SortMode::Rising => "rising",
            SortMode::Controversial => "controversial",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidInput {
                message: format!(
                    "Unknown sort mode '{}'. Expected one of: new, hot, top, rising, controversial",
                    s
                ),
            })
    }
}

/// The closed taxonomy the sentiment model predicts into, plus `Unknown`.
///
/// Variant order is the display order used for counts and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Suicidal,
    Depression,
    Bipolar,
    Anxiety,
    Stress,
    Normal,
    PersonalityDisorder,
    Unknown,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 8] = [
        SentimentLabel::Suicidal,
        SentimentLabel::Depression,
        SentimentLabel::Bipolar,
        SentimentLabel::Anxiety,
        SentimentLabel::Stress,
        SentimentLabel::Normal,
        SentimentLabel::PersonalityDisorder,
        SentimentLabel::Unknown,
    ];

    /// Labels the model can actually emit.
    pub const PREDICTED: [SentimentLabel; 7] = [
        SentimentLabel::Suicidal,
        SentimentLabel::Depression,
        SentimentLabel::Bipolar,
        SentimentLabel::Anxiety,
        SentimentLabel::Stress,
        SentimentLabel::Normal,
        SentimentLabel::PersonalityDisorder,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            SentimentLabel::Suicidal => "Suicidal",
            SentimentLabel::Depression => "Depression",
            SentimentLabel::Bipolar => "Bipolar",
            SentimentLabel::Anxiety => "Anxiety",
            SentimentLabel::Stress => "Stress",
            SentimentLabel::Normal => "Normal",
            SentimentLabel::PersonalityDisorder => "Personality disorder",
            SentimentLabel::Unknown => "Unknown",
        }
    }

    /// Exact, case-sensitive lookup of a model display name.
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::PREDICTED
            .into_iter()
            .find(|label| label.display_name() == name)
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Per-post result of attempting classification. One exists for every fetched post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceOutcome {
    pub post_id: String,
    pub raw_response: Option<String>,
    pub label: SentimentLabel,
    pub failed: bool,
}

impl InferenceOutcome {
    pub fn classified(post_id: impl Into<String>, raw_response: String, label: SentimentLabel) -> Self {
        Self {
            post_id: post_id.into(),
            raw_response: Some(raw_response),
            label,
            failed: false,
        }
    }

    pub fn failed(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            raw_response: None,
            label: SentimentLabel::Unknown,
            failed: true,
        }
    }

    /// Outcome for a post with neither body nor title; no call is made.
    pub fn no_text(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            raw_response: None,
            label: SentimentLabel::Unknown,
            failed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub counts: BTreeMap<SentimentLabel, usize>,
    pub total_analyzed: usize,
    pub generated_at: DateTime<Utc>,
}

impl AggregateReport {
    pub fn count(&self, label: SentimentLabel) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// `round(count / total * 100)`, or 0 for an empty report. Each label is rounded
    /// independently, so the percentages need not add up to exactly 100.
    pub fn percentage(&self, label: SentimentLabel) -> u32 {
        if self.total_analyzed == 0 {
            return 0;
        }
        (self.count(label) as f64 / self.total_analyzed as f64 * 100.0).round() as u32
    }
}
