//! In-memory content source and inference service for tests.

use chrono::{TimeZone, Utc};
use inference_client::{InferenceConnector, InferenceService};
use mindscan_core::{
    CommunitySnapshot, CoreError, InferenceError, MediaKind, Post, SortMode,
};
use reddit_client::ContentSource;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn post(id: &str, title: &str, body: &str) -> Post {
    Post {
        id: id.to_string(),
        title: title.to_string(),
        author: format!("author_{}", id),
        created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        body_text: body.to_string(),
        external_url: format!("https://www.reddit.com/r/Anxiety/comments/{}/", id),
        thumbnail_url: None,
        flair: None,
        media_kind: MediaKind::Text,
    }
}

pub fn snapshot(name: &str) -> CommunitySnapshot {
    CommunitySnapshot {
        name: name.to_string(),
        subscriber_count: 1_000,
        description: "Support and discussion".to_string(),
        icon_url: None,
        fetched_at: Utc::now(),
    }
}

pub fn marker_response(label: &str) -> String {
    format!(
        "**🧠 Predicted Sentiment:** {}\n**📊 Confidence:** 0.90\n**🧹 Cleaned text:** sample",
        label
    )
}

/// Answers predictions from a script; `None` entries (or running out) fail the call.
pub struct ScriptedService {
    responses: Mutex<VecDeque<Option<String>>>,
    received: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedService {
    pub fn raw(responses: Vec<Option<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            received: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn new(labels: Vec<Option<String>>) -> Self {
        Self::raw(
            labels
                .into_iter()
                .map(|label| label.map(|l| marker_response(&l)))
                .collect(),
        )
    }

    pub fn labels(labels: &[&str]) -> Self {
        Self::new(labels.iter().map(|l| Some(l.to_string())).collect())
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl InferenceService for ScriptedService {
    async fn predict(&self, text: &str) -> Result<String, CoreError> {
        self.received.lock().unwrap().push(text.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let next = self.responses.lock().unwrap().pop_front().flatten();
        next.ok_or_else(|| {
            InferenceError::ServiceError {
                details: "scripted failure".to_string(),
            }
            .into()
        })
    }
}

pub struct FakeConnector {
    responses: Vec<Option<String>>,
    reachable: bool,
    connects: AtomicUsize,
}

impl FakeConnector {
    pub fn answering(responses: Vec<Option<String>>) -> Self {
        Self {
            responses,
            reachable: true,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn labels(labels: Vec<Option<&str>>) -> Self {
        Self::answering(
            labels
                .into_iter()
                .map(|label| label.map(marker_response))
                .collect(),
        )
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::answering(Vec::new())
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl InferenceConnector for FakeConnector {
    type Session = ScriptedService;

    async fn connect(&self) -> Result<ScriptedService, CoreError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.reachable {
            return Err(InferenceError::ConnectionFailed {
                endpoint: "http://127.0.0.1:7860".to_string(),
                reason: "connection refused".to_string(),
            }
            .into());
        }
        Ok(ScriptedService::raw(self.responses.clone()))
    }
}

pub struct FakeSource {
    snapshot: Option<CommunitySnapshot>,
    posts: Vec<Post>,
    post_requests: Mutex<Vec<(String, SortMode, u32)>>,
}

impl FakeSource {
    pub fn new(snapshot: Option<CommunitySnapshot>, posts: Vec<Post>) -> Self {
        Self {
            snapshot,
            posts,
            post_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn post_requests(&self) -> Vec<(String, SortMode, u32)> {
        self.post_requests.lock().unwrap().clone()
    }
}

impl ContentSource for FakeSource {
    async fn fetch_community(&self, _name: &str) -> Option<CommunitySnapshot> {
        self.snapshot.clone()
    }

    async fn fetch_posts(&self, name: &str, sort: SortMode, limit: u32) -> Vec<Post> {
        self.post_requests
            .lock()
            .unwrap()
            .push((name.to_string(), sort, limit));
        self.posts.iter().take(limit as usize).cloned().collect()
    }
}
