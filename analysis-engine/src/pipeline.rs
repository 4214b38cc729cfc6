//! One analysis run: fetch, classify, aggregate.
//!
//! The steps run one after another on the caller's task. Only a missing post
//! listing ends a run early; every other failure degrades to a sentinel value
//! so that a completed run always has one outcome per post and a full report.

use crate::aggregate::aggregate;
use crate::orchestrator::{outcomes_without_service, InferenceOrchestrator};
use inference_client::InferenceConnector;
use mindscan_core::{
    AggregateReport, CommunitySnapshot, CoreError, ErrorExt, InferenceOutcome, Post,
    SentimentLabel, SortMode,
};
use reddit_client::{normalize_community_name, validate_limit, ContentSource};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub community: String,
    pub sort: SortMode,
    pub limit: u32,
}

impl AnalysisRequest {
    pub fn new(community: &str, sort: SortMode, limit: u32) -> Result<Self, CoreError> {
        Ok(Self {
            community: normalize_community_name(community)?,
            sort,
            limit: validate_limit(limit)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub request: AnalysisRequest,
    pub snapshot: Option<CommunitySnapshot>,
    pub posts: Vec<Post>,
    pub outcomes: Vec<InferenceOutcome>,
    pub report: AggregateReport,
}

impl AnalysisRun {
    /// Posts paired with their outcomes, in fetch order.
    pub fn entries(&self) -> impl Iterator<Item = (&Post, &InferenceOutcome)> {
        self.posts.iter().zip(self.outcomes.iter())
    }

    /// Entries whose post matches `keyword`. Filtering is for display only and
    /// never changes the report.
    pub fn filtered<'a>(
        &'a self,
        keyword: &'a str,
    ) -> impl Iterator<Item = (&'a Post, &'a InferenceOutcome)> + 'a {
        self.entries()
            .filter(move |(post, _)| post.matches_keyword(keyword))
    }
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The listing failed or was empty. Nothing from the run is kept.
    NoResults,
    Completed(AnalysisRun),
}

pub async fn run_analysis<C, I>(source: &C, connector: &I, request: AnalysisRequest) -> RunOutcome
where
    C: ContentSource,
    I: InferenceConnector,
{
    info!(
        "Starting analysis of r/{} ({}, limit {})",
        request.community, request.sort, request.limit
    );

    let snapshot = source.fetch_community(&request.community).await;
    if snapshot.is_none() {
        info!("Continuing without community metadata");
    }

    let posts = source
        .fetch_posts(&request.community, request.sort, request.limit)
        .await;
    if posts.is_empty() {
        warn!("No posts found for r/{}", request.community);
        return RunOutcome::NoResults;
    }
    info!("Fetched {} posts", posts.len());

    let outcomes = match connector.connect().await {
        Ok(session) => InferenceOrchestrator::new(&session).classify(&posts).await,
        Err(e) => {
            e.log_error();
            warn!(
                "Inference service unavailable; {} posts left unclassified",
                posts.len()
            );
            outcomes_without_service(&posts)
        }
    };

    let report = aggregate(&outcomes);
    info!(
        "Analysis of r/{} complete: {} posts, {} unknown",
        request.community,
        report.total_analyzed,
        report.count(SentimentLabel::Unknown)
    );

    RunOutcome::Completed(AnalysisRun {
        request,
        snapshot,
        posts,
        outcomes,
        report,
    })
}
