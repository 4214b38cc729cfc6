pub mod api;


use api::{posts_from_listing, RedditApiClient};
use mindscan_core::{
    CommunitySnapshot, CoreError, ErrorExt, Post, RedditApiError, RedditConfig, SortMode,
    MAX_POST_LIMIT,
};
use tracing::{info, warn};

/// Where a run's community metadata and posts come from.
///
/// Neither operation fails: an unavailable snapshot is `None` and an unavailable
/// listing is an empty sequence. Callers decide what an empty sequence means.
pub trait ContentSource {
    async fn fetch_community(&self, name: &str) -> Option<CommunitySnapshot>;

    async fn fetch_posts(&self, name: &str, sort: SortMode, limit: u32) -> Vec<Post>;
}

/// Trim a user-entered community name and drop an `r/` prefix.
pub fn normalize_community_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    let trimmed = trimmed
        .strip_prefix("/r/")
        .or_else(|| trimmed.strip_prefix("r/"))
        .unwrap_or(trimmed)
        .trim_matches('/');

    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput {
            message: "Please enter a subreddit name".to_string(),
        });
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(CoreError::InvalidInput {
            message: format!("'{}' is not a valid subreddit name", trimmed),
        });
    }
    Ok(trimmed.to_string())
}

pub fn validate_limit(limit: u32) -> Result<u32, CoreError> {
    if (1..=MAX_POST_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(CoreError::InvalidInput {
            message: format!(
                "Number of posts must be between 1 and {}, got {}",
                MAX_POST_LIMIT, limit
            ),
        })
    }
}

pub struct RedditClient {
    api: RedditApiClient,
}

impl RedditClient {
    pub fn new(config: &RedditConfig) -> Result<Self, CoreError> {
        Ok(Self {
            api: RedditApiClient::new(config)?,
        })
    }

    pub async fn try_fetch_community(&self, name: &str) -> Result<CommunitySnapshot, CoreError> {
        let data = self.api.get_subreddit_info(name).await?;
        Ok(data.into_snapshot(name))
    }

    /// Fetch up to `limit` posts. Zero posts is reported as
    /// [`RedditApiError::NoPosts`] so callers can tell it apart from a transport error.
    pub async fn try_fetch_posts(
        &self,
        name: &str,
        sort: SortMode,
        limit: u32,
    ) -> Result<Vec<Post>, CoreError> {
        let listing = self.api.get_subreddit_posts(name, sort, limit).await?;
        let posts = posts_from_listing(listing, limit as usize, self.api.base_url());
        if posts.is_empty() {
            return Err(RedditApiError::NoPosts {
                subreddit: name.to_string(),
            }
            .into());
        }
        Ok(posts)
    }
}

impl ContentSource for RedditClient {
    async fn fetch_community(&self, name: &str) -> Option<CommunitySnapshot> {
        match self.try_fetch_community(name).await {
            Ok(snapshot) => {
                info!(
                    "r/{} has {} subscribers",
                    snapshot.name, snapshot.subscriber_count
                );
                Some(snapshot)
            }
            Err(e) => {
                warn!("Community metadata for r/{} unavailable", name);
                e.log_warn();
                None
            }
        }
    }

    async fn fetch_posts(&self, name: &str, sort: SortMode, limit: u32) -> Vec<Post> {
        match self.try_fetch_posts(name, sort, limit).await {
            Ok(posts) => posts,
            Err(e) => {
                e.log_warn();
                Vec::new()
            }
        }
    }
}
