use chrono::{TimeZone, Utc};
use mindscan_core::{
    CommunitySnapshot, CoreError, MediaKind, Post, RedditApiError, RedditConfig, SortMode,
};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    #[serde(default)]
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    #[serde(default = "Vec::new")]
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    #[serde(default)]
    pub kind: String,
    pub data: T,
}

/// Post fields as the listing endpoint returns them. Everything is optional;
/// deleted and link posts routinely omit fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditPostData {
    pub id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub selftext: Option<String>,
    pub author: Option<String>,
    pub created_utc: f64,
    pub url: Option<String>,
    pub permalink: Option<String>,
    pub thumbnail: Option<String>,
    pub link_flair_text: Option<String>,
    pub is_video: bool,
    pub post_hint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditSubredditData {
    pub display_name: Option<String>,
    pub public_description: Option<String>,
    pub subscribers: Option<u64>,
    pub icon_img: Option<String>,
}

impl RedditPostData {
    fn media_kind(&self) -> MediaKind {
        if self.is_video {
            return MediaKind::Video;
        }
        match self.post_hint.as_deref() {
            Some("image") => MediaKind::Image,
            Some("link") => MediaKind::Link,
            _ => MediaKind::Text,
        }
    }

    /// Convert into a [`Post`]. `index` is the position in the batch and becomes the
    /// id when the listing carries neither `id` nor `name`, or repeats an id. If that
    /// index is itself already taken, a `-N` suffix is added.
    pub fn into_post(self, index: usize, base_url: &str, seen: &mut HashSet<String>) -> Post {
        let media_kind = self.media_kind();

        let id = [self.id.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.is_empty())
            .map(str::to_string)
            .filter(|candidate| !seen.contains(candidate))
            .unwrap_or_else(|| fallback_id(index, seen));
        seen.insert(id.clone());

        let external_url = match (self.url, self.permalink) {
            (Some(url), _) if !url.is_empty() => url,
            (_, Some(permalink)) => format!("{}{}", base_url.trim_end_matches('/'), permalink),
            _ => String::new(),
        };

        let created_at = Utc
            .timestamp_opt(self.created_utc as i64, 0)
            .single()
            .unwrap_or_default();

        Post {
            id,
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            created_at,
            body_text: self.selftext.unwrap_or_default(),
            external_url,
            thumbnail_url: self.thumbnail.filter(|thumb| thumb.starts_with("http")),
            flair: self.link_flair_text.filter(|flair| !flair.is_empty()),
            media_kind,
        }
    }
}

fn fallback_id(index: usize, seen: &HashSet<String>) -> String {
    let base = index.to_string();
    if !seen.contains(&base) {
        return base;
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !seen.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

impl RedditSubredditData {
    pub fn into_snapshot(self, requested_name: &str) -> CommunitySnapshot {
        CommunitySnapshot {
            name: self
                .display_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| requested_name.to_string()),
            subscriber_count: self.subscribers.unwrap_or(0),
            description: self.public_description.unwrap_or_default(),
            icon_url: self.icon_img.filter(|icon| !icon.is_empty()),
            fetched_at: Utc::now(),
        }
    }
}

/// Turn a listing into at most `limit` posts, keeping listing order.
pub fn posts_from_listing(
    listing: RedditListing<RedditPostData>,
    limit: usize,
    base_url: &str,
) -> Vec<Post> {
    let mut seen = HashSet::with_capacity(limit);
    listing
        .data
        .children
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, child)| child.data.into_post(index, base_url, &mut seen))
        .collect()
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    base_url: String,
    cors_relay: String,
}

impl RedditApiClient {
    pub fn new(config: &RedditConfig) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cors_relay: config.cors_relay.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `endpoint`, routed through the relay when one is configured.
    /// The relay takes the target URL verbatim after its prefix.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}{}", self.cors_relay, self.base_url, endpoint)
    }

    async fn get(&self, endpoint: &str) -> Result<Response, CoreError> {
        let url = self.endpoint_url(endpoint);
        debug!("Making Reddit request: GET {}", url);

        let response = match self.http_client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for GET {}: {}", endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let err = match status.as_u16() {
            403 => RedditApiError::Forbidden {
                resource: endpoint.to_string(),
            },
            404 => RedditApiError::SubredditNotFound {
                subreddit: endpoint.to_string(),
            },
            code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
            code => RedditApiError::UnexpectedStatus {
                status_code: code,
                endpoint: endpoint.to_string(),
            },
        };
        Err(CoreError::RedditApi(err))
    }

    pub async fn get_subreddit_info(
        &self,
        subreddit: &str,
    ) -> Result<RedditSubredditData, CoreError> {
        let endpoint = format!("/r/{}/about.json", subreddit);
        let response = self.get(&endpoint).await?;

        let about: RedditListingChild<RedditSubredditData> =
            response.json().await.map_err(|e| {
                error!("Failed to parse subreddit info: {}", e);
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse info for r/{}", subreddit),
                })
            })?;

        debug!("Retrieved info for r/{}", subreddit);
        Ok(about.data)
    }

    pub async fn get_subreddit_posts(
        &self,
        subreddit: &str,
        sort: SortMode,
        limit: u32,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/{}.json?limit={}", subreddit, sort, limit);
        let response = self.get(&endpoint).await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} posts from r/{} ({})",
            listing.data.children.len(),
            subreddit,
            sort
        );
        Ok(listing)
    }
}
