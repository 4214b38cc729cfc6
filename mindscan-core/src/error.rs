use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Subreddit not found: {subreddit}")]
    SubredditNotFound { subreddit: String },

    #[error("No posts returned for r/{subreddit}")]
    NoPosts { subreddit: String },

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Unexpected status {status_code} from {endpoint}")]
    UnexpectedStatus { status_code: u16, endpoint: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug, Clone)]
pub enum InferenceError {
    #[error("Could not connect to inference service at {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Request timeout for {endpoint}")]
    RequestTimeout { endpoint: String },

    #[error("Inference service returned status {status_code}")]
    ServiceUnavailable { status_code: u16 },

    #[error("Inference service reported an error: {details}")]
    ServiceError { details: String },

    #[error("Invalid response format: {details}")]
    InvalidResponseFormat { details: String },

    #[error("Prediction finished without a result")]
    EmptyPrediction,
}

#[derive(Error, Debug, Clone)]
pub enum ExportError {
    #[error("Post and outcome counts differ: {posts} posts, {outcomes} outcomes")]
    MisalignedOutcomes { posts: usize, outcomes: usize },

    #[error("Document rendering failed: {reason}")]
    RenderFailed { reason: String },
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Migration failed: {migration}")]
    MigrationFailed { migration: String },

    #[error("Stored record is invalid: {details}")]
    InvalidRecord { details: String },

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
