use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Inference(e) => {
                error!("Inference error details: {:?}", e);
            }
            CoreError::Export(e) => {
                error!("Export error details: {:?}", e);
            }
            CoreError::Database(e) => {
                error!("Database error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Inference(e) => e.user_friendly_message(),
            CoreError::Export(e) => e.user_friendly_message(),
            CoreError::Database(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { message } => message.clone(),
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API".to_string(),
            CoreError::Inference(_) => "INFERENCE".to_string(),
            CoreError::Export(_) => "EXPORT".to_string(),
            CoreError::Database(_) => "DATABASE".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RedditApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. The community may be private or quarantined.",
                resource
            ),
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("Subreddit '{}' not found or is private.", subreddit)
            }
            RedditApiError::NoPosts { .. } => "No posts found.".to_string(),
            RedditApiError::RequestTimeout => {
                "Request to Reddit timed out. Please try again.".to_string()
            }
            _ => "Failed to fetch posts".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND".to_string(),
            RedditApiError::NoPosts { .. } => "REDDIT_NO_POSTS".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::UnexpectedStatus { .. } => "REDDIT_UNEXPECTED_STATUS".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for InferenceError {
    fn log_error(&self) -> &Self {
        error!("InferenceError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("InferenceError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            InferenceError::ConnectionFailed { endpoint, .. } => format!(
                "Could not reach the sentiment model at {}. Is the service running?",
                endpoint
            ),
            InferenceError::RequestTimeout { .. } => {
                "The sentiment model took too long to answer.".to_string()
            }
            InferenceError::ServiceUnavailable { .. } => {
                "The sentiment model is temporarily unavailable. Please try again later."
                    .to_string()
            }
            _ => "Analysis failed.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            InferenceError::ConnectionFailed { .. } => "INFERENCE_CONNECTION_FAILED".to_string(),
            InferenceError::RequestTimeout { .. } => "INFERENCE_TIMEOUT".to_string(),
            InferenceError::ServiceUnavailable { .. } => "INFERENCE_UNAVAILABLE".to_string(),
            InferenceError::ServiceError { .. } => "INFERENCE_SERVICE_ERROR".to_string(),
            InferenceError::InvalidResponseFormat { .. } => "INFERENCE_INVALID_RESPONSE".to_string(),
            InferenceError::EmptyPrediction => "INFERENCE_EMPTY_PREDICTION".to_string(),
        }
    }
}

impl ErrorExt for ExportError {
    fn log_error(&self) -> &Self {
        error!("ExportError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ExportError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ExportError::MisalignedOutcomes { .. } => {
                "Analysis results do not match the fetched posts. Run the analysis again."
                    .to_string()
            }
            ExportError::RenderFailed { .. } => "Could not create the PDF report.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ExportError::MisalignedOutcomes { .. } => "EXPORT_MISALIGNED".to_string(),
            ExportError::RenderFailed { .. } => "EXPORT_RENDER_FAILED".to_string(),
        }
    }
}

impl ErrorExt for DatabaseError {
    fn log_error(&self) -> &Self {
        error!("DatabaseError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("DatabaseError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            DatabaseError::ConnectionFailed { .. } => {
                "Database connection failed. Please try again.".to_string()
            }
            DatabaseError::InvalidRecord { .. } => {
                "A stored analysis could not be read.".to_string()
            }
            _ => "Database error occurred. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            DatabaseError::ConnectionFailed { .. } => "DB_CONNECTION_FAILED".to_string(),
            DatabaseError::MigrationFailed { .. } => "DB_MIGRATION_FAILED".to_string(),
            DatabaseError::InvalidRecord { .. } => "DB_INVALID_RECORD".to_string(),
            DatabaseError::Sql(_) => "DB_SQL_ERROR".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::MissingField { field } => {
                format!("Required configuration field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            _ => "Configuration error occurred. Please check your settings.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {}", error.error_code());
            info!("User message: {}", error.user_friendly_message());
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
