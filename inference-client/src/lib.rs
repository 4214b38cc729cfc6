pub mod events;
pub mod gradio;

pub use gradio::{GradioConnector, GradioSession};

use mindscan_core::CoreError;

/// A remote classifier that turns a text into a free-text prediction blob.
pub trait InferenceService {
    async fn predict(&self, text: &str) -> Result<String, CoreError>;
}

/// Establishes the per-run session that all predictions of that run go through.
pub trait InferenceConnector {
    type Session: InferenceService;

    async fn connect(&self) -> Result<Self::Session, CoreError>;
}
