use crate::events::parse_event_stream;
use crate::{InferenceConnector, InferenceService};
use mindscan_core::{CoreError, InferenceConfig, InferenceError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Default, Deserialize)]
struct AppConfigResponse {
    #[serde(default)]
    api_prefix: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    data: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct QueuedEvent {
    event_id: String,
}

/// Join endpoint, optional API prefix and endpoint name into the queue URL.
fn call_url(endpoint: &str, api_prefix: Option<&str>, api_name: &str) -> String {
    let prefix = api_prefix
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .map(|p| format!("/{}", p))
        .unwrap_or_default();
    format!(
        "{}{}/call/{}",
        endpoint.trim_end_matches('/'),
        prefix,
        api_name.trim_matches('/')
    )
}

fn map_transport_error(endpoint: &str, e: reqwest::Error) -> InferenceError {
    if e.is_timeout() {
        InferenceError::RequestTimeout {
            endpoint: endpoint.to_string(),
        }
    } else {
        InferenceError::ConnectionFailed {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }
    }
}

/// Opens sessions against a hosted Gradio app.
#[derive(Debug, Clone)]
pub struct GradioConnector {
    http_client: Client,
    endpoint: String,
    api_name: String,
}

impl GradioConnector {
    pub fn new(config: &InferenceConfig) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_name: config.api_name.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl InferenceConnector for GradioConnector {
    type Session = GradioSession;

    async fn connect(&self) -> Result<GradioSession, CoreError> {
        let config_url = format!("{}/config", self.endpoint);
        debug!("Connecting to inference service: GET {}", config_url);

        let response = self
            .http_client
            .get(&config_url)
            .send()
            .await
            .map_err(|e| map_transport_error(&self.endpoint, e))?;

        if !response.status().is_success() {
            return Err(InferenceError::ConnectionFailed {
                endpoint: self.endpoint.clone(),
                reason: format!("config request returned {}", response.status()),
            }
            .into());
        }

        let app_config: AppConfigResponse =
            response
                .json()
                .await
                .map_err(|e| InferenceError::InvalidResponseFormat {
                    details: format!("config is not valid JSON: {}", e),
                })?;

        info!(
            "Connected to inference service at {} (gradio {})",
            self.endpoint,
            app_config.version.as_deref().unwrap_or("unknown")
        );

        Ok(GradioSession {
            http_client: self.http_client.clone(),
            endpoint: self.endpoint.clone(),
            call_url: call_url(
                &self.endpoint,
                app_config.api_prefix.as_deref(),
                &self.api_name,
            ),
        })
    }
}

/// A connected session. Predictions are queued and then read back as an event stream.
#[derive(Debug, Clone)]
pub struct GradioSession {
    http_client: Client,
    endpoint: String,
    call_url: String,
}

impl GradioSession {
    async fn enqueue(&self, text: &str) -> Result<String, InferenceError> {
        let response = self
            .http_client
            .post(&self.call_url)
            .json(&PredictRequest { data: [text] })
            .send()
            .await
            .map_err(|e| map_transport_error(&self.endpoint, e))?;

        if !response.status().is_success() {
            return Err(InferenceError::ServiceUnavailable {
                status_code: response.status().as_u16(),
            });
        }

        let queued: QueuedEvent =
            response
                .json()
                .await
                .map_err(|e| InferenceError::InvalidResponseFormat {
                    details: format!("missing event id: {}", e),
                })?;
        Ok(queued.event_id)
    }

    async fn await_result(&self, event_id: &str) -> Result<String, InferenceError> {
        let result_url = format!("{}/{}", self.call_url, event_id);
        let response = self
            .http_client
            .get(&result_url)
            .send()
            .await
            .map_err(|e| map_transport_error(&self.endpoint, e))?;

        if !response.status().is_success() {
            return Err(InferenceError::ServiceUnavailable {
                status_code: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(&self.endpoint, e))?;
        parse_event_stream(&body)
    }
}

impl InferenceService for GradioSession {
    async fn predict(&self, text: &str) -> Result<String, CoreError> {
        let event_id = self.enqueue(text).await?;
        debug!("Prediction queued as {}", event_id);
        Ok(self.await_result(&event_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_url_without_prefix() {
        assert_eq!(
            call_url("https://abc.gradio.live/", None, "predict"),
            "https://abc.gradio.live/call/predict"
        );
        assert_eq!(
            call_url("https://abc.gradio.live", Some(""), "/predict"),
            "https://abc.gradio.live/call/predict"
        );
    }

    #[test]
    fn test_call_url_with_prefix() {
        assert_eq!(
            call_url("http://127.0.0.1:7860", Some("/gradio_api"), "predict"),
            "http://127.0.0.1:7860/gradio_api/call/predict"
        );
        assert_eq!(
            call_url("http://127.0.0.1:7860", Some("gradio_api/"), "predict"),
            "http://127.0.0.1:7860/gradio_api/call/predict"
        );
    }

    #[test]
    fn test_predict_request_shape() {
        let body = serde_json::to_value(PredictRequest { data: ["I feel fine"] }).unwrap();
        assert_eq!(body, serde_json::json!({ "data": ["I feel fine"] }));
    }

    #[test]
    fn test_config_response_tolerates_missing_fields() {
        let config: AppConfigResponse = serde_json::from_str(r#"{"mode": "interface"}"#).unwrap();
        assert!(config.api_prefix.is_none());

        let config: AppConfigResponse =
            serde_json::from_str(r#"{"api_prefix": "/gradio_api", "version": "5.1.0"}"#).unwrap();
        assert_eq!(config.api_prefix.as_deref(), Some("/gradio_api"));
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_service() {
        let connector = GradioConnector::new(&InferenceConfig {
            endpoint: "http://127.0.0.1:9/".to_string(),
            timeout_secs: 2,
            ..InferenceConfig::default()
        })
        .unwrap();
        assert_eq!(connector.endpoint(), "http://127.0.0.1:9");

        let result = connector.connect().await;
        assert!(matches!(
            result,
            Err(CoreError::Inference(InferenceError::ConnectionFailed { .. }))
                | Err(CoreError::Inference(InferenceError::RequestTimeout { .. }))
        ));
    }
}
