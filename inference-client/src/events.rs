//! Result stream parsing for queued predictions.
//!
//! A finished prediction is delivered as server-sent events. Only two events
//! matter: `complete`, whose data is a JSON array of outputs, and `error`.

use mindscan_core::InferenceError;
use serde_json::Value;

pub fn parse_event_stream(body: &str) -> Result<String, InferenceError> {
    let mut event: Option<&str> = None;

    for line in body.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event = Some(name.trim());
            continue;
        }

        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        match event {
            Some("complete") => return first_output(data.trim()),
            Some("error") => {
                return Err(InferenceError::ServiceError {
                    details: data.trim().to_string(),
                })
            }
            _ => {}
        }
    }

    Err(InferenceError::EmptyPrediction)
}

/// The model has a single text output; it is the first element of the array.
fn first_output(data: &str) -> Result<String, InferenceError> {
    let value: Value =
        serde_json::from_str(data).map_err(|e| InferenceError::InvalidResponseFormat {
            details: format!("complete event is not JSON: {}", e),
        })?;

    match value {
        Value::Array(outputs) => match outputs.into_iter().next() {
            Some(Value::String(text)) => Ok(text),
            Some(Value::Null) | None => Err(InferenceError::EmptyPrediction),
            Some(other) => Ok(other.to_string()),
        },
        Value::String(text) => Ok(text),
        other => Err(InferenceError::InvalidResponseFormat {
            details: format!("unexpected payload: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_event() {
        let body = "event: generating\ndata: null\n\n\
                    event: complete\n\
                    data: [\"**🧠 Predicted Sentiment:** Anxiety\\n**Confidence:** 0.91\"]\n\n";
        let text = parse_event_stream(body).unwrap();
        assert_eq!(
            text,
            "**🧠 Predicted Sentiment:** Anxiety\n**Confidence:** 0.91"
        );
    }

    #[test]
    fn test_heartbeats_are_skipped() {
        let body = "event: heartbeat\ndata: null\n\nevent: heartbeat\ndata: null\n\n\
                    event: complete\ndata: [\"Normal\"]\n\n";
        assert_eq!(parse_event_stream(body).unwrap(), "Normal");
    }

    #[test]
    fn test_error_event() {
        let body = "event: error\ndata: \"CUDA out of memory\"\n\n";
        let err = parse_event_stream(body).unwrap_err();
        assert!(matches!(err, InferenceError::ServiceError { details } if details.contains("CUDA")));
    }

    #[test]
    fn test_stream_without_result() {
        assert!(matches!(
            parse_event_stream(""),
            Err(InferenceError::EmptyPrediction)
        ));
        assert!(matches!(
            parse_event_stream("event: complete\ndata: []\n\n"),
            Err(InferenceError::EmptyPrediction)
        ));
    }

    #[test]
    fn test_malformed_complete_payload() {
        let err = parse_event_stream("event: complete\ndata: [unterminated\n\n").unwrap_err();
        assert!(matches!(err, InferenceError::InvalidResponseFormat { .. }));
    }

    #[test]
    fn test_non_string_output_is_stringified() {
        let body = "event: complete\ndata: [{\"label\": \"Stress\"}]\n\n";
        assert_eq!(parse_event_stream(body).unwrap(), r#"{"label":"Stress"}"#);
    }
}
