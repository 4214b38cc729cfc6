use crate::parser::parse_label;
use inference_client::InferenceService;
use mindscan_core::{ErrorExt, InferenceOutcome, Post};
use tracing::{debug, info, warn};

/// Classifies posts one at a time through a single inference session.
///
/// Calls are strictly sequential: the next request is only sent once the
/// previous one has finished. The hosted model serves one session and
/// concurrent requests against it are not supported.
pub struct InferenceOrchestrator<'a, S> {
    service: &'a S,
}

impl<'a, S: InferenceService> InferenceOrchestrator<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// One outcome per post, in input order. A failed call only affects its own post.
    pub async fn classify(&self, posts: &[Post]) -> Vec<InferenceOutcome> {
        let mut outcomes = Vec::with_capacity(posts.len());

        for (index, post) in posts.iter().enumerate() {
            let Some(text) = post.analysis_text() else {
                debug!("Post {} has no text to analyze", post.id);
                outcomes.push(InferenceOutcome::no_text(&post.id));
                continue;
            };

            let outcome = match self.service.predict(text).await {
                Ok(raw) => {
                    let label = parse_label(&raw);
                    debug!("Post {} classified as {}", post.id, label);
                    InferenceOutcome::classified(&post.id, raw, label)
                }
                Err(e) => {
                    warn!("Classification of post {} failed", post.id);
                    e.log_warn();
                    InferenceOutcome::failed(&post.id)
                }
            };
            outcomes.push(outcome);

            info!("Analyzed {}/{} posts", index + 1, posts.len());
        }

        outcomes
    }
}

/// Outcomes for a run whose inference session could not be opened: posts
/// with text are failed, posts without text are recorded as having none.
pub fn outcomes_without_service(posts: &[Post]) -> Vec<InferenceOutcome> {
    posts
        .iter()
        .map(|post| match post.analysis_text() {
            Some(_) => InferenceOutcome::failed(&post.id),
            None => InferenceOutcome::no_text(&post.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{post, ScriptedService};
    use mindscan_core::SentimentLabel;

    #[tokio::test]
    async fn test_outcomes_align_with_posts() {
        let posts: Vec<Post> = (0..6)
            .map(|i| post(&format!("p{}", i), "title", &format!("body {}", i)))
            .collect();
        let service = ScriptedService::labels(&["Normal", "Stress", "Normal", "Bipolar", "Normal", "Depression"]);

        let outcomes = InferenceOrchestrator::new(&service).classify(&posts).await;

        assert_eq!(outcomes.len(), posts.len());
        for (post, outcome) in posts.iter().zip(&outcomes) {
            assert_eq!(outcome.post_id, post.id);
        }
        assert_eq!(outcomes[1].label, SentimentLabel::Stress);
        assert_eq!(outcomes[5].label, SentimentLabel::Depression);
    }

    #[tokio::test]
    async fn test_calls_are_sequential_and_use_body_first() {
        let posts = vec![
            post("a", "Title A", "Body A"),
            post("b", "Title B", ""),
            post("c", "Title C", "Body C"),
        ];
        let service = ScriptedService::labels(&["Normal", "Normal", "Normal"]);

        InferenceOrchestrator::new(&service).classify(&posts).await;

        assert_eq!(service.received(), vec!["Body A", "Title B", "Body C"]);
        assert_eq!(service.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let posts = vec![
            post("1", "First", "I keep panicking before meetings"),
            post("2", "Second", "Nothing feels real"),
            post("3", "Third", "Had a good day today"),
        ];
        let service = ScriptedService::new(vec![
            Some("Anxiety".to_string()),
            None,
            Some("Normal".to_string()),
        ]);

        let outcomes = InferenceOrchestrator::new(&service).classify(&posts).await;

        assert_eq!(outcomes[0].label, SentimentLabel::Anxiety);
        assert!(!outcomes[0].failed);

        assert_eq!(outcomes[1].label, SentimentLabel::Unknown);
        assert!(outcomes[1].failed);
        assert!(outcomes[1].raw_response.is_none());

        assert_eq!(outcomes[2].label, SentimentLabel::Normal);
        assert_eq!(service.received().len(), 3);
    }

    #[tokio::test]
    async fn test_post_without_text_is_not_sent() {
        let posts = vec![post("empty", "", ""), post("full", "Title", "")];
        let service = ScriptedService::labels(&["Stress"]);

        let outcomes = InferenceOrchestrator::new(&service).classify(&posts).await;

        assert_eq!(outcomes[0], InferenceOutcome::no_text("empty"));
        assert_eq!(outcomes[1].label, SentimentLabel::Stress);
        assert_eq!(service.received(), vec!["Title"]);
    }

    #[tokio::test]
    async fn test_unparseable_answer_is_unknown_but_not_failed() {
        let posts = vec![post("x", "Title", "Body")];
        let service = ScriptedService::raw(vec![Some("model overloaded, try later".to_string())]);

        let outcomes = InferenceOrchestrator::new(&service).classify(&posts).await;

        assert_eq!(outcomes[0].label, SentimentLabel::Unknown);
        assert!(!outcomes[0].failed);
        assert_eq!(
            outcomes[0].raw_response.as_deref(),
            Some("model overloaded, try later")
        );
    }

    #[test]
    fn test_outcomes_without_service() {
        let posts = vec![post("a", "Title", ""), post("b", "", "")];
        let outcomes = outcomes_without_service(&posts);
        assert_eq!(outcomes[0], InferenceOutcome::failed("a"));
        assert_eq!(outcomes[1], InferenceOutcome::no_text("b"));
    }
}
