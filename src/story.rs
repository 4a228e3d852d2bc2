//! Story generation for the storybook
//!
//! One prompt in, one story out. No history and no state; every failure
//! comes back as in-character text rather than an error.

use crate::house::House;
use crate::llm::{LlmRequest, LlmService};
use crate::prompts::{
    story_instruction, STORY_BLANK_REPLY, STORY_FAILURE, STORY_MISSING_KEY, STORY_TEMPERATURE,
};
use std::time::Duration;
use tokio::time::timeout;

/// Default bound on a single story request
pub const DEFAULT_STORY_TIMEOUT: Duration = Duration::from_secs(90);

/// Generate a story for `prompt`, with a tone tailored to `house`.
pub async fn generate_story(
    prompt: &str,
    house: House,
    llm_service: &dyn LlmService,
    story_timeout: Duration,
) -> String {
    if !llm_service.has_credential() {
        tracing::warn!("No API key configured, the quill is dry");
        return STORY_MISSING_KEY.to_string();
    }

    let request = LlmRequest::prompt(prompt)
        .with_system(story_instruction(house))
        .with_temperature(STORY_TEMPERATURE);

    match timeout(story_timeout, llm_service.complete(&request)).await {
        Ok(Ok(response)) => response
            .non_blank_text()
            .map_or_else(|| STORY_BLANK_REPLY.to_string(), str::to_string),
        Ok(Err(e)) => {
            tracing::warn!(house = %house, error = %e.message, "Story generation LLM error");
            STORY_FAILURE.to_string()
        }
        Err(_) => {
            tracing::warn!(house = %house, "Story generation timed out");
            STORY_FAILURE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::MockLlmService;
    use crate::llm::{LlmError, LlmResponse};

    const PROMPT: &str = "The Goblin's Secret";

    #[tokio::test]
    async fn test_returns_story_verbatim() {
        let mock = MockLlmService::new("mock");
        mock.queue_text("Once...");

        let story = generate_story(PROMPT, House::Gryffindor, &mock, DEFAULT_STORY_TIMEOUT).await;
        assert_eq!(story, "Once...");

        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, PROMPT);
        assert!(requests[0].history.is_empty());
        assert!(requests[0].system.as_deref().unwrap().contains("Gryffindor"));
        assert_eq!(requests[0].temperature, Some(STORY_TEMPERATURE));
    }

    #[tokio::test]
    async fn test_failure_returns_fallback() {
        let mock = MockLlmService::new("mock");
        mock.queue_error(LlmError::network("Connection failed"));

        let story = generate_story(PROMPT, House::Gryffindor, &mock, DEFAULT_STORY_TIMEOUT).await;
        assert_eq!(story, STORY_FAILURE);
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_call() {
        let mock = MockLlmService::without_credential("mock");

        let story = generate_story(PROMPT, House::Ravenclaw, &mock, DEFAULT_STORY_TIMEOUT).await;
        assert_eq!(story, STORY_MISSING_KEY);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_story_placeholder() {
        let mock = MockLlmService::new("mock");
        mock.queue_response(LlmResponse::default());

        let story = generate_story(PROMPT, House::Hufflepuff, &mock, DEFAULT_STORY_TIMEOUT).await;
        assert_eq!(story, STORY_BLANK_REPLY);
    }

    #[tokio::test]
    async fn test_timeout_returns_fallback() {
        let mock = MockLlmService::new("mock").with_delay(Duration::from_secs(30));
        mock.queue_text("too late");

        let story =
            generate_story(PROMPT, House::Slytherin, &mock, Duration::from_millis(50)).await;
        assert_eq!(story, STORY_FAILURE);
    }
}
