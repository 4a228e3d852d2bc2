//! Mock completion service for testing
//!
//! Queued replies are handed out in order; every request is recorded.

use super::{LlmError, LlmRequest, LlmResponse, LlmService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    credential: bool,
    delay: Option<Duration>,
    gate: Option<Semaphore>,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
    /// Notified (with a stored permit) whenever a request starts
    pub request_started: Notify,
}

impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            credential: true,
            delay: None,
            gate: None,
            requests: Mutex::new(Vec::new()),
            request_started: Notify::new(),
        }
    }

    /// A service that reports no configured credential
    pub fn without_credential(model_id: impl Into<String>) -> Self {
        Self {
            credential: false,
            ..Self::new(model_id)
        }
    }

    /// Every request sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every request blocks until `release` is called once for it
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Let one blocked request proceed
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Queue a successful text response
    pub fn queue_text(&self, text: impl Into<String>) {
        self.queue_response(LlmResponse::text(text));
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.request_started.notify_one();

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| LlmError::network("Mock gate closed"))?
                .forget();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn has_credential(&self) -> bool {
        self.credential
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_llm_service() {
        let mock = MockLlmService::new("test-model");
        mock.queue_text("Hello");

        let request = LlmRequest::prompt("hi");
        let response = mock.complete(&request).await.unwrap();
        assert_eq!(response.text.as_deref(), Some("Hello"));

        // Second call should fail (no more responses)
        assert!(mock.complete(&request).await.is_err());
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.recorded_requests()[0].message, "hi");
    }
}
