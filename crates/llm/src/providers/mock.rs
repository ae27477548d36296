//! Scripted mock LLM client for tests.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use askdocs_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock client that replays scripted completions.
///
/// Each call to `complete` pops the next scripted reply. When the script is
/// exhausted the client returns the last reply again, so single-answer tests
/// can script one response and call the pipeline repeatedly. A client created
/// with [`MockLlmClient::failing`] errors on every call, which exercises the
/// degraded-answer path.
pub struct MockLlmClient {
    replies: Mutex<VecDeque<String>>,
    last_reply: Mutex<Option<String>>,
    prompts: Mutex<Vec<LlmRequest>>,
    fail: bool,
}

impl MockLlmClient {
    /// Create a mock that returns the given reply for every request.
    pub fn new(reply: impl Into<String>) -> Self {
        Self::with_replies(vec![reply.into()])
    }

    /// Create a mock that replays the given replies in order.
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            last_reply: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Create a mock that fails every completion request.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            last_reply: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Requests received so far, in order.
    pub fn received(&self) -> Vec<LlmRequest> {
        self.prompts.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.prompts
            .lock()
            .expect("mock lock poisoned")
            .push(request.clone());

        if self.fail {
            return Err(AppError::Llm("mock completion failure".to_string()));
        }

        let mut replies = self.replies.lock().expect("mock lock poisoned");
        let mut last = self.last_reply.lock().expect("mock lock poisoned");

        let content = match replies.pop_front() {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last
                .clone()
                .ok_or_else(|| AppError::Llm("mock has no scripted replies".to_string()))?,
        };

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}
