//! # Mock Completion Model for Testing
//!
//! `MockCompletionModel` implements the `rig` `CompletionModel` trait with a
//! canned reply or a canned failure, and records what it was asked, so the
//! summarizer can be tested without calling a provider.

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    message::{Message, UserContent},
    one_or_many::OneOrMany,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Settings a request was made with
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub preamble: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
    /// Text of the user prompt
    pub prompt: String,
}

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Error(String),
}

/// A mock completion model for testing purposes.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionModel {
    reply: Arc<Mutex<Option<Reply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockCompletionModel {
    /// Creates a mock that answers with an empty text reply
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request with `text`
    pub async fn set_text_response(&self, text: &str) {
        *self.reply.lock().await = Some(Reply::Text(text.to_string()));
    }

    /// Fail every request with a provider error
    pub async fn set_error(&self, message: &str) {
        *self.reply.lock().await = Some(Reply::Error(message.to_string()));
    }

    /// Number of completion requests received
    pub async fn calls(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Settings of every request received, oldest first
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.requests.lock().await.push(RecordedRequest {
            preamble: completion_request.preamble.clone(),
            temperature: completion_request.temperature,
            max_tokens: completion_request.max_tokens,
            prompt: prompt_text(&completion_request.prompt),
        });

        let reply = self.reply.lock().await.clone();
        let text = match reply {
            Some(Reply::Error(message)) => return Err(CompletionError::ProviderError(message)),
            Some(Reply::Text(text)) => text,
            None => String::new(),
        };
        Ok(CompletionResponse {
            choice: OneOrMany::one(AssistantContent::text(&text)),
            raw_response: text,
        })
    }
}

fn prompt_text(message: &Message) -> String {
    match message {
        Message::User { content } => content
            .iter()
            .filter_map(|c| match c {
                UserContent::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Message::Assistant { .. } => String::new(),
    }
}
