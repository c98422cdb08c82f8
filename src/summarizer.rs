//! # Page Summarizer
//!
//! Turns the Markdown of a documentation page into a short summary using a
//! chat-style completion model. The walker only sees the [`Summarizer`]
//! capability; [`CompletionSummarizer`] backs it with any `rig` completion
//! model and [`NoSummary`] switches summaries off.
//!
//! Only an excerpt of each document is sent. Its length is
//! [`SummarizerConfig::excerpt_chars`], counted in characters.

use std::future::Future;

use rig::agent::{Agent, AgentBuilder};
use rig::completion::{CompletionModel, Prompt};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::error::Error as CrateError;

/// Instruction persona sent as the system preamble
pub const DEFAULT_PREAMBLE: &str = "\
Persona: You are a technical assistant specialized in software documentation.
Task: Summarize the content of a technical documentation page.
Guidelines:
- Be concise and clear.
- Highlight the topics covered and their purpose.
- Avoid copying code blocks or long lists.
Output format:
<Summary in at most 5 sentences>";

/// Error type for summarization
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// The completion service failed or returned an unusable reply
    #[error("Completion error: {0}")]
    Completion(String),
}

impl From<SummarizeError> for CrateError {
    fn from(err: SummarizeError) -> Self {
        CrateError::Summarize(err.to_string())
    }
}

/// Produces a summary for a page document
pub trait Summarizer {
    /// Summarize `document`; an empty string means no summary was produced
    fn summarize(
        &self,
        document: &str,
    ) -> impl Future<Output = Result<String, SummarizeError>> + Send;
}

/// Configuration for page summaries
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Model name passed to the provider
    pub model: String,

    /// System instruction for every request
    pub preamble: String,

    /// Sampling temperature
    pub temperature: f64,

    /// Cap on generated tokens
    pub max_tokens: u64,

    /// Number of leading document characters sent to the model
    pub excerpt_chars: usize,

    /// Request quota per minute
    pub requests_per_minute: u32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            preamble: DEFAULT_PREAMBLE.to_string(),
            temperature: 0.3,
            max_tokens: 300,
            excerpt_chars: 4000,
            requests_per_minute: 30,
        }
    }
}

/// Builder for SummarizerConfig
#[derive(Debug, Default)]
pub struct SummarizerConfigBuilder {
    config: SummarizerConfig,
}

impl SummarizerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn preamble(mut self, preamble: impl Into<String>) -> Self {
        self.config.preamble = preamble.into();
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.config.excerpt_chars = excerpt_chars;
        self
    }

    pub fn requests_per_minute(mut self, requests_per_minute: u32) -> Self {
        self.config.requests_per_minute = requests_per_minute;
        self
    }

    pub fn build(self) -> SummarizerConfig {
        self.config
    }
}

impl SummarizerConfig {
    pub fn builder() -> SummarizerConfigBuilder {
        SummarizerConfigBuilder::new()
    }
}

/// Summarizer backed by a `rig` completion model
pub struct CompletionSummarizer<M: CompletionModel> {
    agent: Agent<M>,
    excerpt_chars: usize,
}

impl<M: CompletionModel> CompletionSummarizer<M> {
    pub fn new(model: M, config: &SummarizerConfig) -> Self {
        let agent = AgentBuilder::new(model)
            .preamble(&config.preamble)
            .temperature(config.temperature)
            .max_tokens(config.max_tokens)
            .build();
        Self {
            agent,
            excerpt_chars: config.excerpt_chars,
        }
    }
}

impl<M: CompletionModel> Summarizer for CompletionSummarizer<M> {
    #[instrument(skip_all, fields(document_len = document.len()))]
    async fn summarize(&self, document: &str) -> Result<String, SummarizeError> {
        let prompt = user_prompt(excerpt(document, self.excerpt_chars));
        let reply = self
            .agent
            .prompt(prompt)
            .await
            .map_err(|e| SummarizeError::Completion(e.to_string()))?;

        let summary = reply.trim().to_string();
        debug!("Generated summary of length {}", summary.len());
        Ok(summary)
    }
}

/// Summarizer that never produces a summary
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSummary;

impl Summarizer for NoSummary {
    async fn summarize(&self, _document: &str) -> Result<String, SummarizeError> {
        Ok(String::new())
    }
}

/// Leading `max_chars` characters of `text`, cut on a character boundary
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// User message pairing the excerpt with the request for a summary
pub fn user_prompt(excerpt: &str) -> String {
    format!(
        "The following is the Markdown content of a technical documentation page:\n\n\
         \"\"\"\n{}\n\"\"\"\n\n\
         Write a summary of the content:",
        excerpt
    )
}
