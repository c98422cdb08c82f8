//! # LLM Model Module
//!
//! Construction of the completion model used for page summaries. Models are
//! `rig` completion models wrapped in a `governor` rate limiter so a long crawl
//! stays inside the provider's request quota.

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use rig::providers::gemini;

use crate::error::{Error, Result};

#[cfg(test)]
pub mod mock_model;
pub mod ratelimited_completion;

pub use ratelimited_completion::RateLimitedCompletionModel;

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Raw provider response, kept for debugging
pub struct RateLimitResponse<T> {
    #[allow(dead_code)]
    response: T,
}

/// Gemini completion model with a per-minute request quota
pub type GeminiCompletionModel = RateLimitedCompletionModel<gemini::completion::CompletionModel>;

/// Create a rate-limited Gemini completion model using `GEMINI_API_KEY`
pub fn gemini_model_from_env(model: &str, requests_per_minute: u32) -> Result<GeminiCompletionModel> {
    let api_key = std::env::var(GEMINI_API_KEY_ENV).map_err(|_| {
        Error::Config(format!(
            "{} environment variable must be set",
            GEMINI_API_KEY_ENV
        ))
    })?;
    gemini_model(&api_key, model, requests_per_minute)
}

/// Create a rate-limited Gemini completion model
pub fn gemini_model(
    api_key: &str,
    model: &str,
    requests_per_minute: u32,
) -> Result<GeminiCompletionModel> {
    let quota = NonZeroU32::new(requests_per_minute)
        .ok_or_else(|| Error::Config("requests per minute must be positive".to_string()))?;
    let client = gemini::Client::new(api_key);
    Ok(RateLimitedCompletionModel::new(
        client.completion_model(model),
        RateLimiter::direct(Quota::per_minute(quota)),
    ))
}
