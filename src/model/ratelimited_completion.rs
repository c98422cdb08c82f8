use std::sync::Arc;

use governor::DefaultDirectRateLimiter;
use rig::completion::{self, CompletionError, CompletionModel, CompletionRequest};
use tracing::{debug_span, info_span, Instrument};

use super::RateLimitResponse;

/// Completion model that waits for a rate limiter permit before each request
#[derive(Clone)]
pub struct RateLimitedCompletionModel<M: CompletionModel> {
    model: M,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<M> RateLimitedCompletionModel<M>
where
    M: CompletionModel,
{
    pub fn new(model: M, limiter: DefaultDirectRateLimiter) -> Self {
        Self {
            model,
            limiter: Arc::new(limiter),
        }
    }
}

impl<M: CompletionModel> CompletionModel for RateLimitedCompletionModel<M> {
    type Response = RateLimitResponse<M::Response>;

    async fn completion(
        &self,
        request: CompletionRequest,
    ) -> Result<completion::CompletionResponse<Self::Response>, CompletionError> {
        self.limiter
            .until_ready()
            .instrument(debug_span!("rate_limiter"))
            .await;
        let response = self
            .model
            .completion(request)
            .instrument(info_span!("completion"))
            .await?;
        Ok(completion::CompletionResponse {
            choice: response.choice,
            raw_response: RateLimitResponse {
                response: response.raw_response,
            },
        })
    }
}
