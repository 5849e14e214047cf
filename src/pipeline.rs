//! Request pipeline orchestration.
//!
//! One [`RecipePipeline`] per process, owning the cache, the rate limiter,
//! and the active provider. Stage order per request is fixed: rate check →
//! validation → cache lookup → (on miss) generation under deadline →
//! normalization → cache insert. Any stage's failure short-circuits to the
//! error classifier; no stage is retried automatically — retry is a client
//! concern.
//!
//! # Deadline semantics
//!
//! The provider call is spawned as a detached task and awaited through
//! `tokio::time::timeout`. When the deadline elapses, the join handle is
//! dropped: the task keeps running and its eventual result is discarded.
//! This fire-and-forget abandonment matches the observable behavior of the
//! upstream SDKs, which cannot cancel an in-flight completion. Exactly one
//! outcome reaches the caller — the provider's text or a timeout error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::cache::{CacheConfig, ResponseCache};
use crate::envelope::RecipeEnvelope;
use crate::error::{PipelineError, Result};
use crate::limiter::{FixedWindowLimiter, RateLimitConfig};
use crate::providers::RecipeProvider;
use crate::telemetry;
use crate::validate;

/// Default deadline for a single provider invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The per-process request pipeline.
pub struct RecipePipeline {
    provider: Arc<dyn RecipeProvider>,
    cache: ResponseCache,
    limiter: FixedWindowLimiter,
    timeout: Duration,
}

impl std::fmt::Debug for RecipePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipePipeline")
            .field("provider", &self.provider.name())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RecipePipeline {
    /// Create a builder for configuring a pipeline.
    pub fn builder() -> RecipePipelineBuilder {
        RecipePipelineBuilder::new()
    }

    /// Name of the active provider variant.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run one request through the pipeline.
    ///
    /// `identity` feeds only the rate limiter; `content_type` and `body`
    /// are the raw request pieces the validator checks. Returns the
    /// canonical envelope or a classified error.
    pub async fn handle(
        &self,
        identity: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<RecipeEnvelope> {
        let result = self.run(identity, content_type, body).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => status).increment(1);
        result
    }

    async fn run(
        &self,
        identity: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<RecipeEnvelope> {
        // Rate check precedes validation: malformed requests throttle too.
        self.limiter.admit(identity)?;

        validate::validate_content_type(content_type)?;
        let prompt = validate::validate_body(body)?;

        if let Some(hit) = self.cache.get(&prompt) {
            debug!(identity, "serving cached response");
            return Ok(hit);
        }

        let text = self.generate_with_deadline(&prompt).await?;
        let envelope = RecipeEnvelope::from_text(text);
        // Not deduplicated against concurrent generations for the same
        // prompt: last writer wins.
        self.cache.insert(prompt, envelope.clone());
        Ok(envelope)
    }

    /// Invoke the provider under the configured deadline.
    async fn generate_with_deadline(&self, prompt: &str) -> Result<String> {
        let provider = Arc::clone(&self.provider);
        let prompt = prompt.to_string();
        let started = Instant::now();

        // Detached: dropping the handle on deadline abandons the call
        // without cancelling it; its eventual result is discarded.
        let call = tokio::spawn(async move { provider.generate(&prompt).await });

        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(PipelineError::Upstream(format!(
                "provider task failed: {join_error}"
            ))),
            Err(_elapsed) => Err(PipelineError::Timeout(self.timeout)),
        };

        let provider_name = self.provider.name().to_string();
        metrics::histogram!(
            telemetry::PROVIDER_REQUEST_DURATION_SECONDS,
            "provider" => provider_name.clone()
        )
        .record(started.elapsed().as_secs_f64());

        if let Err(error) = &outcome {
            warn!(provider = %provider_name, kind = error.kind(), %error, "provider call failed");
            metrics::counter!(
                telemetry::PROVIDER_ERRORS_TOTAL,
                "provider" => provider_name,
                "kind" => error.kind()
            )
            .increment(1);
        }

        outcome
    }
}

/// Builder for [`RecipePipeline`].
pub struct RecipePipelineBuilder {
    provider: Option<Arc<dyn RecipeProvider>>,
    cache: CacheConfig,
    rate_limit: RateLimitConfig,
    timeout: Duration,
}

impl RecipePipelineBuilder {
    /// Create a builder with default cache/limiter/timeout settings.
    pub fn new() -> Self {
        Self {
            provider: None,
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the provider variant (required).
    pub fn provider(mut self, provider: Arc<dyn RecipeProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the response cache configuration.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Set the rate limiter configuration.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Set the provider-call deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the pipeline.
    ///
    /// Fails with a configuration error when no provider was set.
    pub fn build(self) -> Result<RecipePipeline> {
        let provider = self.provider.ok_or_else(|| {
            PipelineError::Configuration("no provider configured".to_string())
        })?;

        Ok(RecipePipeline {
            provider,
            cache: ResponseCache::new(&self.cache),
            limiter: FixedWindowLimiter::new(self.rate_limit),
            timeout: self.timeout,
        })
    }
}

impl Default for RecipePipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
