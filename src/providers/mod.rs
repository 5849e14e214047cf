//! Provider adapters for text generation.
//!
//! Each upstream differs only in request shape, response-extraction path,
//! and default model; everything behind the [`RecipeProvider`] trait is
//! provider-agnostic. Exactly one variant is active per deployment,
//! selected by configuration at startup, not per request.
//!
//! Adapters surface failures as classified [`PipelineError`](crate::PipelineError)
//! values — a raw upstream error never propagates past this module. Timeouts
//! are not an adapter concern; the pipeline's deadline controller produces
//! those.

mod gemini;
mod openai_chat;
mod openai_responses;

pub use gemini::GeminiProvider;
pub use openai_chat::OpenAiChatProvider;
pub use openai_responses::OpenAiResponsesProvider;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::{PipelineError, Result};

/// Capability shared by all provider variants: turn a prompt into text.
#[async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Provider name for logging/metrics.
    fn name(&self) -> &str;

    /// Produce a text completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// The provider variants a deployment can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI chat-completions API.
    OpenAiChat,
    /// OpenAI responses API (single-turn input).
    OpenAiResponses,
    /// Google Gemini generateContent API.
    Gemini,
}

impl ProviderKind {
    /// Parse the configuration spelling of a provider kind.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "openai-chat" => Ok(ProviderKind::OpenAiChat),
            "openai-responses" => Ok(ProviderKind::OpenAiResponses),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(PipelineError::Configuration(format!(
                "unknown provider '{other}' (expected openai-chat, openai-responses, or gemini)"
            ))),
        }
    }

    /// Default model identifier for this variant.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAiChat => "gpt-3.5-turbo",
            ProviderKind::OpenAiResponses => "gpt-4.1-mini",
            ProviderKind::Gemini => "gemini-1.5-flash",
        }
    }

    /// Environment variable holding this variant's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAiChat | ProviderKind::OpenAiResponses => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::OpenAiChat => "openai-chat",
            ProviderKind::OpenAiResponses => "openai-responses",
            ProviderKind::Gemini => "gemini",
        };
        f.write_str(name)
    }
}

/// Build the configured provider variant.
pub fn build_provider(config: &ProviderConfig) -> Arc<dyn RecipeProvider> {
    match config.kind {
        ProviderKind::OpenAiChat => match &config.base_url {
            Some(url) => Arc::new(OpenAiChatProvider::with_base_url(
                &config.api_key,
                &config.model,
                url,
            )),
            None => Arc::new(OpenAiChatProvider::new(&config.api_key, &config.model)),
        },
        ProviderKind::OpenAiResponses => match &config.base_url {
            Some(url) => Arc::new(OpenAiResponsesProvider::with_base_url(
                &config.api_key,
                &config.model,
                url,
            )),
            None => Arc::new(OpenAiResponsesProvider::new(&config.api_key, &config.model)),
        },
        ProviderKind::Gemini => match &config.base_url {
            Some(url) => Arc::new(GeminiProvider::with_base_url(
                &config.api_key,
                &config.model,
                url,
            )),
            None => Arc::new(GeminiProvider::new(&config.api_key, &config.model)),
        },
    }
}

/// Shared HTTP client construction for adapters.
///
/// Connect timeout only — no overall request timeout, since the pipeline's
/// deadline controller owns the wall clock and an abandoned call is allowed
/// to run to completion in the background.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client")
}
