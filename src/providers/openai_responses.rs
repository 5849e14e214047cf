//! OpenAI responses-API adapter.
//!
//! Single-turn variant: the prompt goes in as `input`, and the completion
//! comes back as `output_text` blocks inside `output` message items. See:
//! <https://platform.openai.com/docs/api-reference/responses>

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::RecipeProvider;
use crate::error::{PipelineError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Adapter for the OpenAI responses API.
#[derive(Clone)]
pub struct OpenAiResponsesProvider {
    api_key: String,
    model: String,
    http: Client,
    base_url: String,
}

impl OpenAiResponsesProvider {
    /// Create an adapter against the production endpoint.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Create an adapter with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            http: super::http_client(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
}

/// The output list interleaves reasoning and message items; only message
/// items carry content blocks.
#[derive(Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl RecipeProvider for OpenAiResponsesProvider {
    fn name(&self) -> &str {
        "openai-responses"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/responses", self.base_url);
        let request = ResponsesRequest {
            model: &self.model,
            input: prompt,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            return Err(PipelineError::from_upstream(format!(
                "OpenAI API error ({status}): {message}"
            )));
        }

        let parsed: ResponsesResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Upstream(e.to_string()))?;

        parsed
            .output
            .into_iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| item.content)
            .find(|block| block.kind == "output_text")
            .and_then(|block| block.text)
            .ok_or_else(|| {
                PipelineError::Upstream("no output_text in responses output".to_string())
            })
    }
}
