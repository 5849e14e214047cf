//! Prompt validation.
//!
//! Pure checks on the raw request — no network or cache access happens
//! before these pass. The method check (POST-only) lives in the router,
//! which dispatches by method before a handler ever runs; everything else
//! is validated here, in order: content type, prompt presence and type,
//! length, emptiness.

use crate::error::{PipelineError, Result};

/// Maximum accepted prompt length, in characters.
pub const MAX_PROMPT_CHARS: usize = 2000;

/// Check that the request declared `application/json`.
///
/// Media-type parameters (`; charset=utf-8`) are tolerated; the essence is
/// compared case-insensitively.
pub fn validate_content_type(content_type: Option<&str>) -> Result<()> {
    let essence = content_type
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .unwrap_or("");

    if essence.eq_ignore_ascii_case("application/json") {
        Ok(())
    } else {
        Err(PipelineError::UnsupportedMediaType(
            content_type.map(String::from),
        ))
    }
}

/// Parse and validate the request body, returning the prompt.
pub fn validate_body(body: &[u8]) -> Result<String> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|_| PipelineError::InvalidInput("Request body must be valid JSON".to_string()))?;

    let prompt = value
        .get("prompt")
        .and_then(|prompt| prompt.as_str())
        .ok_or_else(|| {
            PipelineError::InvalidInput("Prompt is required and must be a string".to_string())
        })?;

    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(PipelineError::InvalidInput(format!(
            "Prompt too long (max {MAX_PROMPT_CHARS} characters)"
        )));
    }

    if prompt.trim().is_empty() {
        return Err(PipelineError::InvalidInput(
            "Prompt cannot be empty".to_string(),
        ));
    }

    Ok(prompt.to_string())
}
