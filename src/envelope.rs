//! Canonical response envelope.
//!
//! Clients receive the same JSON shape regardless of which provider variant
//! generated the text: `{"content": [{"text": "<raw provider text>"}]}`.
//! The text is the provider's literal output — by convention a JSON-encoded
//! recipe object, but the pipeline treats it as opaque and performs no
//! parsing or semantic validation. Parsing the inner recipe is the consuming
//! client's responsibility.

use serde::{Deserialize, Serialize};

/// One block of provider output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Raw provider text, unmodified.
    pub text: String,
}

/// Canonical envelope returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeEnvelope {
    /// Content blocks; always exactly one for generated responses.
    pub content: Vec<ContentBlock>,
}

impl RecipeEnvelope {
    /// Wrap raw provider text into the canonical envelope.
    ///
    /// Purely structural: the text is not inspected. Idempotent — equal
    /// inputs always produce structurally identical envelopes.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock { text: text.into() }],
        }
    }
}
