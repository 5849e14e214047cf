//! Mirepoix - recipe generation gateway over LLM provider APIs
//!
//! This crate accepts a free-text cooking prompt over HTTP, forwards it to
//! a configured generative-text provider, and returns a normalized JSON
//! envelope (`{"content": [{"text": ...}]}`) the client parses into a
//! structured recipe. The pipeline handles input validation, per-client
//! rate limiting, response caching, provider invocation under a deadline,
//! and error classification; the provider text itself is treated as opaque.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mirepoix::{RecipePipeline, providers::OpenAiChatProvider};
//!
//! #[tokio::main]
//! async fn main() -> mirepoix::Result<()> {
//!     let provider = Arc::new(OpenAiChatProvider::new("sk-your-key", "gpt-3.5-turbo"));
//!     let pipeline = RecipePipeline::builder().provider(provider).build()?;
//!
//!     let envelope = pipeline
//!         .handle(
//!             "203.0.113.7",
//!             Some("application/json"),
//!             br#"{"prompt": "eggs, milk, flour"}"#,
//!         )
//!         .await?;
//!
//!     println!("{}", envelope.content[0].text);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod limiter;
pub mod pipeline;
pub mod providers;
pub mod server;
pub mod telemetry;
pub mod validate;

// Re-export main types at crate root
pub use cache::{CacheConfig, ResponseCache};
pub use config::{Config, ProviderConfig};
pub use envelope::{ContentBlock, RecipeEnvelope};
pub use error::{PipelineError, Result};
pub use limiter::{FixedWindowLimiter, RateLimitConfig};
pub use pipeline::{RecipePipeline, RecipePipelineBuilder};
pub use providers::{ProviderKind, RecipeProvider};
