//! Telemetry metric name constants.
//!
//! Centralised metric names for mirepoix operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `mirepoix_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider` — provider name (e.g. "openai-chat", "gemini")
//! - `status` — outcome: "ok" or "error"
//! - `kind` — error classification (e.g. "timeout", "quota_exceeded")

/// Total requests handled by the pipeline.
///
/// Labels: `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "mirepoix_requests_total";

/// Provider call duration in seconds, including abandoned (timed-out) calls.
///
/// Labels: `provider`.
pub const PROVIDER_REQUEST_DURATION_SECONDS: &str =
    "mirepoix_provider_request_duration_seconds";

/// Total provider call failures, after classification.
///
/// Labels: `provider`, `kind` ("timeout" | "quota_exceeded" | "upstream").
pub const PROVIDER_ERRORS_TOTAL: &str = "mirepoix_provider_errors_total";

/// Total response cache hits.
pub const CACHE_HITS_TOTAL: &str = "mirepoix_cache_hits_total";

/// Total response cache misses.
pub const CACHE_MISSES_TOTAL: &str = "mirepoix_cache_misses_total";

/// Total requests rejected by the rate limiter.
pub const RATE_LIMITED_TOTAL: &str = "mirepoix_rate_limited_total";
