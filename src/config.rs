//! Configuration loading for mirepoixd.
//!
//! All configuration is environment-supplied and read once at process
//! start; the pipeline treats it as read-only input. A `.env` file is
//! honored when present (loaded by the binary before this runs).
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | 3001 |
//! | `CORS_ORIGIN` | unset (permissive) |
//! | `RECIPE_PROVIDER` | `openai-chat` |
//! | `OPENAI_API_KEY` / `GEMINI_API_KEY` | required for the selected provider |
//! | `RECIPE_MODEL` | per-provider default |
//! | `RECIPE_BASE_URL` | provider's production endpoint |
//! | `RATE_LIMIT_MAX` | 10 |
//! | `RATE_LIMIT_WINDOW_SECS` | 900 |
//! | `REQUEST_TIMEOUT_SECS` | 30 |
//! | `CACHE_TTL_SECS` | 3600 |

use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::error::{PipelineError, Result};
use crate::limiter::RateLimitConfig;
use crate::pipeline::DEFAULT_TIMEOUT;
use crate::providers::ProviderKind;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Allowed CORS origin; permissive when unset.
    pub cors_origin: Option<String>,
    /// Active provider variant.
    pub provider: ProviderConfig,
    /// Rate limiter settings.
    pub rate_limit: RateLimitConfig,
    /// Response cache settings.
    pub cache: CacheConfig,
    /// Provider-call deadline.
    pub request_timeout: Duration,
}

/// Provider selection and credentials.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
    /// Endpoint override, used by tests and proxies.
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let port = env_parse("PORT", 3001)?;
        let cors_origin = std::env::var("CORS_ORIGIN").ok();

        let kind = match std::env::var("RECIPE_PROVIDER") {
            Ok(value) => ProviderKind::parse(&value)?,
            Err(_) => ProviderKind::OpenAiChat,
        };
        let api_key = std::env::var(kind.api_key_env()).map_err(|_| {
            PipelineError::Configuration(format!(
                "{} must be set for provider '{kind}'",
                kind.api_key_env()
            ))
        })?;
        let model = std::env::var("RECIPE_MODEL")
            .unwrap_or_else(|_| kind.default_model().to_string());
        let base_url = std::env::var("RECIPE_BASE_URL").ok();

        let rate_limit = RateLimitConfig::new()
            .max_requests(env_parse("RATE_LIMIT_MAX", 10u32)?)
            .window(Duration::from_secs(env_parse(
                "RATE_LIMIT_WINDOW_SECS",
                900u64,
            )?));

        let cache =
            CacheConfig::new().ttl(Duration::from_secs(env_parse("CACHE_TTL_SECS", 3600u64)?));

        let request_timeout = Duration::from_secs(env_parse(
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_TIMEOUT.as_secs(),
        )?);

        Ok(Self {
            port,
            cors_origin,
            provider: ProviderConfig {
                kind,
                api_key,
                model,
                base_url,
            },
            rate_limit,
            cache,
            request_timeout,
        })
    }
}

/// Parse an environment variable, falling back to a default when unset.
///
/// A set-but-unparseable value is a configuration error, not a silent
/// fallback.
fn env_parse<T: FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(value) => value.parse().map_err(|_| {
            PipelineError::Configuration(format!("invalid value for {name}: {value:?}"))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var manipulation is process-global, so these tests serialize
    // through a lock and restore what they touch.
    use std::sync::{Mutex, MutexGuard, OnceLock};

    fn env_lock() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    struct EnvVar {
        name: &'static str,
        saved: Option<String>,
    }

    impl EnvVar {
        fn set(name: &'static str, value: &str) -> Self {
            let saved = std::env::var(name).ok();
            unsafe { std::env::set_var(name, value) };
            Self { name, saved }
        }

        fn unset(name: &'static str) -> Self {
            let saved = std::env::var(name).ok();
            unsafe { std::env::remove_var(name) };
            Self { name, saved }
        }
    }

    impl Drop for EnvVar {
        fn drop(&mut self) {
            match &self.saved {
                Some(value) => unsafe { std::env::set_var(self.name, value) },
                None => unsafe { std::env::remove_var(self.name) },
            }
        }
    }

    #[test]
    fn defaults_applied_when_env_is_minimal() {
        let _guard = env_lock();
        let _key = EnvVar::set("OPENAI_API_KEY", "sk-test");
        let _provider = EnvVar::unset("RECIPE_PROVIDER");
        let _model = EnvVar::unset("RECIPE_MODEL");
        let _port = EnvVar::unset("PORT");
        let _max = EnvVar::unset("RATE_LIMIT_MAX");
        let _window = EnvVar::unset("RATE_LIMIT_WINDOW_SECS");
        let _ttl = EnvVar::unset("CACHE_TTL_SECS");
        let _timeout = EnvVar::unset("REQUEST_TIMEOUT_SECS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.provider.kind, ProviderKind::OpenAiChat);
        assert_eq!(config.provider.model, "gpt-3.5-turbo");
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window, Duration::from_secs(900));
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let _guard = env_lock();
        let _provider = EnvVar::set("RECIPE_PROVIDER", "gemini");
        let _key = EnvVar::unset("GEMINI_API_KEY");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn overrides_take_effect() {
        let _guard = env_lock();
        let _key = EnvVar::set("GEMINI_API_KEY", "g-test");
        let _provider = EnvVar::set("RECIPE_PROVIDER", "gemini");
        let _model = EnvVar::set("RECIPE_MODEL", "gemini-2.0-flash");
        let _max = EnvVar::set("RATE_LIMIT_MAX", "3");
        let _timeout = EnvVar::set("REQUEST_TIMEOUT_SECS", "5");

        let config = Config::from_env().unwrap();
        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.model, "gemini-2.0-flash");
        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn unparseable_value_is_rejected() {
        let _guard = env_lock();
        let _key = EnvVar::set("OPENAI_API_KEY", "sk-test");
        let _provider = EnvVar::unset("RECIPE_PROVIDER");
        let _port = EnvVar::set("PORT", "not-a-port");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }
}
