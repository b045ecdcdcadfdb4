//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SHOPFRONT_API_BASE_URL` - Strapi REST base URL (default: <https://front-school-strapi.ktsdev.ru/api>)
//! - `SHOPFRONT_API_TOKEN` - Strapi API token sent as a bearer token
//! - `SHOPFRONT_PUBLIC_URL` - Listing page URL whose query string mirrors the
//!   listing state (default: <http://localhost:3000/products>)
//! - `SHOPFRONT_PAGE_SIZE` - Products per listing page (default: 9)
//! - `SHOPFRONT_STORAGE_DIR` - Directory for persisted client state (default: `.shopfront`)
//! - `SHOPFRONT_CATEGORY_CACHE_TTL_SECS` - Category list cache lifetime (default: 300)
//! - `SHOPFRONT_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use shopfront_core::DEFAULT_PAGE_SIZE;

/// Default Strapi REST endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://front-school-strapi.ktsdev.ru/api";

/// Default listing page URL.
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000/products";

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Strapi API configuration
    pub api: StrapiConfig,
    /// Listing page URL (query string carries page / search / categories)
    pub public_url: Url,
    /// Products per listing page
    pub page_size: u32,
    /// Directory for persisted client state (the cart)
    pub storage_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Strapi REST API configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct StrapiConfig {
    /// Base URL, e.g. `https://cms.example.org/api`
    pub base_url: Url,
    /// Optional API token (read-only tokens are enough)
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// How long a fetched category list is reused
    pub category_cache_ttl: Duration,
}

impl std::fmt::Debug for StrapiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrapiConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("request_timeout", &self.request_timeout)
            .field("category_cache_ttl", &self.category_cache_ttl)
            .finish()
    }
}

impl StrapiConfig {
    /// Configuration for `base_url` with default timeouts and no token.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            request_timeout: Duration::from_secs(10),
            category_cache_ttl: Duration::from_secs(300),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if the
    /// API token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let base_url = vars.url("SHOPFRONT_API_BASE_URL", DEFAULT_API_BASE_URL)?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_API_BASE_URL".to_string(),
                "must be a hierarchical http(s) URL".to_string(),
            ));
        }
        let api_token = vars
            .optional("SHOPFRONT_API_TOKEN")
            .map(|token| validated_secret(token, "SHOPFRONT_API_TOKEN"))
            .transpose()?;

        let page_size = vars.parse("SHOPFRONT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api: StrapiConfig {
                base_url,
                api_token,
                request_timeout: Duration::from_secs(
                    vars.parse("SHOPFRONT_REQUEST_TIMEOUT_SECS", 10)?,
                ),
                category_cache_ttl: Duration::from_secs(
                    vars.parse("SHOPFRONT_CATEGORY_CACHE_TTL_SECS", 300)?,
                ),
            },
            public_url: vars.url("SHOPFRONT_PUBLIC_URL", DEFAULT_PUBLIC_URL)?,
            page_size,
            storage_dir: PathBuf::from(
                vars.optional("SHOPFRONT_STORAGE_DIR")
                    .unwrap_or_else(|| ".shopfront".to_string()),
            ),
            sentry_dsn: vars.optional("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with typed accessors.
struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Parse a URL variable, falling back to `default` when unset.
    fn url(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        let raw = self.optional(key).unwrap_or_else(|| default.to_string());
        Url::parse(raw.trim())
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder or low-entropy tokens before they reach the network.
fn validated_secret(value: String, var_name: &str) -> Result<SecretString, ConfigError> {
    let lower = value.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(&value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(SecretString::from(value))
}
