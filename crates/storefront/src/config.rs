//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` (or `NEXT_PUBLIC_SUPABASE_URL`) - Data store base URL;
//!   first non-empty value wins, trailing commas are stripped
//! - `SUPABASE_ANON_KEY` (or `NEXT_PUBLIC_SUPABASE_ANON_KEY`, or
//!   `SUPABASE_SERVICE_ROLE_KEY`) - Data store access key
//! - `TOSS_SECRET_KEY` - Toss Payments server secret key
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `NOTION_API_KEY` + `NOTION_DATABASE_ID` - Consultation CRM logging
//!   (both must be set together)
//! - `GEMINI_API_KEY` - Enables the consultation chatbot
//! - `GEMINI_MODEL` - Chat model id (default: gemini-2.5-flash)
//! - `TAVILY_API_KEY` - Enables web-search augmentation
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `FACECAL_DEBUG` - Debug-logging toggle (`1`/`true`/`yes`)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
///
/// Constructed once at process start and passed by injection into every
/// client; nothing reads the environment after this point.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Data store (Supabase REST) configuration
    pub supabase: SupabaseConfig,
    /// Toss Payments configuration
    pub toss: TossConfig,
    /// Notion CRM configuration, when lead/chat logging is enabled
    pub notion: Option<NotionConfig>,
    /// Gemini chat configuration, when the chatbot is enabled
    pub gemini: Option<GeminiConfig>,
    /// Tavily search configuration, when web search is enabled
    pub tavily: Option<TavilyConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Debug-logging toggle
    pub debug_log: bool,
}

/// Data store (Supabase REST) configuration.
///
/// Implements `Debug` manually to redact the access key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Base URL of the Supabase project (e.g. <https://xyz.supabase.co>)
    pub base_url: String,
    /// REST access key, sent as both `apikey` and bearer token
    pub api_key: SecretString,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Toss Payments configuration.
#[derive(Clone)]
pub struct TossConfig {
    /// Server-side secret key, never exposed to the client
    pub secret_key: SecretString,
}

impl std::fmt::Debug for TossConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TossConfig")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Notion CRM configuration.
#[derive(Clone)]
pub struct NotionConfig {
    /// Integration API key
    pub api_key: SecretString,
    /// Database that receives leads and chat logs
    pub database_id: String,
}

impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("api_key", &"[REDACTED]")
            .field("database_id", &self.database_id)
            .finish()
    }
}

/// Gemini chat configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key for the generative language API
    pub api_key: SecretString,
    /// Model id (e.g. gemini-2.5-flash)
    pub model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// Tavily search configuration.
#[derive(Clone)]
pub struct TavilyConfig {
    /// API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for TavilyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyConfig")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;

        let supabase = SupabaseConfig::from_env()?;
        let toss = TossConfig::from_env()?;
        let notion = NotionConfig::from_env()?;
        let gemini = GeminiConfig::from_env()?;
        let tavily = TavilyConfig::from_env();
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let debug_log = get_optional_env("FACECAL_DEBUG")
            .is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"));

        Ok(Self {
            host,
            port,
            supabase,
            toss,
            notion,
            gemini,
            tavily,
            sentry_dsn,
            debug_log,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SupabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            first_non_empty(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"], get_optional_env)
                .ok_or_else(|| ConfigError::MissingEnvVar("SUPABASE_URL".to_string()))?;

        // Reject URLs that would silently break every request later
        Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;

        let api_key = first_non_empty(
            &[
                "SUPABASE_ANON_KEY",
                "NEXT_PUBLIC_SUPABASE_ANON_KEY",
                "SUPABASE_SERVICE_ROLE_KEY",
            ],
            get_optional_env,
        )
        .ok_or_else(|| ConfigError::MissingEnvVar("SUPABASE_ANON_KEY".to_string()))?;
        validate_secret_strength(&api_key, "SUPABASE_ANON_KEY")?;

        Ok(Self {
            base_url,
            api_key: SecretString::from(api_key),
        })
    }
}

impl TossConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret_key = get_validated_secret("TOSS_SECRET_KEY")?;
        Ok(Self { secret_key })
    }
}

impl NotionConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let api_key = get_optional_env("NOTION_API_KEY");
        let database_id = get_optional_env("NOTION_DATABASE_ID");

        match (api_key, database_id) {
            (Some(api_key), Some(database_id)) => Ok(Some(Self {
                api_key: SecretString::from(api_key),
                database_id,
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "NOTION_DATABASE_ID".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("NOTION_API_KEY".to_string())),
        }
    }
}

impl GeminiConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = get_optional_env("GEMINI_API_KEY") else {
            return Ok(None);
        };

        Ok(Some(Self {
            api_key: SecretString::from(api_key),
            model: get_env_or_default("GEMINI_MODEL", "gemini-2.5-flash"),
        }))
    }
}

impl TavilyConfig {
    fn from_env() -> Option<Self> {
        get_optional_env("TAVILY_API_KEY").map(|api_key| Self {
            api_key: SecretString::from(api_key),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Strip surrounding whitespace and trailing commas.
///
/// Dashboard copy/paste regularly leaves a trailing comma on these values.
fn sanitize(value: &str) -> String {
    value.trim().trim_end_matches(',').to_string()
}

/// Resolve the first variable that has a non-empty value after sanitizing.
fn first_non_empty(keys: &[&str], get: impl Fn(&str) -> Option<String>) -> Option<String> {
    keys.iter()
        .filter_map(|key| get(key))
        .map(|value| sanitize(&value))
        .find(|value| !value.is_empty())
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
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_trailing_commas() {
        assert_eq!(sanitize("https://xyz.supabase.co,"), "https://xyz.supabase.co");
        assert_eq!(sanitize("  value,,, "), "value");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn test_first_non_empty_prefers_earlier_keys() {
        let vars = |key: &str| match key {
            "A" => Some("first".to_string()),
            "B" => Some("second".to_string()),
            _ => None,
        };
        assert_eq!(first_non_empty(&["A", "B"], vars), Some("first".to_string()));
    }

    #[test]
    fn test_first_non_empty_skips_blank_values() {
        let vars = |key: &str| match key {
            "A" => Some("  ,".to_string()),
            "B" => Some("fallback".to_string()),
            _ => None,
        };
        assert_eq!(
            first_non_empty(&["A", "B"], vars),
            Some("fallback".to_string())
        );
    }

    #[test]
    fn test_first_non_empty_none_when_all_missing() {
        assert_eq!(first_non_empty(&["A", "B"], |_| None), None);
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            supabase: SupabaseConfig {
                base_url: "https://xyz.supabase.co".to_string(),
                api_key: SecretString::from("key"),
            },
            toss: TossConfig {
                secret_key: SecretString::from("sk"),
            },
            notion: None,
            gemini: None,
            tavily: None,
            sentry_dsn: None,
            debug_log: false,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_config_debug_redacts_secrets() {
        let config = SupabaseConfig {
            base_url: "https://xyz.supabase.co".to_string(),
            api_key: SecretString::from("super_secret_service_role_key"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("https://xyz.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_service_role_key"));
    }
}
