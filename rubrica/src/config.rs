use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;

fn parse_env_or<T: FromStr>(var: &str, default: T) -> T
where
    T::Err: fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: FromStr>(var: &str) -> Option<T>
where
    T::Err: fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Read an optional URL, dropping values that do not parse.
fn parse_url_env(var: &str) -> Option<String> {
    let value = env::var(var).ok().filter(|v| !v.trim().is_empty())?;
    match url::Url::parse(value.trim()) {
        Ok(_) => Some(value.trim().trim_end_matches('/').to_string()),
        Err(e) => {
            tracing::warn!("Invalid URL '{}' for {}: {}. Ignoring.", value, var, e);
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which upstream text-generation API the prompt proxy talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAI => "openai",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => ANTHROPIC_DEFAULT_MODEL,
            ProviderKind::OpenAI => OPENAI_DEFAULT_MODEL,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => ANTHROPIC_BASE_URL,
            ProviderKind::OpenAI => OPENAI_BASE_URL,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAI),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 3000;

/// Upstream LLM provider configuration for the prompt proxy.
///
/// `api_key` is deliberately optional: a missing credential is reported per
/// request (HTTP 500) rather than preventing startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Unset means the HTTP client's default (no explicit timeout).
    pub timeout_secs: Option<u64>,
    pub default_max_tokens: u32,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            model: kind.default_model().to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: None,
            default_max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.kind.default_base_url())
    }
}

/// Chat webhook configuration for the usage notifier.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let kind = parse_env_or("LLM_PROVIDER", ProviderKind::Anthropic);

        Self {
            server: ServerConfig {
                host: env::var("RUBRICA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("RUBRICA_PORT", 3000),
            },
            provider: ProviderConfig {
                kind,
                model: env::var("LLM_MODEL")
                    .ok()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| kind.default_model().to_string()),
                api_key: env::var(kind.api_key_var())
                    .ok()
                    .filter(|k| !k.trim().is_empty()),
                base_url: parse_url_env("LLM_BASE_URL"),
                timeout_secs: parse_env_opt("LLM_TIMEOUT"),
                default_max_tokens: parse_env_or("LLM_DEFAULT_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            },
            notify: NotifyConfig {
                webhook_url: parse_url_env("SLACK_WEBHOOK_URL"),
                timeout_secs: parse_env_or("NOTIFY_TIMEOUT", 10),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
