use crate::models::{Provider, ProviderStatus};
use serde::Deserialize;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Process configuration, read once at startup and never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Shared platform key, usable for both chat providers.
    pub emergent_llm_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub openai_model: String,
    pub claude_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            emergent_llm_key: None,
            openai_api_key: None,
            anthropic_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            claude_model: DEFAULT_CLAUDE_MODEL.to_string(),
        }
    }
}

/// Reads an optional variable; blank values count as unset.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn base_url_var(name: &str, default: &str) -> anyhow::Result<String> {
    let url = optional_var(name).unwrap_or_else(|| default.to_string());
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(url.trim_end_matches('/').to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            host: optional_var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8001".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            emergent_llm_key: optional_var("EMERGENT_LLM_KEY"),
            openai_api_key: optional_var("OPENAI_API_KEY"),
            anthropic_api_key: optional_var("ANTHROPIC_API_KEY"),
            openai_base_url: base_url_var("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)?,
            anthropic_base_url: base_url_var("ANTHROPIC_BASE_URL", DEFAULT_ANTHROPIC_BASE_URL)?,
            openai_model: optional_var("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            claude_model: optional_var("CLAUDE_MODEL")
                .unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.to_string()),
        };

        // Log what was loaded (never the key values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Credentials present - emergent: {}, openai: {}, anthropic: {}",
            config.emergent_llm_key.is_some(),
            config.openai_api_key.is_some(),
            config.anthropic_api_key.is_some()
        );
        tracing::debug!("OpenAI base URL: {}", config.openai_base_url);
        tracing::debug!("Anthropic base URL: {}", config.anthropic_base_url);
        tracing::debug!("Bind address: {}:{}", config.host, config.port);

        Ok(config)
    }

    /// Dedicated credential for a chat provider, if configured.
    pub fn dedicated_key(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai_api_key.as_deref(),
            Provider::Claude => self.anthropic_api_key.as_deref(),
            Provider::Perplexica => None,
        }
    }

    /// Shared platform credential, if configured.
    pub fn shared_key(&self) -> Option<&str> {
        self.emergent_llm_key.as_deref()
    }

    /// Which credential sources are present and which providers they unlock.
    ///
    /// Perplexica is always listed: it needs a per-request endpoint, not
    /// process configuration.
    pub fn provider_status(&self) -> ProviderStatus {
        let has_emergent_key = self.emergent_llm_key.is_some();
        let has_openai_key = self.openai_api_key.is_some();
        let has_anthropic_key = self.anthropic_api_key.is_some();

        let mut available_providers = Vec::with_capacity(3);
        if has_emergent_key || has_openai_key {
            available_providers.push(Provider::OpenAi);
        }
        if has_emergent_key || has_anthropic_key {
            available_providers.push(Provider::Claude);
        }
        available_providers.push(Provider::Perplexica);

        ProviderStatus {
            has_emergent_key,
            has_openai_key,
            has_anthropic_key,
            available_providers,
        }
    }
}
