/// Provider adapters.
///
/// Each adapter turns `(domain, fields, credential or endpoint)` into an
/// [`EnrichmentResult`]: it builds the research brief, talks to its backend
/// once and hands the raw answer to the extractor.
///
/// - [`ChatProvider`]: OpenAI or Claude through a [`ChatTransport`] session.
///   An answer without a JSON object is a hard failure.
/// - [`SearchProvider`]: a self-hosted Perplexica instance. An unstructured
///   answer is returned as `success = false` with an excerpt, never an error.
use crate::chat_transport::{ChatTransport, ChatVendor, SessionSpec};
use crate::errors::{AppError, ResultExt};
use crate::extractor::{extract_json, truncate_chars, EXCERPT_CHARS};
use crate::models::{EnrichmentResult, FieldSet, Provider};
use crate::prompt::build_prompt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Hard upper bound on a search query.
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(60);

const OPENAI_SYSTEM_MESSAGE: &str = "You are an expert business intelligence researcher with access to comprehensive company databases and web search. Your task is to find detailed, accurate, and current information about companies. Return only valid JSON.";
const CLAUDE_SYSTEM_MESSAGE: &str = "You are an expert business intelligence researcher. Find detailed, accurate information about companies and return valid JSON only.";

/// Session identifier for a domain; each enrichment is its own conversation.
pub fn session_id(domain: &str) -> String {
    format!("enrichment-{}", domain)
}

// ============ Chat adapters ============

/// Adapter for the chat-model providers.
#[derive(Clone)]
pub struct ChatProvider {
    transport: Arc<dyn ChatTransport>,
    provider: Provider,
    vendor: ChatVendor,
    model: String,
    system_message: &'static str,
}

impl ChatProvider {
    pub fn openai(transport: Arc<dyn ChatTransport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            provider: Provider::OpenAi,
            vendor: ChatVendor::OpenAi,
            model: model.into(),
            system_message: OPENAI_SYSTEM_MESSAGE,
        }
    }

    pub fn claude(transport: Arc<dyn ChatTransport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            provider: Provider::Claude,
            vendor: ChatVendor::Anthropic,
            model: model.into(),
            system_message: CLAUDE_SYSTEM_MESSAGE,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Runs one single-turn conversation and maps the answer.
    ///
    /// Transport failures, empty answers and unparseable answers are all
    /// returned as errors.
    pub async fn enrich(
        &self,
        domain: &str,
        fields: &[String],
        api_key: &str,
    ) -> Result<EnrichmentResult, AppError> {
        let name = self.provider.display_name();
        self.exchange(domain, fields, api_key)
            .await
            .with_context(|| format!("{} enrichment error", name))
    }

    async fn exchange(
        &self,
        domain: &str,
        fields: &[String],
        api_key: &str,
    ) -> Result<EnrichmentResult, AppError> {
        let prompt = build_prompt(domain, fields);

        let mut session = self
            .transport
            .open_session(SessionSpec {
                session_id: session_id(domain),
                system_message: self.system_message.to_string(),
                vendor: self.vendor,
                model: self.model.clone(),
                api_key: api_key.to_string(),
            })
            .await?;

        let content = session.send_message(&prompt).await?;
        if content.trim().is_empty() {
            return Err(AppError::ExternalApiError(format!(
                "No content in {} response",
                self.provider.display_name()
            )));
        }

        let parsed = extract_json(&content)?;
        tracing::info!(
            "✓ {} answered for {} with {} keys",
            self.provider.display_name(),
            domain,
            parsed.len()
        );

        Ok(EnrichmentResult::from_parsed(
            domain,
            self.provider,
            &parsed,
            FieldSet::Full,
        ))
    }
}

// ============ Search adapter ============

/// Adapter for a self-hosted Perplexica search service.
#[derive(Clone)]
pub struct SearchProvider {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for SearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchProvider {
    pub fn new() -> Self {
        Self::with_timeout(SEARCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Queries `endpoint` in web-search mode and maps the answer.
    ///
    /// An endpoint that is not an http(s) URL is a `Configuration` error.
    pub async fn enrich(
        &self,
        domain: &str,
        fields: &[String],
        endpoint: &str,
    ) -> Result<EnrichmentResult, AppError> {
        let api_url = search_url(endpoint)?;
        self.enrich_at(domain, fields, &api_url).await
    }

    /// Queries an already validated search URL and maps the answer.
    ///
    /// The call is bounded by the adapter timeout; expiry is reported as
    /// `GatewayTimeout`. A non-200 status is reported with the upstream
    /// status and body.
    pub async fn enrich_at(
        &self,
        domain: &str,
        fields: &[String],
        api_url: &url::Url,
    ) -> Result<EnrichmentResult, AppError> {
        let prompt = build_prompt(domain, fields);

        tracing::info!("Querying Perplexica for {}: {}", domain, api_url);

        let content = tokio::time::timeout(self.timeout, self.query(api_url.clone(), &prompt))
            .await
            .map_err(|_| AppError::GatewayTimeout("Perplexica API timeout".to_string()))??;

        match extract_json(&content) {
            Ok(parsed) => Ok(EnrichmentResult::from_parsed(
                domain,
                Provider::Perplexica,
                &parsed,
                FieldSet::Search,
            )),
            Err(failure) => {
                tracing::warn!(
                    "Perplexica answer for {} had no structured data: {}",
                    domain,
                    failure.reason
                );
                Ok(EnrichmentResult {
                    description: Some(truncate_chars(&content, EXCERPT_CHARS)),
                    ..EnrichmentResult::failed(
                        domain,
                        Provider::Perplexica,
                        "Could not parse structured response",
                    )
                })
            }
        }
    }

    async fn query(&self, api_url: url::Url, prompt: &str) -> Result<String, AppError> {
        let response = self
            .client
            .post(api_url)
            .json(&json!({
                "focusMode": "webSearch",
                "query": prompt,
                "stream": false,
            }))
            .send()
            .await
            .map_err(|e| AppError::from_transport("Perplexica", e))?;

        if response.status() != reqwest::StatusCode::OK {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Perplexica returned error {}: {}", status, error_text);
            return Err(AppError::Upstream {
                provider: "Perplexica".to_string(),
                status: status.as_u16(),
                body: error_text,
            });
        }

        let data: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to decode Perplexica response: {}", e))
        })?;

        let content = data
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(AppError::ExternalApiError(
                "No content in Perplexica response".to_string(),
            ));
        }

        Ok(content.to_string())
    }
}

/// Builds `<endpoint>/api/search`, rejecting endpoints that are not http(s) URLs.
pub fn search_url(endpoint: &str) -> Result<url::Url, AppError> {
    let base = endpoint.trim().trim_end_matches('/');
    let url = url::Url::parse(&format!("{}/api/search", base))
        .map_err(|e| AppError::Configuration(format!("Invalid Perplexica URL '{}': {}", endpoint, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Configuration(format!(
            "Perplexica URL must use http or https, got '{}'",
            other
        ))),
    }
}

// ============ Adapter selection ============

/// A provider adapter bound to the credential or endpoint it will use.
pub enum ProviderAdapter<'a> {
    Chat {
        provider: &'a ChatProvider,
        api_key: String,
    },
    Search {
        provider: &'a SearchProvider,
        api_url: url::Url,
    },
}

impl ProviderAdapter<'_> {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderAdapter::Chat { provider, .. } => provider.provider(),
            ProviderAdapter::Search { .. } => Provider::Perplexica,
        }
    }

    pub async fn enrich(&self, domain: &str, fields: &[String]) -> Result<EnrichmentResult, AppError> {
        match self {
            ProviderAdapter::Chat { provider, api_key } => {
                provider.enrich(domain, fields, api_key).await
            }
            ProviderAdapter::Search { provider, api_url } => {
                provider.enrich_at(domain, fields, api_url).await
            }
        }
    }
}
