/// Enrichment orchestration shared by the HTTP handlers and the CLI.
///
/// The orchestrator picks an adapter for the requested provider, resolves
/// the credential or endpoint it needs, and runs exactly one attempt:
/// 1. Validate the request and select the adapter (fails fast, no I/O)
/// 2. Build the research brief and query the provider
/// 3. Extract and map the structured answer
///
/// There is no retry here; retrying is the caller's decision.
use crate::chat_transport::ChatTransport;
use crate::config::Config;
use crate::domain::extract_domain;
use crate::errors::AppError;
use crate::models::{
    BatchEnrichmentRequest, BatchEnrichmentResponse, BatchItem, EnrichmentRequest,
    EnrichmentResult, Provider,
};
use crate::providers::{search_url, ChatProvider, ProviderAdapter, SearchProvider};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Largest number of values accepted in one batch.
pub const MAX_BATCH_SIZE: usize = 500;

/// Batch items in flight at once.
pub const BATCH_CONCURRENCY: usize = 5;

/// Picks the first non-blank credential: request override, then the
/// provider's dedicated key, then the shared platform key.
pub fn resolve_credential(
    override_key: Option<&str>,
    dedicated: Option<&str>,
    shared: Option<&str>,
) -> Option<String> {
    [override_key, dedicated, shared]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
}

/// Dispatches enrichment requests to the configured providers.
#[derive(Clone)]
pub struct Enricher {
    config: Arc<Config>,
    openai: ChatProvider,
    claude: ChatProvider,
    search: SearchProvider,
}

impl Enricher {
    /// Creates an orchestrator over an immutable configuration and a chat transport.
    pub fn new(config: Config, transport: Arc<dyn ChatTransport>) -> Self {
        let openai = ChatProvider::openai(transport.clone(), config.openai_model.clone());
        let claude = ChatProvider::claude(transport, config.claude_model.clone());

        Self {
            config: Arc::new(config),
            openai,
            claude,
            search: SearchProvider::new(),
        }
    }

    /// Replaces the search adapter (used to shorten the timeout).
    pub fn with_search_provider(mut self, search: SearchProvider) -> Self {
        self.search = search;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Selects the adapter for `provider` and binds its credential or endpoint.
    ///
    /// Every failure here is a `Configuration` error raised before any
    /// transport call.
    pub fn select_adapter(
        &self,
        provider: &str,
        custom_api_key: Option<&str>,
        perplexica_url: Option<&str>,
    ) -> Result<ProviderAdapter<'_>, AppError> {
        let provider: Provider = provider.parse().map_err(AppError::Configuration)?;

        match provider {
            Provider::OpenAi | Provider::Claude => {
                let api_key = resolve_credential(
                    custom_api_key,
                    self.config.dedicated_key(provider),
                    self.config.shared_key(),
                )
                .ok_or_else(|| {
                    AppError::Configuration(format!(
                        "No API key available for {}",
                        provider.display_name()
                    ))
                })?;

                let chat = if provider == Provider::OpenAi {
                    &self.openai
                } else {
                    &self.claude
                };
                Ok(ProviderAdapter::Chat {
                    provider: chat,
                    api_key,
                })
            }
            Provider::Perplexica => {
                let endpoint = perplexica_url
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| {
                        AppError::Configuration("Perplexica URL is required".to_string())
                    })?;

                Ok(ProviderAdapter::Search {
                    provider: &self.search,
                    api_url: search_url(endpoint)?,
                })
            }
        }
    }

    /// Enriches a single domain.
    pub async fn resolve(&self, request: &EnrichmentRequest) -> Result<EnrichmentResult, AppError> {
        let domain = request.domain.trim();
        if domain.is_empty() {
            return Err(AppError::BadRequest("domain is required".to_string()));
        }

        let adapter = self.select_adapter(
            &request.provider,
            request.custom_api_key.as_deref(),
            request.perplexica_url.as_deref(),
        )?;

        tracing::info!(
            "Enriching {} via {} ({} fields requested)",
            domain,
            adapter.provider(),
            request.fields.len()
        );

        let result = adapter.enrich(domain, &request.fields).await?;

        tracing::info!(
            "Enrichment for {} finished: success={}",
            result.normalized_domain,
            result.success
        );
        Ok(result)
    }

    /// Enriches many raw values (domains, URLs or e-mail addresses).
    ///
    /// Adapter selection happens once, so a configuration problem fails the
    /// whole batch. Per-item faults become `success = false` rows. Results
    /// come back in input order.
    pub async fn enrich_batch(
        &self,
        request: &BatchEnrichmentRequest,
    ) -> Result<BatchEnrichmentResponse, AppError> {
        if request.values.len() > MAX_BATCH_SIZE {
            return Err(AppError::BadRequest(format!(
                "batch too large: {} values (max {})",
                request.values.len(),
                MAX_BATCH_SIZE
            )));
        }

        let adapter = self.select_adapter(
            &request.provider,
            request.custom_api_key.as_deref(),
            request.perplexica_url.as_deref(),
        )?;
        let adapter = &adapter;
        let fields = request.fields.as_slice();

        tracing::info!(
            "Batch enrichment of {} values via {} (max {} concurrent)",
            request.values.len(),
            adapter.provider(),
            BATCH_CONCURRENCY
        );

        let tasks: Vec<_> = request
            .values
            .iter()
            .enumerate()
            .map(|(index, input)| async move {
                BatchItem {
                    index,
                    input: input.clone(),
                    result: enrich_value(adapter, input, fields).await,
                }
            })
            .collect();

        let mut results: Vec<BatchItem> = stream::iter(tasks)
            .buffer_unordered(BATCH_CONCURRENCY)
            .collect()
            .await;
        results.sort_by_key(|item| item.index);

        let duplicates = find_domain_matches(&results);
        let succeeded = results.iter().filter(|item| item.result.success).count();
        tracing::info!(
            "Batch enrichment finished: {}/{} succeeded, {} shared domains",
            succeeded,
            results.len(),
            duplicates.len()
        );

        Ok(BatchEnrichmentResponse {
            results,
            duplicates,
        })
    }
}

async fn enrich_value(adapter: &ProviderAdapter<'_>, input: &str, fields: &[String]) -> EnrichmentResult {
    let provider = adapter.provider();

    if input.trim().is_empty() {
        return EnrichmentResult::failed("", provider, "No domain value");
    }

    let Some(domain) = extract_domain(input) else {
        return EnrichmentResult::failed(input.trim(), provider, "Could not extract domain");
    };

    match adapter.enrich(&domain, fields).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Enrichment failed for {}: {}", domain, e);
            EnrichmentResult::failed(&domain, provider, e.to_string())
        }
    }
}

/// Groups successful rows by normalized domain, keeping groups of two or more.
pub fn find_domain_matches(items: &[BatchItem]) -> BTreeMap<String, Vec<usize>> {
    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for item in items.iter().filter(|item| item.result.success) {
        if item.result.normalized_domain.is_empty() {
            continue;
        }
        groups
            .entry(item.result.normalized_domain.clone())
            .or_default()
            .push(item.index);
    }
    groups.retain(|_, indices| indices.len() > 1);
    groups
}
