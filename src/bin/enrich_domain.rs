//! One-shot enrichment from the command line.
//!
//! Usage: `enrich_domain <domain> <provider> [field...]`
//!
//! Credentials come from the same environment as the server. `ENRICH_API_KEY`
//! overrides the configured key and `PERPLEXICA_URL` is required for the
//! perplexica provider.

use domain_enrichment_api::chat_transport::HttpChatTransport;
use domain_enrichment_api::config::Config;
use domain_enrichment_api::enrichment::Enricher;
use domain_enrichment_api::models::EnrichmentRequest;
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "domain_enrichment_api=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let (Some(domain), Some(provider)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: enrich_domain <domain> <openai|claude|perplexica> [field...]");
    };
    let fields: Vec<String> = args.collect();

    let config = Config::from_env()?;
    let transport = HttpChatTransport::new(&config).map_err(|e| anyhow::anyhow!("{}", e))?;
    let enricher = Enricher::new(config, Arc::new(transport));

    let request = EnrichmentRequest {
        domain,
        provider,
        fields,
        custom_api_key: env::var("ENRICH_API_KEY").ok(),
        perplexica_url: env::var("PERPLEXICA_URL").ok(),
    };

    let result = enricher
        .resolve(&request)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
