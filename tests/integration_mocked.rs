/// Integration tests with mocked external APIs
/// Exercises the search adapter and the HTTP chat transport against wiremock
use axum::http::StatusCode;
use domain_enrichment_api::chat_transport::HttpChatTransport;
use domain_enrichment_api::config::Config;
use domain_enrichment_api::enrichment::Enricher;
use domain_enrichment_api::errors::AppError;
use domain_enrichment_api::extractor::EXCERPT_CHARS;
use domain_enrichment_api::integrations::providers::SearchProvider;
use domain_enrichment_api::models::EnrichmentRequest;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create test config pointing both chat APIs at `base_url`
fn create_test_config(base_url: String) -> Config {
    Config {
        openai_api_key: Some("sk-openai".to_string()),
        anthropic_api_key: Some("sk-ant".to_string()),
        openai_base_url: base_url.clone(),
        anthropic_base_url: base_url,
        ..Default::default()
    }
}

fn enricher_for(base_url: String) -> Enricher {
    let config = create_test_config(base_url);
    let transport = HttpChatTransport::new(&config).unwrap();
    Enricher::new(config, Arc::new(transport))
}

fn fields(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

// ============ Search adapter ============

#[tokio::test]
async fn test_perplexica_structured_answer() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "message": "Based on my research: {\"companyName\":\"Acme Corp\",\"industry\":\"Retail\",\"hqCountry\":\"USA\",\"fundingType\":\"Series A\"} [1][2]",
        "sources": []
    });

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_partial_json(serde_json::json!({
            "focusMode": "webSearch",
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = SearchProvider::new();
    let result = provider
        .enrich("acme.com", &fields(&["industry", "hqCountry"]), &mock_server.uri())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.provider, "perplexica");
    assert_eq!(result.company_name.as_deref(), Some("Acme Corp"));
    assert_eq!(result.industry.as_deref(), Some("Retail"));
    assert_eq!(result.funding_type.as_deref(), Some("Series A"));
    // Outside the search field set
    assert_eq!(result.hq_country, None);
}

#[tokio::test]
async fn test_perplexica_trailing_slash_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"message": "{\"companyName\":\"Acme\"}"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/", mock_server.uri());
    let result = SearchProvider::new()
        .enrich("acme.com", &[], &endpoint)
        .await
        .unwrap();
    assert_eq!(result.company_name.as_deref(), Some("Acme"));
}

#[tokio::test]
async fn test_perplexica_unstructured_answer_degrades() {
    let mock_server = MockServer::start().await;

    let prose = "Acme is a company that sells many things to many people. ".repeat(10);
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": prose
        })))
        .mount(&mock_server)
        .await;

    let result = SearchProvider::new()
        .enrich("www.acme.com", &fields(&["industry"]), &mock_server.uri())
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.normalized_domain, "acme.com");
    assert_eq!(
        result.error.as_deref(),
        Some("Could not parse structured response")
    );
    let description = result.description.unwrap();
    assert!(description.chars().count() <= EXCERPT_CHARS);
    assert!(prose.starts_with(&description));
    assert_eq!(result.company_name, None);
}

#[tokio::test]
async fn test_perplexica_invalid_json_span_degrades() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "{companyName: Acme, not really json}"
        })))
        .mount(&mock_server)
        .await;

    let result = SearchProvider::new()
        .enrich("acme.com", &[], &mock_server.uri())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.error.is_some());
    assert_eq!(
        result.description.as_deref(),
        Some("{companyName: Acme, not really json}")
    );
}

#[tokio::test]
async fn test_perplexica_upstream_error_carries_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("search backend overloaded"))
        .mount(&mock_server)
        .await;

    let err = SearchProvider::new()
        .enrich("acme.com", &[], &mock_server.uri())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AppError::Upstream {
            provider: "Perplexica".to_string(),
            status: 503,
            body: "search backend overloaded".to_string(),
        }
    );
    assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_perplexica_timeout_is_gateway_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"message": "{}"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let err = SearchProvider::with_timeout(Duration::from_millis(100))
        .enrich("acme.com", &[], &mock_server.uri())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AppError::GatewayTimeout("Perplexica API timeout".to_string())
    );
    assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_perplexica_empty_message_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"sources": []})))
        .mount(&mock_server)
        .await;

    let err = SearchProvider::new()
        .enrich("acme.com", &[], &mock_server.uri())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("No content in Perplexica response"));
}

#[tokio::test]
async fn test_orchestrated_perplexica_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "{\"companyName\":\"Globex\",\"founded\":1989}"
        })))
        .mount(&mock_server)
        .await;

    let enricher = Enricher::new(
        Config::default(),
        Arc::new(HttpChatTransport::new(&Config::default()).unwrap()),
    );
    let request = EnrichmentRequest {
        domain: "globex.com".to_string(),
        provider: "perplexica".to_string(),
        fields: fields(&["founded"]),
        custom_api_key: None,
        perplexica_url: Some(mock_server.uri()),
    };

    let result = enricher.resolve(&request).await.unwrap();
    assert!(result.success);
    assert_eq!(result.founded.as_deref(), Some("1989"));
}

// ============ HTTP chat transport ============

#[tokio::test]
async fn test_openai_chat_completion_wire_format() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "Here is the data:\n```json\n{\"companyName\":\"Acme Inc\",\"vertical\":\"Logistics\"}\n```"
            }
        }]
    });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-openai"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "temperature": 0.1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .expect(1)
        .mount(&mock_server)
        .await;

    let enricher = enricher_for(mock_server.uri());
    let request = EnrichmentRequest {
        domain: "acme.com".to_string(),
        provider: "openai".to_string(),
        fields: fields(&["vertical"]),
        ..Default::default()
    };

    let result = enricher.resolve(&request).await.unwrap();
    assert!(result.success);
    assert_eq!(result.company_name.as_deref(), Some("Acme Inc"));
    assert_eq!(result.vertical.as_deref(), Some("Logistics"));
}

#[tokio::test]
async fn test_anthropic_messages_wire_format() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [
            {"type": "text", "text": "Sure! {\"companyName\":\"Initech\","},
            {"type": "text", "text": "\"businessType\":\"Digital Native\"}"}
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(serde_json::json!({
            "model": "claude-3-7-sonnet-20250219",
            "max_tokens": 1024
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .expect(1)
        .mount(&mock_server)
        .await;

    let enricher = enricher_for(mock_server.uri());
    let request = EnrichmentRequest {
        domain: "initech.com".to_string(),
        provider: "claude".to_string(),
        fields: fields(&["businessType"]),
        ..Default::default()
    };

    let result = enricher.resolve(&request).await.unwrap();
    assert_eq!(result.provider, "claude");
    assert_eq!(result.company_name.as_deref(), Some("Initech"));
    assert_eq!(result.business_type.as_deref(), Some("Digital Native"));
}

#[tokio::test]
async fn test_chat_upstream_error_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let enricher = enricher_for(mock_server.uri());
    let request = EnrichmentRequest {
        domain: "acme.com".to_string(),
        provider: "openai".to_string(),
        ..Default::default()
    };

    let err = enricher.resolve(&request).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    let message = err.to_string();
    assert!(message.contains("401"));
    assert!(message.contains("invalid api key"));
}

#[tokio::test]
async fn test_concurrent_search_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"message": "{\"companyName\":\"Test\"}"})),
        )
        .expect(10)
        .mount(&mock_server)
        .await;

    let provider = SearchProvider::new();
    let mut handles = vec![];
    for i in 0..10 {
        let provider = provider.clone();
        let endpoint = mock_server.uri();
        handles.push(tokio::spawn(async move {
            provider
                .enrich(&format!("company{}.com", i), &[], &endpoint)
                .await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok());
    }
}
