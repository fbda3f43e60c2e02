use crate::domain::normalize_domain;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============ Providers ============

/// Information-retrieval backends an enrichment can be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI chat model.
    OpenAi,
    /// Anthropic Claude chat model.
    Claude,
    /// Self-hosted Perplexica search service.
    Perplexica,
}

impl Provider {
    /// Wire tag used in requests and results.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Claude => "claude",
            Provider::Perplexica => "perplexica",
        }
    }

    /// Human-readable name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Claude => "Claude",
            Provider::Perplexica => "Perplexica",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Provider::OpenAi),
            "claude" => Ok(Provider::Claude),
            "perplexica" => Ok(Provider::Perplexica),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

// ============ API Request Models ============

/// Body of `POST /api/enrich`.
///
/// `provider` stays a plain string so that an unknown value is reported as a
/// configuration error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentRequest {
    pub domain: String,
    pub provider: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub custom_api_key: Option<String>,
    #[serde(default)]
    pub perplexica_url: Option<String>,
}

/// Body of `POST /api/enrich/batch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchEnrichmentRequest {
    /// Raw cell values: domains, URLs or e-mail addresses.
    pub values: Vec<String>,
    pub provider: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub custom_api_key: Option<String>,
    #[serde(default)]
    pub perplexica_url: Option<String>,
}

// ============ API Response Models ============

/// Structured company attributes for one domain.
///
/// Every optional field is either a non-empty string taken from the
/// provider's JSON answer or absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    pub domain: String,
    pub normalized_domain: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hq_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_stage: Option<String>,
}

/// Which result fields an adapter is allowed to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSet {
    /// Every catalog field plus `companyName`.
    Full,
    /// The reduced set understood by the search provider.
    Search,
}

impl EnrichmentResult {
    /// Identity fields for `domain`; callers set `success` and the payload.
    fn empty(domain: &str, provider: Provider) -> Self {
        Self {
            domain: domain.to_string(),
            normalized_domain: normalize_domain(domain),
            provider: provider.as_str().to_string(),
            ..Default::default()
        }
    }

    /// A successful record populated from the provider's parsed JSON.
    ///
    /// Keys missing from `parsed` stay unset; nothing is defaulted.
    pub fn from_parsed(
        domain: &str,
        provider: Provider,
        parsed: &Map<String, Value>,
        field_set: FieldSet,
    ) -> Self {
        let get = |key: &str| parsed.get(key).and_then(text_value);
        let full = |key: &str| match field_set {
            FieldSet::Full => get(key),
            FieldSet::Search => None,
        };

        Self {
            success: true,
            company_name: get("companyName"),
            headquarters: get("headquarters"),
            hq_country: full("hqCountry"),
            description: get("description"),
            short_description: full("shortDescription"),
            industry: get("industry"),
            vertical: get("vertical"),
            employee_count: get("employeeCount"),
            revenue: get("revenue"),
            founded: get("founded"),
            founded_country: full("foundedCountry"),
            funding: get("funding"),
            funding_type: get("fundingType"),
            funding_stage: full("fundingStage"),
            business_type: full("businessType"),
            revenue_model: full("revenueModel"),
            company_stage: full("companyStage"),
            ..Self::empty(domain, provider)
        }
    }

    /// An unsuccessful record carrying a diagnostic message.
    pub fn failed(domain: &str, provider: Provider, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::empty(domain, provider)
        }
    }
}

/// Converts a JSON value into a result field.
///
/// Strings are trimmed and dropped when empty; numbers and booleans keep
/// their textual form; null, arrays and objects are treated as absent.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Snapshot of which credentials are configured and which providers are usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub has_emergent_key: bool,
    pub has_openai_key: bool,
    pub has_anthropic_key: bool,
    pub available_providers: Vec<Provider>,
}

/// One row of a batch enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub index: usize,
    pub input: String,
    pub result: EnrichmentResult,
}

/// Response of `POST /api/enrich/batch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEnrichmentResponse {
    /// One item per input value, in input order.
    pub results: Vec<BatchItem>,
    /// Normalized domains shared by more than one successful row.
    pub duplicates: BTreeMap<String, Vec<usize>>,
}
