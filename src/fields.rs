//! Field catalog for company enrichment.
//!
//! Maps the short field keys accepted in enrichment requests to the research
//! instruction sent to the provider. The catalog is a static table shared
//! read-only by every request; keys that are not in it never reach a prompt.

/// One researchable company attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key accepted in `EnrichmentRequest.fields`.
    pub key: &'static str,
    /// Key the provider is asked to return, and the key used in `EnrichmentResult`.
    pub output_key: &'static str,
    /// Legacy snake_case spellings still sent by older clients.
    pub aliases: &'static [&'static str],
    /// Instruction describing how the attribute should be researched and formatted.
    pub description: &'static str,
}

impl FieldSpec {
    fn matches(&self, key: &str) -> bool {
        self.key == key || self.aliases.contains(&key)
    }
}

pub const FIELD_CATALOG: [FieldSpec; 16] = [
    FieldSpec {
        key: "industry",
        output_key: "industry",
        aliases: &[],
        description: "**industry**: Be specific (e.g., 'Enterprise SaaS - Customer Relationship Management' not just 'Software')",
    },
    FieldSpec {
        key: "vertical",
        output_key: "vertical",
        aliases: &[],
        description: "**vertical**: The specific market vertical or sector they serve (e.g., 'Healthcare Technology', 'Financial Services', 'E-commerce')",
    },
    FieldSpec {
        key: "employeeCount",
        output_key: "employeeCount",
        aliases: &["employees", "employee_count"],
        description: "**employeeCount**: Research current count, use ranges: '1-10', '11-50', '51-200', '201-500', '501-1000', '1001-5000', '5001-10000', '10000+'",
    },
    FieldSpec {
        key: "hq",
        output_key: "headquarters",
        aliases: &["headquarters"],
        description: "**headquarters**: Full address format 'City, State/Province, Country' (e.g., 'San Francisco, California, USA')",
    },
    FieldSpec {
        key: "hqCountry",
        output_key: "hqCountry",
        aliases: &["hq_country"],
        description: "**hqCountry**: Country where headquarters is located (e.g., 'USA', 'United Kingdom', 'Germany')",
    },
    FieldSpec {
        key: "description",
        output_key: "description",
        aliases: &[],
        description: "**description**: Write 2-3 detailed sentences covering what products/services they offer and their target market",
    },
    FieldSpec {
        key: "shortDescription",
        output_key: "shortDescription",
        aliases: &["short_description"],
        description: "**shortDescription**: Write 1 concise sentence (max 15 words) describing what the company does",
    },
    FieldSpec {
        key: "founded",
        output_key: "founded",
        aliases: &[],
        description: "**founded**: Exact founding year if available (e.g., '2010')",
    },
    FieldSpec {
        key: "foundedCountry",
        output_key: "foundedCountry",
        aliases: &["founded_country"],
        description: "**foundedCountry**: Country where the company was founded (e.g., 'USA', 'United Kingdom', 'China')",
    },
    FieldSpec {
        key: "revenue",
        output_key: "revenue",
        aliases: &[],
        description: "**revenue**: Annual revenue with currency if available, use ranges: '<$1M', '$1M-5M', '$5M-10M', '$10M-50M', '$50M-100M', '$100M-500M', '$500M-1B', '$1B+'",
    },
    FieldSpec {
        key: "funding",
        output_key: "funding",
        aliases: &[],
        description: "**funding**: Total funding raised if available (e.g., '$50M', '$100M', 'Bootstrapped')",
    },
    FieldSpec {
        key: "fundingType",
        output_key: "fundingType",
        aliases: &["funding_type"],
        description: "**fundingType**: Latest funding round type if available (e.g., 'Series A', 'Series B', 'IPO', 'Acquired', 'Bootstrapped')",
    },
    FieldSpec {
        key: "fundingStage",
        output_key: "fundingStage",
        aliases: &["funding_stage"],
        description: "**fundingStage**: Current funding stage, choose from: 'Pre-seed', 'Seed', 'Series A', 'Series B', 'Series C', 'Series D', 'Series E', 'Series F', 'Series G', 'Growth', 'Established', 'Unknown', 'N/A', 'None', 'Not Applicable'",
    },
    FieldSpec {
        key: "businessType",
        output_key: "businessType",
        aliases: &["business_type"],
        description: "**businessType**: Classify as one of: 'Digital Native' (born in cloud, selling primarily digitally), 'Digitally Transformed' (traditional business adapted to digital), or 'Traditional' (primarily offline/physical operations)",
    },
    FieldSpec {
        key: "revenueModel",
        output_key: "revenueModel",
        aliases: &["revenue_model"],
        description: "**revenueModel**: Primary revenue model (e.g., 'Subscription', 'B2B Sales', 'B2C Sales', 'Commission', 'Transaction Fees', 'Advertising', 'Freemium', 'Marketplace', 'Licensing', 'Hybrid')",
    },
    FieldSpec {
        key: "companyStage",
        output_key: "companyStage",
        aliases: &["company_stage"],
        description: "**companyStage**: Company maturity stage, choose from: 'Startup' (early stage, scaling), 'Growth' (rapidly expanding), or 'Established' (mature, stable operations)",
    },
];

/// Looks up a single request key (canonical or alias).
pub fn lookup(key: &str) -> Option<&'static FieldSpec> {
    FIELD_CATALOG.iter().find(|spec| spec.matches(key))
}

/// Resolves request keys to catalog entries.
///
/// Keeps the caller's order of first occurrence. Unknown keys and repeated
/// keys (including an alias of a key already seen) are dropped silently.
pub fn resolve<S: AsRef<str>>(keys: &[S]) -> Vec<&'static FieldSpec> {
    let mut resolved: Vec<&'static FieldSpec> = Vec::with_capacity(keys.len());
    for key in keys {
        match lookup(key.as_ref().trim()) {
            Some(spec) if !resolved.iter().any(|seen| seen.key == spec.key) => {
                resolved.push(spec)
            }
            Some(_) => {}
            None => tracing::debug!("Ignoring unknown enrichment field '{}'", key.as_ref()),
        }
    }
    resolved
}

/// Returns the research instruction for each known key, in request order.
pub fn describe<S: AsRef<str>>(keys: &[S]) -> Vec<&'static str> {
    resolve(keys).into_iter().map(|spec| spec.description).collect()
}
