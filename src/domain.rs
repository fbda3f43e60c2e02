/// Domain normalization and extraction helpers.
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[a-zA-Z0-9._%+-]+@([a-zA-Z0-9.-]+\.[a-zA-Z]{2,})").expect("valid email regex")
    })
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:https?://)?(?:www\.)?([a-zA-Z0-9.-]+\.[a-zA-Z]{2,})")
            .expect("valid url regex")
    })
}

/// Lower-cases a domain and strips any leading `www.` labels.
///
/// Idempotent: `normalize_domain(normalize_domain(d)) == normalize_domain(d)`.
pub fn normalize_domain(domain: &str) -> String {
    let lowered = domain.to_lowercase();
    let mut rest = lowered.trim();
    while let Some(stripped) = rest.strip_prefix("www.") {
        rest = stripped.trim_start();
    }
    rest.to_string()
}

/// Pulls a host name out of an e-mail address, a URL or a bare domain.
///
/// Returns the lower-cased host, or `None` when the value holds nothing
/// that looks like a domain.
pub fn extract_domain(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(caps) = email_regex().captures(value) {
        return Some(caps[1].to_lowercase());
    }

    url_regex()
        .captures(value)
        .map(|caps| caps[1].to_lowercase())
}
