/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs
use domain_enrichment_api::core::extractor::extract_json;
use domain_enrichment_api::domain::normalize_domain;
use domain_enrichment_api::fields::FIELD_CATALOG;
use domain_enrichment_api::prompt::{build_prompt, COMPANY_NAME_INSTRUCTION};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn catalog_keys() -> Vec<&'static str> {
    FIELD_CATALOG.iter().map(|spec| spec.key).collect()
}

/// Lines of the brief that start with `<n>. `.
fn numbered_items(prompt: &str) -> Vec<&str> {
    prompt
        .lines()
        .filter(|line| {
            line.split_once(". ")
                .map_or(false, |(n, _)| n.parse::<usize>().is_ok())
        })
        .collect()
}

// Property: Domain normalization is idempotent
proptest! {
    #[test]
    fn normalize_is_idempotent(domain in "\\PC{0,40}") {
        let once = normalize_domain(&domain);
        prop_assert_eq!(normalize_domain(&once), once);
    }

    #[test]
    fn normalize_strips_any_www_casing(
        prefix in prop::sample::select(vec!["www.", "WWW.", "Www.", ""]),
        host in "[a-zA-Z][a-zA-Z0-9-]{0,15}\\.[a-zA-Z]{2,6}"
    ) {
        prop_assume!(!host.to_lowercase().starts_with("www."));
        let normalized = normalize_domain(&format!("{}{}", prefix, host));
        prop_assert_eq!(normalized, host.to_lowercase());
    }
}

// Property: Extractor recovers any object embedded in brace-free prose
proptest! {
    #[test]
    fn extract_recovers_embedded_object(
        entries in prop::collection::btree_map("[a-zA-Z]{1,12}", "\\PC{0,30}", 0..6),
        prefix in "[a-zA-Z0-9 .,!?:\\n`]{0,40}",
        suffix in "[a-zA-Z0-9 .,!?:\\n`]{0,40}"
    ) {
        let object: Map<String, Value> = entries
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        let raw = format!("{}{}{}", prefix, Value::Object(object.clone()), suffix);

        let extracted = extract_json(&raw);
        prop_assert_eq!(extracted, Ok(object));
    }

    #[test]
    fn extract_never_panics(raw in "\\PC*") {
        let _ = extract_json(&raw);
    }

    #[test]
    fn brace_free_text_is_parse_failure(raw in "[a-zA-Z ,.!?]{0,200}") {
        prop_assert!(extract_json(&raw).is_err());
    }
}

// Property: Prompt lists exactly the known fields, in request order
proptest! {
    #[test]
    fn prompt_lists_known_fields_in_order(
        known in prop::sample::subsequence(catalog_keys(), 0..=16).prop_shuffle(),
        unknown in prop::collection::vec("zz[a-z]{1,8}", 0..4)
    ) {
        // Interleave unknown keys; they must contribute nothing.
        let mut fields: Vec<String> = Vec::new();
        for (i, key) in known.iter().enumerate() {
            if let Some(bogus) = unknown.get(i) {
                fields.push(bogus.clone());
            }
            fields.push(key.to_string());
        }

        let prompt = build_prompt("example.com", &fields);
        let items = numbered_items(&prompt);

        prop_assert_eq!(items.len(), known.len() + 1);
        prop_assert_eq!(items[0], format!("1. {}", COMPANY_NAME_INSTRUCTION));

        for (i, key) in known.iter().enumerate() {
            let spec = FIELD_CATALOG.iter().find(|s| s.key == *key).unwrap();
            prop_assert_eq!(items[i + 1], format!("{}. {}", i + 2, spec.description));
        }
    }
}
