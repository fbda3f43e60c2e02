/// Research brief construction shared by every provider.
use crate::fields;

/// Instruction every brief opens with.
pub const COMPANY_NAME_INSTRUCTION: &str =
    "**companyName**: Full official company name (legal name if different from brand)";

/// Closing instruction asking for a bare JSON answer.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY valid JSON with the requested fields. Be thorough and specific. If a field is not available, omit it from the response or use null.";

/// Builds the numbered research brief for `domain`.
///
/// Item 1 always asks for the company name; items 2..N+1 are the catalog
/// descriptions of the requested fields in request order. Unknown keys add
/// nothing. The output is deterministic for a given `(domain, fields)` pair.
pub fn build_prompt<S: AsRef<str>>(domain: &str, fields: &[S]) -> String {
    let mut prompt = format!(
        "Research the company with domain \"{}\" thoroughly. Visit their website, check company databases, and recent news. Provide comprehensive, specific information:\n\n1. {}\n",
        domain, COMPANY_NAME_INSTRUCTION
    );

    for (i, description) in fields::describe(fields).into_iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 2, description));
    }

    prompt.push('\n');
    prompt.push_str(JSON_ONLY_INSTRUCTION);
    prompt
}
