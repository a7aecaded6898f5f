//! Prompt construction for the primary generation and the repair pass

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::country::expected_local_language;

const PRIMARY_PROMPT: &str = include_str!("primary_prompt.md");
const REPAIR_PROMPT: &str = include_str!("repair_prompt.md");

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Substitute `{name}` placeholders in a single pass.
/// Substituted values are never re-scanned; unknown placeholders stay as-is.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template.trim(), |caps: &Captures| {
            vars.iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn build_primary_prompt(product: &str, country: &str) -> String {
    render(
        PRIMARY_PROMPT,
        &[
            ("product", product),
            ("country", country),
            ("local_language", expected_local_language(country)),
        ],
    )
}

pub fn build_repair_prompt(keywords: &[String], country: &str) -> String {
    let encoded = serde_json::to_string(keywords).unwrap_or_else(|_| "[]".to_string());
    render(
        REPAIR_PROMPT,
        &[("keywords", encoded.as_str()), ("local_language", expected_local_language(country))],
    )
}
