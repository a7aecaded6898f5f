//! Bilingual keyword normalization and compliance checks
//!
//! The canonical keyword form is `"<Korean phrase> (<local phrase>)"`. A
//! keyword is compliant when it has that shape and its local phrase is
//! written in the script expected for the destination country.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::country::CountryBucket;
use super::models::RawKeyword;

static FORMATTED_KEYWORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*\((.+)\)$").unwrap());

/// Lowercase Vietnamese letters carrying a diacritic or tone mark
const VIETNAMESE_LETTERS: &str = "ăâđêôơưáàảãạấầẩẫậắằẳẵặéèẻẽẹếềểễệíìỉĩịóòỏõọốồổỗộớờởỡợúùủũụứừửữựýỳỷỹỵ";

/// At least one CJK Unified Ideograph
pub fn is_chinese_text(text: &str) -> bool {
    text.chars().any(|c| ('\u{4E00}'..='\u{9FFF}').contains(&c))
}

/// At least one Vietnamese-specific letter, in either case
pub fn is_vietnamese_text(text: &str) -> bool {
    text.chars()
        .flat_map(char::to_lowercase)
        .any(|c| VIETNAMESE_LETTERS.contains(c))
}

pub fn local_language_valid(local: &str, country: &str) -> bool {
    match CountryBucket::from_country(country) {
        CountryBucket::China => is_chinese_text(local),
        CountryBucket::Vietnam => is_vietnamese_text(local),
        CountryBucket::Other => !local.trim().is_empty(),
    }
}

/// Split `"<A> (<B>)"` into its trimmed halves
fn split_formatted(text: &str) -> Option<(String, String)> {
    let caps = FORMATTED_KEYWORD_REGEX.captures(text)?;
    Some((caps[1].trim().to_string(), caps[2].trim().to_string()))
}

fn structured_parts(ko: &str, local: &str) -> Option<(String, String)> {
    Some((ko.trim().to_string(), local.trim().to_string()))
}

fn formatted_parts(text: &str) -> Option<(String, String)> {
    split_formatted(text.trim())
}

/// Normalize model keywords into canonical, de-duplicated strings.
///
/// Entries whose halves are empty or whose local half fails the country's
/// script check are dropped. Order of first appearance is kept.
pub fn normalize_keywords(raw: &[RawKeyword], country: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    raw.iter()
        .filter_map(|item| match item {
            RawKeyword::Structured { ko, local } => structured_parts(ko, local),
            RawKeyword::Formatted { text } => formatted_parts(text),
        })
        .filter(|(ko, local)| {
            !ko.is_empty() && !local.is_empty() && local_language_valid(local, country)
        })
        .map(|(ko, local)| format!("{} ({})", ko, local))
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Whether every keyword is bilingual and valid for `country`.
/// An empty list is never compliant.
pub fn is_compliant(list: &[String], country: &str) -> bool {
    !list.is_empty()
        && list.iter().all(|item| {
            split_formatted(item).is_some_and(|(_, local)| local_language_valid(&local, country))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatted(text: &str) -> RawKeyword {
        RawKeyword::Formatted { text: text.to_string() }
    }

    fn structured(ko: &str, local: &str) -> RawKeyword {
        RawKeyword::Structured { ko: ko.to_string(), local: local.to_string() }
    }

    #[test]
    fn test_script_checks() {
        assert!(is_chinese_text("登山鞋"));
        assert!(is_chinese_text("abc 鞋"));
        assert!(!is_chinese_text("hiking shoes"));
        assert!(!is_chinese_text("등산화"));

        assert!(is_vietnamese_text("điện thoại"));
        assert!(is_vietnamese_text("ĐIỆN THOẠI"));
        assert!(!is_vietnamese_text("smartphone"));
    }

    #[test]
    fn test_local_language_valid_by_country() {
        assert!(local_language_valid("登山鞋", "중국"));
        assert!(!local_language_valid("hiking shoes", "China"));
        assert!(local_language_valid("giày leo núi", "Vietnam"));
        assert!(!local_language_valid("hiking shoes", "베트남"));
        assert!(local_language_valid("hiking shoes", "Japan"));
        assert!(!local_language_valid("   ", "Japan"));
    }

    #[test]
    fn test_structured_round_trip() {
        let out = normalize_keywords(&[structured("등산화", "登山鞋")], "중국");
        assert_eq!(out, vec!["등산화 (登山鞋)".to_string()]);
        assert!(is_compliant(&out, "중국"));
    }

    #[test]
    fn test_formatted_entries_are_reformatted() {
        let out = normalize_keywords(&[formatted("  트레킹화(徒步鞋) ")], "China");
        assert_eq!(out, vec!["트레킹화 (徒步鞋)".to_string()]);
    }

    #[test]
    fn test_deduplicates_preserving_order() {
        let raw = vec![formatted("A (가)"), formatted("A (가)"), formatted("B (나)")];
        let out = normalize_keywords(&raw, "Japan");
        assert_eq!(out, vec!["A (가)".to_string(), "B (나)".to_string()]);
    }

    #[test]
    fn test_drops_invalid_entries() {
        let raw = vec![
            structured("등산화", "hiking shoes"),
            structured("", "登山鞋"),
            structured("등산화", "  "),
            formatted("등산화"),
            formatted("등산화 (hiking shoes)"),
            formatted("방수 등산화 (防水登山鞋)"),
        ];
        let out = normalize_keywords(&raw, "중국");
        assert_eq!(out, vec!["방수 등산화 (防水登山鞋)".to_string()]);
        for item in &out {
            let (_, local) = split_formatted(item).unwrap();
            assert!(local_language_valid(&local, "중국"));
        }
    }

    #[test]
    fn test_is_compliant() {
        assert!(!is_compliant(&[], "중국"));
        assert!(!is_compliant(&[], "Japan"));
        assert!(is_compliant(&["스마트폰 (điện thoại thông minh)".to_string()], "Vietnam"));
        assert!(!is_compliant(
            &["스마트폰 (điện thoại thông minh)".to_string(), "게이밍폰".to_string()],
            "Vietnam"
        ));
        assert!(!is_compliant(&["등산화 (hiking shoes)".to_string()], "China"));
    }
}
