//! Curated keywords for a few known product/country pairs
//!
//! Used only when the model never produced compliant keywords.

use super::country::CountryBucket;

struct FallbackEntry {
    bucket: CountryBucket,
    /// Matched as a substring of the trimmed product name
    product: &'static str,
    keywords: [&'static str; 6],
}

const FALLBACK_TABLE: &[FallbackEntry] = &[
    FallbackEntry {
        bucket: CountryBucket::China,
        product: "등산화",
        keywords: [
            "등산화 (登山鞋)",
            "트레킹화 (徒步鞋)",
            "방수 등산화 (防水登山鞋)",
            "경량 등산화 (轻量登山鞋)",
            "아웃도어 신발 (户外鞋)",
            "미끄럼 방지 (防滑)",
        ],
    },
    FallbackEntry {
        bucket: CountryBucket::China,
        product: "샴푸",
        keywords: [
            "샴푸 (洗发水)",
            "두피 케어 (头皮护理)",
            "탈모 방지 (防脱发)",
            "무실리콘 (无硅油)",
            "약산성 샴푸 (弱酸性洗发水)",
            "손상모 케어 (受损发质护理)",
        ],
    },
    FallbackEntry {
        bucket: CountryBucket::Vietnam,
        product: "스마트폰",
        keywords: [
            "스마트폰 (điện thoại thông minh)",
            "가성비 스마트폰 (điện thoại giá tốt)",
            "게이밍폰 (điện thoại chơi game)",
            "카메라 성능 (camera chất lượng cao)",
            "5G 스마트폰 (điện thoại 5G)",
            "중저가 모델 (phân khúc tầm trung)",
        ],
    },
];

/// Curated keywords for `product` in `country`, or an empty list
pub fn fallback_for(product: &str, country: &str) -> Vec<String> {
    let bucket = CountryBucket::from_country(country);
    let product = product.trim();

    FALLBACK_TABLE
        .iter()
        .find(|entry| entry.bucket == bucket && product.contains(entry.product))
        .map(|entry| entry.keywords.iter().map(|k| k.to_string()).collect())
        .unwrap_or_default()
}
