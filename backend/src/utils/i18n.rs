//! Internationalization utilities for the backend
//!
//! This module provides locale extraction from HTTP requests and
//! task-local storage for the locale of the request being served.

use std::future::Future;

tokio::task_local! {
    static CURRENT_LOCALE: String;
}

/// Supported locales
pub const SUPPORTED_LOCALES: &[&str] = &["en", "ko"];
pub const DEFAULT_LOCALE: &str = "en";

/// Run `fut` with `locale` as the current locale.
///
/// Everything awaited inside the future, including the conversion of
/// handler errors into responses, observes the same locale.
pub async fn with_locale<F>(locale: String, fut: F) -> F::Output
where
    F: Future,
{
    CURRENT_LOCALE.scope(locale, fut).await
}

/// Get the locale of the current request, or the default outside of one
pub fn get_locale() -> String {
    CURRENT_LOCALE
        .try_with(|l| l.clone())
        .unwrap_or_else(|_| DEFAULT_LOCALE.to_string())
}

/// Normalize locale string to supported format
/// Accepts: "ko", "ko-KR", "ko_KR", "en", "en-US", "ko-KR,ko;q=0.9", etc.
fn normalize_locale(locale: &str) -> String {
    let locale = locale.trim().to_lowercase();

    let primary = locale
        .split(['-', '_', ',', ';'])
        .next()
        .unwrap_or(DEFAULT_LOCALE);

    SUPPORTED_LOCALES
        .iter()
        .find(|supported| primary.starts_with(*supported))
        .unwrap_or(&DEFAULT_LOCALE)
        .to_string()
}

/// Extract locale from Accept-Language header value
pub fn extract_locale_from_header(header_value: Option<&str>) -> String {
    match header_value {
        Some(value) => normalize_locale(value),
        None => DEFAULT_LOCALE.to_string(),
    }
}
