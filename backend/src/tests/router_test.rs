//! HTTP surface tests
//!
//! Requests go through the full router, middleware included.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use super::common::*;
use crate::build_router;
use crate::handlers::analyze::LIVENESS_MESSAGE;
use crate::services::market::AnalyzerSettings;

fn app(api: Arc<ScriptedApi>, settings: AnalyzerSettings) -> Router {
    build_router(build_state(api, settings))
}

fn post_analyze(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn assert_cors(response: &Response) {
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

#[tokio::test]
async fn test_liveness() {
    let response = app(Arc::new(ScriptedApi::default()), keyed())
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert_eq!(body_text(response).await, LIVENESS_MESSAGE);
}

#[tokio::test]
async fn test_preflight_on_any_path() {
    for path in ["/", "/analyze", "/unknown"] {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = app(Arc::new(ScriptedApi::default()), keyed()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT, "path {}", path);
        assert_cors(&response);
        assert!(body_text(response).await.is_empty());
    }
}

#[tokio::test]
async fn test_routing_errors() {
    let api = Arc::new(ScriptedApi::default());

    let response = app(api.clone(), keyed())
        .oneshot(Request::get("/analyze").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_cors(&response);
    assert_eq!(body_text(response).await, "Method Not Allowed");

    let response = app(api.clone(), keyed())
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Not Found");

    let response = app(api.clone(), keyed())
        .oneshot(Request::post("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(api.total_calls(), 0);
}

#[tokio::test]
async fn test_oversized_product_is_rejected_before_upstream() {
    let api = Arc::new(ScriptedApi::default());
    let body = json!({ "product": "가".repeat(200), "country": "중국" }).to_string();

    let response = app(api.clone(), keyed()).oneshot(post_analyze(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_cors(&response);
    assert_eq!(body_json(response).await["error"], "Input too long");
    assert_eq!(api.total_calls(), 0);
}

#[tokio::test]
async fn test_invalid_json_counts_as_missing_fields() {
    let api = Arc::new(ScriptedApi::default());

    let response = app(api.clone(), keyed()).oneshot(post_analyze("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing product or country");
    assert_eq!(api.total_calls(), 0);
}

#[tokio::test]
async fn test_missing_fields_message_follows_accept_language() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .header(header::ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9")
        .body(Body::from(r#"{"product":"등산화"}"#))
        .unwrap();

    let response = app(Arc::new(ScriptedApi::default()), keyed()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "제품 또는 국가가 입력되지 않았습니다");
}

#[tokio::test]
async fn test_missing_credential() {
    let api = Arc::new(ScriptedApi::default());
    let body = json!({ "product": "등산화", "country": "중국" }).to_string();

    let response = app(api.clone(), AnalyzerSettings::default())
        .oneshot(post_analyze(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(response).await;
    assert!(error["error"].as_str().unwrap().contains("GEMINI_API_KEY"));
    assert_eq!(api.total_calls(), 0);
}

#[tokio::test]
async fn test_fallback_keywords_end_to_end() {
    let english = json!({
        "keywords": ["hiking shoes", "trekking boots"],
        "platforms": ["Tmall", "JD.com"],
        "strategy": "가벼운 소재를 강조하세요."
    });
    let api = Arc::new(ScriptedApi::with_generations(vec![
        Ok(gemini_ok(english.clone())),
        Ok(gemini_ok(english)),
    ]));
    let body = json!({ "product": "등산화", "country": "중국" }).to_string();

    let response = app(api.clone(), forced("gemini-1.5-flash"))
        .oneshot(post_analyze(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    let analysis = body_json(response).await;
    assert_eq!(analysis["keywords"].as_array().unwrap().len(), 6);
    assert_eq!(analysis["keywords"][0], "등산화 (登山鞋)");
    assert_eq!(analysis["platforms"], json!(["Tmall", "JD.com"]));
    assert_eq!(analysis["meta"]["keywordBilingualComplete"], true);
    assert_eq!(analysis["meta"]["keywordLocalLanguage"], "Simplified Chinese");
    assert_eq!(analysis["meta"]["modelUsed"], "gemini-1.5-flash");
    assert_eq!(analysis["meta"]["forcedModel"], true);
    assert_eq!(api.generate_calls().len(), 2);
}

#[tokio::test]
async fn test_quota_error_carries_retry_hint() {
    let api = Arc::new(ScriptedApi::with_generations(vec![Ok(status_only(
        429,
        "Quota exceeded for metric. Please retry in 20s.",
    ))]));
    let body = json!({ "product": "등산화", "country": "중국" }).to_string();

    let response = app(api, forced("gemini-1.5-flash")).oneshot(post_analyze(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.headers()[header::RETRY_AFTER], "20");
    let error = body_json(response).await;
    assert_eq!(error["error"], "Gemini API error");
    assert_eq!(error["status"], 429);
    assert_eq!(error["model"], "gemini-1.5-flash");
    assert_eq!(error["retryAfterSeconds"], 20);
    assert!(error["hint"].as_str().unwrap().contains("20"));
}
