mod common;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rubrica::config::ProviderKind;

use common::{anthropic_reply, app, error_message, openai_reply, post_json, request, send, test_config};

#[tokio::test]
async fn test_anthropic_reply_is_passed_through_as_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "max_tokens": 5000,
            "messages": [{ "role": "user", "content": "hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply("hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(test_config(ProviderKind::Anthropic, Some(server.uri())));
    let (status, _, body) = send(
        app,
        post_json("/api/generate", &json!({ "prompt": "hello", "maxTokens": 5000 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"][0]["type"], "text");
    assert_eq!(body["content"][0]["text"], "hi there");
}

#[tokio::test]
async fn test_both_providers_produce_the_same_envelope() {
    let anthropic = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply("same text")))
        .mount(&anthropic)
        .await;

    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("same text")))
        .mount(&openai)
        .await;

    let body = json!({ "prompt": "x" });
    let (status_a, _, from_anthropic) = send(
        app(test_config(ProviderKind::Anthropic, Some(anthropic.uri()))),
        post_json("/api/generate", &body),
    )
    .await;
    let (status_o, _, from_openai) = send(
        app(test_config(ProviderKind::OpenAI, Some(openai.uri()))),
        post_json("/api/generate", &body),
    )
    .await;

    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_o, StatusCode::OK);
    assert_eq!(from_anthropic, from_openai);
    assert_eq!(
        from_openai,
        json!({ "content": [{ "type": "text", "text": "same text" }] })
    );
}

#[tokio::test]
async fn test_max_tokens_defaults_to_3000() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "max_tokens": 3000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(test_config(ProviderKind::OpenAI, Some(server.uri())));
    let (status, _, _) = send(app, post_json("/api/generate", &json!({ "prompt": "x" }))).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_prompt_is_rejected_before_any_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let app = app(test_config(ProviderKind::Anthropic, Some(server.uri())));
    let (status, _, body) = send(app.clone(), post_json("/api/generate", &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "プロンプトが指定されていません");

    let (status, _, _) = send(app, post_json("/api/generate", &json!({ "prompt": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_credential_is_500() {
    let mut config = test_config(ProviderKind::OpenAI, Some("http://127.0.0.1:9".to_string()));
    config.provider.api_key = None;

    let (status, _, body) = send(
        app(config),
        post_json("/api/generate", &json!({ "prompt": "x" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(&body), "APIキーが設定されていません");
}

#[tokio::test]
async fn test_upstream_error_status_and_message_are_relayed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "type": "error",
            "error": { "type": "rate_limit_error", "message": "Rate limited" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(test_config(ProviderKind::Anthropic, Some(server.uri())));
    let (status, _, body) = send(app, post_json("/api/generate", &json!({ "prompt": "x" }))).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_message(&body), "Rate limited");
}

#[tokio::test]
async fn test_upstream_error_without_message_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let app = app(test_config(ProviderKind::OpenAI, Some(server.uri())));
    let (status, _, body) = send(app, post_json("/api/generate", &json!({ "prompt": "x" }))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_message(&body), "API呼び出しに失敗しました");
}

#[tokio::test]
async fn test_unreachable_upstream_is_500() {
    // Nothing listens on port 1.
    let uri = "http://127.0.0.1:1".to_string();

    let app = app(test_config(ProviderKind::Anthropic, Some(uri)));
    let (status, _, body) = send(app, post_json("/api/generate", &json!({ "prompt": "x" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!error_message(&body).is_empty());
}

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let app = app(test_config(ProviderKind::Anthropic, None));
    let (status, _, body) = send(app, request(Method::GET, "/api/generate", "")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error_message(&body), "Method not allowed");
}

#[tokio::test]
async fn test_options_is_ok_with_empty_body() {
    let app = app(test_config(ProviderKind::Anthropic, None));
    let (status, _, body) = send(app, request(Method::OPTIONS, "/api/generate", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::Value::Null);
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let app = app(test_config(ProviderKind::Anthropic, None));
    let preflight = axum::http::Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/generate")
        .header("origin", "https://school.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, headers, _) = send(app, preflight).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["access-control-allow-origin"], "*");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("OPTIONS"));
}

#[tokio::test]
async fn test_health_reports_provider() {
    let mut config = test_config(ProviderKind::OpenAI, None);
    config.provider.api_key = None;

    let (status, _, body) = send(app(config), request(Method::GET, "/api/health", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["provider"]["name"], "openai");
    assert_eq!(body["provider"]["model"], "gpt-4o-mini");
    assert_eq!(body["provider"]["credentialConfigured"], false);
    assert_eq!(body["notifier"]["webhookConfigured"], false);
}

#[tokio::test]
async fn test_openapi_document_lists_endpoints() {
    let app = app(test_config(ProviderKind::Anthropic, None));
    let (status, _, body) = send(app, request(Method::GET, "/api/openapi.json", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/generate").is_some());
    assert!(body["paths"].get("/api/notify").is_some());
    assert!(body["paths"].get("/api/health").is_some());
}

#[tokio::test]
async fn test_openai_compatible_reply_with_nonstandard_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                {
                    "message": { "role": "assistant", "content": "local model text" },
                    "finish_reason": "eos_token"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(test_config(ProviderKind::OpenAI, Some(server.uri())));
    let (status, _, body) = send(app, post_json("/api/generate", &json!({ "prompt": "x" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "content": [{ "type": "text", "text": "local model text" }] })
    );
}
