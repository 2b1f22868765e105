//! # 服务商网关集成测试
//!
//! 用 wiremock 模拟三种线协议的上游，验证请求形状、
//! 回复提取、错误传播与追踪记录

use std::sync::Arc;

use asset_gateway::config::Settings;
use asset_gateway::error::GatewayError;
use asset_gateway::providers::{ChatArgs, ProviderGateway};
use asset_gateway::trace::{TraceKind, TraceStore};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway() -> (ProviderGateway, Arc<TraceStore>) {
    let trace = Arc::new(TraceStore::default());
    (
        ProviderGateway::new(reqwest::Client::new(), trace.clone()),
        trace,
    )
}

fn chat_args(provider: &str, base_url: &str, model: &str) -> ChatArgs {
    ChatArgs {
        provider: provider.to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url.to_string()),
        model: model.to_string(),
        temperature: 0.3,
        system: Some("be brief".to_string()),
        prompt: "hello".to_string(),
    }
}

#[tokio::test]
async fn test_openai_chat_roundtrip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.3,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "hi there"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, trace) = gateway();
    let reply = gateway
        .chat(&chat_args("openai", &server.uri(), "gpt-4o-mini"))
        .await
        .unwrap();

    assert_eq!(reply.content, "hi there");

    let items = trace.list(Some(TraceKind::Ai), 10);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].ok, Some(true));
    assert_eq!(items[0].status, Some(200));
    assert_eq!(items[0].provider.as_deref(), Some("openai"));
    assert!(items[0].duration_ms.is_some());
}

#[tokio::test]
async fn test_anthropic_chat_uses_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "max_tokens": 1024,
            "system": "be brief",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "text", "text": "Bonjour"},
                {"type": "text", "text": " !"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, _trace) = gateway();
    let reply = gateway
        .chat(&chat_args("anthropic", &server.uri(), "claude-3-5-haiku-latest"))
        .await
        .unwrap();

    assert_eq!(reply.content, "Bonjour !");
}

#[tokio::test]
async fn test_gemini_chat_key_in_query_and_folded_system() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "be brief\n\nhello"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "salut"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, trace) = gateway();
    let reply = gateway
        .chat(&chat_args("gemini", &server.uri(), "gemini-1.5-flash"))
        .await
        .unwrap();

    assert_eq!(reply.content, "salut");

    // 追踪到的 URL 不包含密钥
    let items = trace.list(Some(TraceKind::Ai), 10);
    assert!(!items[0].url.as_deref().unwrap().contains("key="));
}

#[tokio::test]
async fn test_chat_non_2xx_surfaces_upstream_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "type": "rate_limit_error"}
        })))
        .mount(&server)
        .await;

    let (gateway, trace) = gateway();
    let err = gateway
        .chat(&chat_args("openai", &server.uri(), "gpt-4o-mini"))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Upstream { status: 429, .. }));
    assert_eq!(err.to_string(), "Rate limit reached");

    // 失败的调用同样被追踪
    let items = trace.list(Some(TraceKind::Ai), 10);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].ok, Some(false));
    assert_eq!(items[0].status, Some(429));
    assert!(items[0].error.is_some());
}

#[tokio::test]
async fn test_list_models_filters_and_sorts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Bearer sk-live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "gpt-4o"},
                {"id": "text-davinci-003"},
                {"id": "gpt-4.1-mini"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, trace) = gateway();
    let settings = Settings {
        openai_key: Some("sk-live".to_string()),
        openai_base: Some(server.uri()),
        ..Default::default()
    };

    let models = gateway.list_models(&settings, "openai").await.unwrap();
    let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["gpt-4.1-mini", "gpt-4o"]);

    let items = trace.list(Some(TraceKind::Models), 10);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].ok, Some(true));
}

#[tokio::test]
async fn test_list_models_without_key_returns_fallback() {
    let (gateway, trace) = gateway();
    let models = gateway
        .list_models(&Settings::default(), "openai")
        .await
        .unwrap();

    assert!(!models.is_empty());
    // 无凭据时不发起调用，也不产生追踪记录
    assert!(trace.is_empty());
}

#[tokio::test]
async fn test_list_models_upstream_failure_degrades_to_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (gateway, trace) = gateway();
    let settings = Settings {
        openai_key: Some("sk-live".to_string()),
        openai_base: Some(server.uri()),
        ..Default::default()
    };

    let models = gateway.list_models(&settings, "openai").await.unwrap();
    assert!(!models.is_empty());

    let items = trace.list(Some(TraceKind::Models), 10);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].ok, Some(false));
    assert_eq!(items[0].status, Some(500));
}

#[tokio::test]
async fn test_curated_lists_for_providers_without_endpoint() {
    let (gateway, trace) = gateway();

    let anthropic = gateway
        .list_models(&Settings::default(), "anthropic")
        .await
        .unwrap();
    assert!(anthropic.iter().any(|m| m.id.starts_with("claude-")));

    let gemini = gateway
        .list_models(&Settings::default(), "gemini")
        .await
        .unwrap();
    assert!(gemini.iter().any(|m| m.id.starts_with("gemini-")));

    assert!(trace.is_empty());
}
