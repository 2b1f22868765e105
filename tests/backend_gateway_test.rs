//! # Maximo 后端网关集成测试

use std::sync::Arc;

use asset_gateway::backend::BackendGateway;
use asset_gateway::config::Settings;
use asset_gateway::error::GatewayError;
use asset_gateway::trace::{TraceKind, TraceStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway() -> (BackendGateway, Arc<TraceStore>) {
    let trace = Arc::new(TraceStore::default());
    (
        BackendGateway::new(reqwest::Client::new(), trace.clone()),
        trace,
    )
}

fn settings(base: &str) -> Settings {
    Settings {
        backend_url: Some(base.to_string()),
        backend_api_key: Some("mx-secret".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_call_sends_both_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/os/mxapiasset"))
        .and(header("apikey", "mx-secret"))
        .and(header("mxapiapikey", "mx-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "member": [{"assetnum": "A-100"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, trace) = gateway();
    let data = gateway
        .call(&settings(&server.uri()), "/api/os/mxapiasset", "GET", None)
        .await
        .unwrap();

    assert_eq!(data["member"][0]["assetnum"], "A-100");

    let items = trace.list(Some(TraceKind::Backend), 10);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].ok, Some(true));
    assert_eq!(items[0].provider.as_deref(), Some("maximo"));
    assert_eq!(items[0].method.as_deref(), Some("GET"));
}

#[tokio::test]
async fn test_base_url_suffix_is_normalized_away() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/os/mxapiwodetail"))
        .and(query_param("oslc.pageSize", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"member": []})))
        .expect(1)
        .mount(&server)
        .await;

    // 用户把 /oslc 子路径存进了 base URL，调用时必须剥掉
    let base = format!("{}/oslc/os/mxapiasset", server.uri());
    let (gateway, _trace) = gateway();
    gateway
        .call(
            &settings(&base),
            "/api/os/mxapiwodetail?oslc.pageSize=5",
            "GET",
            None,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_post_body_is_forwarded_and_traced() {
    let server = MockServer::start().await;
    let body = json!({"description": "pump inspection"});
    Mock::given(method("POST"))
        .and(path("/api/os/mxapiwodetail"))
        .and(body_json(body.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"wonum": "W-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, trace) = gateway();
    gateway
        .call(
            &settings(&server.uri()),
            "/api/os/mxapiwodetail",
            "post",
            Some(body.clone()),
        )
        .await
        .unwrap();

    let items = trace.list(Some(TraceKind::Backend), 10);
    assert_eq!(items[0].request, Some(body));
    assert_eq!(items[0].status, Some(201));
}

#[tokio::test]
async fn test_non_2xx_raises_with_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/os/mxapiasset"))
        .respond_with(ResponseTemplate::new(404).set_body_string("BMXAA8727E not found"))
        .mount(&server)
        .await;

    let (gateway, trace) = gateway();
    let err = gateway
        .call(&settings(&server.uri()), "/api/os/mxapiasset", "GET", None)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Upstream { status: 404, .. }));
    assert!(err.to_string().contains("BMXAA8727E"));

    let items = trace.list(Some(TraceKind::Backend), 10);
    assert_eq!(items[0].ok, Some(false));
    assert_eq!(items[0].status, Some(404));
}

#[tokio::test]
async fn test_missing_credentials_fail_before_network() {
    let (gateway, trace) = gateway();
    let err = gateway
        .call(&Settings::default(), "/api/os/mxapiasset", "GET", None)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Config { .. }));
    assert!(trace.is_empty());
}

#[tokio::test]
async fn test_generic_credentials_do_not_leak_to_backend() {
    // 通用字段选中的是别的服务商，不得被后端复用
    let settings = Settings {
        provider: Some("openai".to_string()),
        api_key: Some("sk-generic".to_string()),
        base_url: Some("https://api.openai.com/v1".to_string()),
        ..Default::default()
    };

    let (gateway, _trace) = gateway();
    let err = gateway
        .call(&settings, "/api/os/mxapiasset", "GET", None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("base URL"));
}
