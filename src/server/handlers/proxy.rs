//! # 通用转发处理器
//!
//! 可选地为命名后端注入凭据：`kind = "backend"` 注入 Maximo
//! 密钥头并强制目标 URL 落在已配置的后端根地址之内；
//! `kind = "ai"` 注入 Bearer 凭据；其余不做注入。

use std::collections::HashMap;

use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use crate::backend::{self, AUTH_HEADERS};
use crate::config::{Settings, credentials};
use crate::error::{GatewayError, Result};
use crate::proxy::ProxyRequest;
use crate::server::extract::Json;
use crate::server::state::AppState;

/// `POST /api/proxy` 请求体
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ProxyBody {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
    pub kind: Option<String>,
    /// 请求作用域设置
    pub settings: Option<Value>,
}

/// `POST /api/proxy`
pub async fn forward(
    State(state): State<AppState>,
    Json(body): Json<ProxyBody>,
) -> Result<Json<Value>> {
    let mut settings = state.config.get().await;
    if let Some(scoped) = body.settings {
        settings = settings.merged(&Settings::from_value(scoped));
    }

    let mut request = ProxyRequest {
        method: body.method,
        url: body.url,
        headers: body.headers,
        body: body.body,
    };

    match body.kind.as_deref() {
        Some("backend") => inject_backend_credentials(&settings, &mut request)?,
        Some("ai") => inject_ai_credentials(&settings, &mut request)?,
        _ => {}
    }

    let response = state.proxy.forward(&request).await?;
    Ok(Json(json!({ "status": response.status, "data": response })))
}

/// 注入 Maximo 密钥头并校验 URL 归属
fn inject_backend_credentials(settings: &Settings, request: &mut ProxyRequest) -> Result<()> {
    let auth = credentials::resolve(settings, backend::BACKEND_NAME);
    let base = auth
        .base_url
        .as_deref()
        .ok_or_else(|| GatewayError::config("Maximo base URL not configured"))?;
    let api_key = auth
        .api_key
        .as_deref()
        .ok_or_else(|| GatewayError::config("Maximo API key not configured"))?;

    ensure_within_base(&request.url, &backend::normalize_base_url(base))?;

    for header in AUTH_HEADERS {
        if !has_header(&request.headers, header) {
            request
                .headers
                .insert((*header).to_string(), api_key.to_string());
        }
    }
    Ok(())
}

/// 为通用选中的 AI 服务商注入 Bearer 凭据
fn inject_ai_credentials(settings: &Settings, request: &mut ProxyRequest) -> Result<()> {
    let provider = settings.selected_provider().unwrap_or("openai").to_string();
    let auth = credentials::resolve(settings, &provider);
    let api_key = auth
        .api_key
        .as_deref()
        .ok_or_else(|| GatewayError::config(format!("{provider} API key not configured")))?;

    if !has_header(&request.headers, "authorization") {
        request
            .headers
            .insert("authorization".to_string(), format!("Bearer {api_key}"));
    }
    Ok(())
}

/// 目标 URL 必须与后端根同源且路径在其之下
fn ensure_within_base(target: &str, base: &str) -> Result<()> {
    let base = Url::parse(base)
        .map_err(|_| GatewayError::config("configured Maximo base URL is invalid"))?;
    let target = Url::parse(target.trim())
        .map_err(|_| GatewayError::malformed(format!("invalid proxy URL: {target}")))?;

    let same_origin = target.scheme() == base.scheme()
        && target.host_str() == base.host_str()
        && target.port_or_known_default() == base.port_or_known_default();
    if !same_origin || !path_within(target.path(), base.path()) {
        return Err(GatewayError::malformed(
            "proxy URL is outside the configured Maximo base URL",
        ));
    }
    Ok(())
}

/// 路径等于基准路径，或在其段边界之下
///
/// 纯前缀比较会把 `/maximofake` 误认为 `/maximo` 之下。
fn path_within(target: &str, base: &str) -> bool {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return true;
    }
    match target.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// 头是否已存在（不区分大小写）
fn has_header(headers: &HashMap<String, String>, name: &str) -> bool {
    headers.keys().any(|key| key.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_settings() -> Settings {
        Settings {
            backend_url: Some("https://mx.example.com/maximo/oslc".into()),
            backend_api_key: Some("mxkey".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_backend_injection_adds_both_headers() {
        let mut request = ProxyRequest {
            method: "GET".into(),
            url: "https://mx.example.com/maximo/api/os/mxapiasset".into(),
            ..Default::default()
        };
        inject_backend_credentials(&backend_settings(), &mut request).unwrap();
        assert_eq!(request.headers.get("apikey").map(String::as_str), Some("mxkey"));
        assert_eq!(
            request.headers.get("mxapiapikey").map(String::as_str),
            Some("mxkey")
        );
    }

    #[test]
    fn test_backend_injection_rejects_sibling_path_prefix() {
        // 同源但路径只是字符串前缀重合，不在基准段之下
        let mut request = ProxyRequest {
            method: "GET".into(),
            url: "https://mx.example.com/maximofake/steal".into(),
            ..Default::default()
        };
        let err = inject_backend_credentials(&backend_settings(), &mut request).unwrap_err();
        assert!(err.to_string().contains("outside"));
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_path_within_requires_segment_boundary() {
        assert!(path_within("/maximo", "/maximo"));
        assert!(path_within("/maximo/api/os/mxapiasset", "/maximo"));
        assert!(path_within("/anything", "/"));
        assert!(!path_within("/maximofake/steal", "/maximo"));
        assert!(!path_within("/", "/maximo"));
    }

    #[test]
    fn test_backend_injection_rejects_foreign_url() {
        let mut request = ProxyRequest {
            method: "GET".into(),
            url: "https://evil.example.com/maximo/api/os/mxapiasset".into(),
            ..Default::default()
        };
        let err = inject_backend_credentials(&backend_settings(), &mut request).unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_backend_injection_keeps_caller_header() {
        let mut request = ProxyRequest {
            method: "GET".into(),
            url: "https://mx.example.com/maximo/api/os/mxapiasset".into(),
            ..Default::default()
        };
        request
            .headers
            .insert("APIKEY".to_string(), "caller-key".to_string());
        inject_backend_credentials(&backend_settings(), &mut request).unwrap();
        assert_eq!(request.headers.get("APIKEY").map(String::as_str), Some("caller-key"));
        assert!(!request.headers.contains_key("apikey"));
    }

    #[test]
    fn test_ai_injection_uses_selected_provider() {
        let settings = Settings {
            provider: Some("openai".into()),
            openai_key: Some("sk-abc".into()),
            ..Default::default()
        };
        let mut request = ProxyRequest {
            method: "GET".into(),
            url: "https://api.openai.com/v1/models".into(),
            ..Default::default()
        };
        inject_ai_credentials(&settings, &mut request).unwrap();
        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Bearer sk-abc")
        );
    }
}
