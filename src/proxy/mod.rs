//! # 通用 REST 转发
//!
//! 手动请求构造器使用的独立出口：调用方完全控制出站请求，
//! 不施加后端/服务商网关的归一化与路径规则。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, Result};
use crate::trace::{TraceItem, TraceKind, TraceStore};

/// 调用方提供的完整请求描述
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxyRequest {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

/// 转发结果
///
/// 响应体始终先整体读取为文本，再尝试 JSON 解析；
/// 解析失败时 `json` 为 `null`，从不报错。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub text: String,
    pub json: Option<Value>,
}

/// 通用转发器
pub struct GenericProxy {
    http: reqwest::Client,
    trace: Arc<TraceStore>,
}

impl GenericProxy {
    /// 以共享 HTTP 客户端和追踪存储创建转发器
    pub fn new(http: reqwest::Client, trace: Arc<TraceStore>) -> Self {
        Self { http, trace }
    }

    /// 转发一次任意 HTTP 请求
    pub async fn forward(&self, request: &ProxyRequest) -> Result<ProxyResponse> {
        let method: Method = request
            .method
            .trim()
            .to_ascii_uppercase()
            .parse()
            .map_err(|_| {
                GatewayError::malformed(format!("invalid HTTP method: {}", request.method))
            })?;
        if request.url.trim().is_empty() {
            return Err(GatewayError::malformed("url is required"));
        }

        let mut builder = self.http.request(method.clone(), request.url.trim());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        // GET/HEAD 忽略请求体
        let sends_body = !matches!(method, Method::GET | Method::HEAD);
        if sends_body && let Some(body) = &request.body {
            let (payload, default_content_type) = serialize_body(body)?;
            if !has_content_type(&request.headers) {
                builder = builder.header("content-type", default_content_type);
            }
            builder = builder.body(payload);
        }

        let mut item = TraceItem::new(TraceKind::Rest)
            .with_label(format!("{method} {}", request.url.trim()))
            .with_call(method.to_string(), request.url.trim());
        if sends_body && let Some(body) = &request.body {
            item = item.with_request(body.clone());
        }

        let started = Instant::now();
        let response = builder.send().await;
        let duration_ms = elapsed_ms(started);

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                self.trace.record(
                    item.with_outcome(false, Some(0), duration_ms)
                        .with_error(err.to_string()),
                );
                return Err(GatewayError::transport(err));
            }
        };

        let status = response.status();
        let status_text = status
            .canonical_reason()
            .unwrap_or_default()
            .to_string();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let text = response.text().await.unwrap_or_default();
        let json: Option<Value> = serde_json::from_str(&text).ok();

        let result = ProxyResponse {
            ok: status.is_success(),
            status: status.as_u16(),
            status_text,
            headers,
            text,
            json,
        };

        self.trace.record(
            item.with_outcome(result.ok, Some(result.status), duration_ms)
                .with_response(
                    result
                        .json
                        .clone()
                        .unwrap_or_else(|| Value::String(result.text.clone())),
                ),
        );

        Ok(result)
    }
}

/// 序列化请求体：字符串原样透传，结构化值 JSON 编码
fn serialize_body(body: &Value) -> Result<(String, &'static str)> {
    match body {
        Value::String(text) => Ok((text.clone(), "text/plain")),
        other => {
            let payload = serde_json::to_string(other)
                .map_err(|err| GatewayError::malformed(format!("body serialization: {err}")))?;
            Ok((payload, "application/json"))
        }
    }
}

/// 调用方是否已显式设置 content-type（不区分大小写）
fn has_content_type(headers: &HashMap<String, String>) -> bool {
    headers
        .keys()
        .any(|name| name.eq_ignore_ascii_case("content-type"))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
