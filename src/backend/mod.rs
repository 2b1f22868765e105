//! # Maximo 后端网关
//!
//! 对资产/工单管理后端的对象结构 REST 调用。存储的基础 URL
//! 始终归一化为后端根地址，调用方只提供路径后缀。

use std::sync::Arc;
use std::time::Instant;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::config::{Settings, credentials};
use crate::error::{GatewayError, Result};
use crate::trace::{TraceItem, TraceKind, TraceStore};

/// 凭据解析使用的后端名称
pub const BACKEND_NAME: &str = "backend";

/// 不同部署接受不同的 API 密钥头，两个都发
pub const AUTH_HEADERS: &[&str] = &["apikey", "mxapiapikey"];

/// Maximo 后端网关
pub struct BackendGateway {
    http: reqwest::Client,
    trace: Arc<TraceStore>,
}

impl BackendGateway {
    /// 以共享 HTTP 客户端和追踪存储创建网关
    pub fn new(http: reqwest::Client, trace: Arc<TraceStore>) -> Self {
        Self { http, trace }
    }

    /// 执行一次后端 REST 调用
    ///
    /// 基础 URL 与 API 密钥缺一不可；非 2xx 带状态和原始
    /// 响应体抛出；无论成败都写入一条 `backend` 追踪记录。
    pub async fn call(
        &self,
        settings: &Settings,
        path: &str,
        method: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let auth = credentials::resolve(settings, BACKEND_NAME);
        let base = auth
            .base_url
            .as_deref()
            .ok_or_else(|| GatewayError::config("Maximo base URL not configured"))?;
        let api_key = auth
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::config("Maximo API key not configured"))?;

        let method: Method = method
            .trim()
            .to_ascii_uppercase()
            .parse()
            .map_err(|_| GatewayError::malformed(format!("invalid HTTP method: {method}")))?;

        let base = normalize_base_url(base);
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let url = format!("{base}{path}");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header("Accept", "application/json");
        for header in AUTH_HEADERS {
            request = request.header(*header, api_key);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let mut item = TraceItem::new(TraceKind::Backend)
            .with_provider("maximo")
            .with_label(format!("{method} {path}"))
            .with_call(method.to_string(), &url);
        if let Some(body) = &body {
            item = item.with_request(body.clone());
        }

        let started = Instant::now();
        let response = request.send().await;
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

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let data = parse_or_raw(&text);

        if !(200..300).contains(&status) {
            let err = GatewayError::upstream("Maximo", status, &text);
            self.trace.record(
                item.with_outcome(false, Some(status), duration_ms)
                    .with_response(data)
                    .with_error(err.to_string()),
            );
            return Err(err);
        }

        debug!(%url, status, duration_ms, "Maximo 调用完成");
        self.trace.record(
            item.with_outcome(true, Some(status), duration_ms)
                .with_response(data.clone()),
        );
        Ok(data)
    }
}

/// 归一化用户填写的后端基础 URL
///
/// 去掉尾部斜杠，再剥离结尾的 `/oslc` 或 `/api` 段（含其后子路径），
/// 保证存储的始终是后端根地址。
pub fn normalize_base_url(raw: &str) -> String {
    let mut base = raw.trim().trim_end_matches('/').to_string();
    for marker in ["/oslc", "/api"] {
        if let Some(pos) = base.rfind(marker) {
            let after = &base[pos + marker.len()..];
            // 只剥离完整的路径段（结尾或后接子路径）
            if after.is_empty() || after.starts_with('/') {
                base.truncate(pos);
            }
        }
    }
    base.trim_end_matches('/').to_string()
}

/// JSON 优先解析，失败时保留原始文本
fn parse_or_raw(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
