//! # 错误类型定义

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// 统一结果类型
pub type Result<T> = std::result::Result<T, GatewayError>;

/// 网关主要错误类型
///
/// 所有变体最终都以 HTTP 400 + `{"error": message}` 返回调用方；
/// 上游自身的状态码只通过 trace 和 proxy 的 `status` 字段透传。
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 配置缺失（密钥/基础URL等），不重试，原样返回调用方
    #[error("配置错误: {message}")]
    Config { message: String },

    /// 上游返回非 2xx，message 已由上游错误体解析而来
    #[error("{message}")]
    Upstream {
        system: String,
        status: u16,
        message: String,
    },

    /// 网络传输失败或超时
    #[error("网络错误: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 调用方输入非法（JSON 解析失败、缺少必填字段）
    #[error("请求格式错误: {message}")]
    MalformedInput { message: String },

    /// 不支持的 AI 服务商
    #[error("不支持的服务商: {provider}")]
    UnsupportedProvider { provider: String },
}

impl GatewayError {
    /// 配置错误便捷构造
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 输入格式错误便捷构造
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// 从 reqwest 传输错误构造
    pub fn transport(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
            source: Some(err.into()),
        }
    }

    /// 从上游错误响应体构造错误
    ///
    /// 优先取上游自身错误结构中的 message，其次取原始响应体文本，
    /// 两者都不可用时退化为 `"<system> error (<status>)"`。
    pub fn upstream(system: &str, status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .or_else(|| v.pointer("/Error/message"))
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str().map(String::from))
            });

        let message = match parsed {
            Some(m) if !m.trim().is_empty() => m,
            _ if !body.trim().is_empty() => body.trim().to_string(),
            _ => format!("{system} error ({status})"),
        };

        Self::Upstream {
            system: system.to_string(),
            status,
            message,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        // 网关层面的失败一律使用 400，上游状态透传由 proxy/trace 负责
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
