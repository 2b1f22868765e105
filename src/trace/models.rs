//! # Trace 数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 出站调用类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    /// AI 聊天调用
    Ai,
    /// Maximo 后端调用
    Backend,
    /// 任意 REST 转发
    Rest,
    /// 模型列表查询
    Models,
}

impl TraceKind {
    /// 解析类别名称（用于 `/api/trace?kind=` 过滤）
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ai" => Some(Self::Ai),
            "backend" => Some(Self::Backend),
            "rest" => Some(Self::Rest),
            "models" => Some(Self::Models),
            _ => None,
        }
    }
}

/// 单次出站调用的追踪记录
///
/// 创建后不可变：store 只追加和淘汰，从不修改已有条目。
/// `id` 由 store 在写入时生成，按生成顺序可排序。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceItem {
    /// 记录 ID，store 写入时生成
    #[serde(default)]
    pub id: String,
    /// 记录时间，store 写入时生成
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// 调用类别
    pub kind: TraceKind,
    /// 服务商/后端名称
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// 是否成功
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    /// 展示用标签
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// HTTP 方法
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// 目标 URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// 上游响应状态码
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// 调用耗时（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// 出站请求体
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<Value>,
    /// 上游响应（结构化或原始文本）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    /// 失败时的错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TraceItem {
    /// 创建指定类别的空白记录，其余字段由调用方按需填充
    pub fn new(kind: TraceKind) -> Self {
        Self {
            id: String::new(),
            timestamp: Utc::now(),
            kind,
            provider: None,
            ok: None,
            label: None,
            method: None,
            url: None,
            status: None,
            duration_ms: None,
            request: None,
            response: None,
            error: None,
        }
    }

    /// 设置服务商名称
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// 设置展示标签
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// 设置方法和目标 URL
    #[must_use]
    pub fn with_call(mut self, method: impl Into<String>, url: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.url = Some(url.into());
        self
    }

    /// 标记调用结果
    #[must_use]
    pub fn with_outcome(mut self, ok: bool, status: Option<u16>, duration_ms: u64) -> Self {
        self.ok = Some(ok);
        self.status = status;
        self.duration_ms = Some(duration_ms);
        self
    }

    /// 附带出站请求体
    #[must_use]
    pub fn with_request(mut self, request: Value) -> Self {
        self.request = Some(request);
        self
    }

    /// 附带上游响应
    #[must_use]
    pub fn with_response(mut self, response: Value) -> Self {
        self.response = Some(response);
        self
    }

    /// 附带错误信息
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
