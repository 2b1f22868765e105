//! # 聊天路由器
//!
//! 每次调用决定 AI 模式或后端查询模式，编排启发式分类、
//! 后端查询与「总结上一次结果」流程。不持有会话状态，
//! 失败的调用不污染任何内部状态，下一次调用从零开始。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::backend::BackendGateway;
use crate::config::{Settings, credentials};
use crate::error::{GatewayError, Result};
use crate::heuristics::{self, BackendQuery, Intent};
use crate::providers::{ChatArgs, ProviderGateway, ProviderKind};
use crate::trace::{TraceKind, TraceStore};

/// 进入后端查询模式的 mode 值，其余值一律为 AI 模式
pub const BACKEND_MODE: &str = "maximo";

/// 总结流程发送给 AI 前对序列化结果的长度上限（字符数）
pub const MAX_SUMMARY_CHARS: usize = 120_000;

/// 截断标记
pub const TRUNCATION_MARKER: &str = "\n…[truncated]";

/// 总结流程的 system 提示
const SUMMARY_SYSTEM_PROMPT: &str = "You are an assistant summarizing raw JSON query results \
from an asset-management system. Produce a short, plain-language summary of the records: \
counts, notable statuses, and anything that stands out. Do not reproduce the JSON.";

/// 一次聊天调用的入参
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub mode: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub system: Option<String>,
    pub text: String,
    /// UI 指定的对象结构，优先于启发式推断的对象类型
    #[serde(rename = "maximoOS")]
    pub maximo_os: Option<String>,
}

/// 一次聊天调用的出参
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub reply: String,
    /// 后端查询的原始结果
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximo: Option<Value>,
    /// AI 调用的原始响应
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    /// 实际使用的查询参数，回显给调用方做展示/列选择
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<BackendQuery>,
}

/// 聊天编排器
pub struct ChatRouter {
    providers: Arc<ProviderGateway>,
    backend: Arc<BackendGateway>,
    trace: Arc<TraceStore>,
}

impl ChatRouter {
    pub fn new(
        providers: Arc<ProviderGateway>,
        backend: Arc<BackendGateway>,
        trace: Arc<TraceStore>,
    ) -> Self {
        Self {
            providers,
            backend,
            trace,
        }
    }

    /// 处理一次聊天调用
    pub async fn handle(&self, settings: &Settings, request: &ChatRequest) -> Result<ChatOutcome> {
        if request.text.trim().is_empty() {
            return Err(GatewayError::malformed("text is required"));
        }

        if request.mode.as_deref() == Some(BACKEND_MODE) {
            self.handle_backend_query(settings, request).await
        } else {
            self.handle_ai_chat(settings, request, &request.text, None)
                .await
        }
    }

    /// 后端查询模式
    async fn handle_backend_query(
        &self,
        settings: &Settings,
        request: &ChatRequest,
    ) -> Result<ChatOutcome> {
        match heuristics::classify(&request.text) {
            Intent::DirectPath(path) => {
                let data = self.backend.call(settings, &path, "GET", None).await?;
                Ok(ChatOutcome {
                    reply: describe_result(&data, &path),
                    maximo: Some(data),
                    raw: None,
                    request: None,
                })
            }
            Intent::SummarizeLast => self.summarize_last(settings, request).await,
            Intent::Query(mut query) => {
                if let Some(os) = request
                    .maximo_os
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                {
                    query.object_type = os.to_string();
                }
                let path = build_query_path(&query);
                info!(object_type = %query.object_type, page_size = query.page_size, "后端查询");
                let data = self.backend.call(settings, &path, "GET", None).await?;
                Ok(ChatOutcome {
                    reply: describe_result(&data, &query.object_type),
                    maximo: Some(data),
                    raw: None,
                    request: Some(query),
                })
            }
        }
    }

    /// 总结最近一次后端查询结果
    async fn summarize_last(
        &self,
        settings: &Settings,
        request: &ChatRequest,
    ) -> Result<ChatOutcome> {
        let last = self
            .trace
            .latest(TraceKind::Backend)
            .and_then(|item| item.response)
            .ok_or_else(|| GatewayError::config("No previous Maximo result to summarize"))?;

        let serialized = serde_json::to_string(&last).unwrap_or_default();
        let prompt = truncate_chars(&serialized, MAX_SUMMARY_CHARS);

        self.handle_ai_chat(settings, request, &prompt, Some(SUMMARY_SYSTEM_PROMPT))
            .await
    }

    /// AI 模式（system_override 用于总结流程）
    async fn handle_ai_chat(
        &self,
        settings: &Settings,
        request: &ChatRequest,
        prompt: &str,
        system_override: Option<&str>,
    ) -> Result<ChatOutcome> {
        let provider = request
            .provider
            .as_deref()
            .or_else(|| settings.selected_provider())
            .unwrap_or("openai")
            .to_string();
        let auth = credentials::resolve(settings, &provider);

        let model = request
            .model
            .clone()
            .or_else(|| settings.model.clone())
            .or_else(|| {
                ProviderKind::from_name(&provider).map(|k| k.default_model().to_string())
            })
            .unwrap_or_default();

        let args = ChatArgs {
            provider,
            api_key: auth.api_key,
            base_url: auth.base_url,
            model,
            temperature: request.temperature.unwrap_or(0.7),
            system: system_override
                .map(String::from)
                .or_else(|| request.system.clone()),
            prompt: prompt.to_string(),
        };

        let reply = self.providers.chat(&args).await?;
        Ok(ChatOutcome {
            reply: reply.content,
            maximo: None,
            raw: Some(reply.raw),
            request: None,
        })
    }
}

/// 由结构化查询构造对象结构 REST 路径
pub fn build_query_path(query: &BackendQuery) -> String {
    let mut path = format!("/api/os/{}?oslc.pageSize={}", query.object_type, query.page_size);
    if let Some(fields) = &query.fields {
        path.push_str("&oslc.select=");
        path.push_str(fields);
    }
    if let Some(filter) = &query.filter {
        let encoded: String = url::form_urlencoded::byte_serialize(filter.as_bytes()).collect();
        path.push_str("&oslc.where=");
        path.push_str(&encoded);
    }
    path
}

/// 为查询结果生成一句话答复
fn describe_result(data: &Value, subject: &str) -> String {
    match data.get("member").and_then(Value::as_array) {
        Some(members) => format!("Returned {} records from {subject}", members.len()),
        None => format!("Query against {subject} completed"),
    }
}

/// 按字符数截断，截断时追加标记
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
