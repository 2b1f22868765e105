//! # 服务商公共类型

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 封闭的服务商线协议集合
///
/// 每个变体对应一种聊天 API 线格式，由各自的模块完全负责
/// 请求/响应形状。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// chat-completions 风格（`POST {base}/chat/completions`）
    OpenAi,
    /// messages 风格（`POST {base}/v1/messages`，专用认证头）
    Anthropic,
    /// generateContent 风格（`POST {base}/models/{model}:generateContent`）
    Gemini,
}

impl ProviderKind {
    /// 按配置中的服务商名称解析
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    /// 配置键名
    pub fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    /// 错误信息中使用的展示名
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Gemini",
        }
    }

    /// 未配置基础 URL 时的默认值
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// 未指定模型时的默认模型
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::Gemini => "gemini-1.5-flash",
        }
    }
}

/// 一次聊天调用的完整参数，凭据已由调用方解析
#[derive(Debug, Clone)]
pub struct ChatArgs {
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub system: Option<String>,
    pub prompt: String,
}

/// 聊天调用结果：提取出的回复文本加原始响应
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub content: String,
    pub raw: Value,
}

/// 模型列表条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
