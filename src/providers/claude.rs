//! # messages 线协议
//!
//! Anthropic Messages API：`POST {base}/v1/messages`，`x-api-key` 认证
//! （非 Bearer），回复文本为所有 content 块 text 字段的拼接。

use serde_json::{Value, json};

use super::types::ChatArgs;

/// Messages API 版本头，上游要求必填
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// 单次回复的最大 token 数，接口必填字段
const MAX_TOKENS: u32 = 1024;

/// 聊天端点
pub fn chat_endpoint(base: &str) -> String {
    format!("{base}/v1/messages")
}

/// 构建请求体
pub fn chat_body(args: &ChatArgs) -> Value {
    let mut body = json!({
        "model": args.model,
        "max_tokens": MAX_TOKENS,
        "temperature": args.temperature,
        "messages": [{ "role": "user", "content": args.prompt }],
    });
    if let Some(system) = args.system.as_deref().filter(|s| !s.trim().is_empty()) {
        body["system"] = json!(system);
    }
    body
}

/// 专用认证头
pub fn apply_auth(req: reqwest::RequestBuilder, api_key: &str) -> reqwest::RequestBuilder {
    req.header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
}

/// 拼接全部 content 块的文本
pub fn extract_content(raw: &Value) -> String {
    raw.get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}
