//! # chat-completions 线协议
//!
//! OpenAI 兼容接口：`POST {base}/chat/completions`，Bearer 认证，
//! 回复文本取第一个 choice 的 message content。

use serde_json::{Value, json};

use super::types::ChatArgs;

/// 聊天端点
pub fn chat_endpoint(base: &str) -> String {
    format!("{base}/chat/completions")
}

/// 模型列表端点（`{data:[{id,...}]}` 公共 JSON 形状）
pub fn models_endpoint(base: &str) -> String {
    format!("{base}/models")
}

/// 构建请求体
pub fn chat_body(args: &ChatArgs) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = args.system.as_deref().filter(|s| !s.trim().is_empty()) {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": args.prompt }));

    json!({
        "model": args.model,
        "messages": messages,
        "temperature": args.temperature,
    })
}

/// 从成功响应提取回复文本，缺失时为空串
pub fn extract_content(raw: &Value) -> String {
    raw.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// 从列表响应提取原始模型 ID
pub fn extract_model_ids(raw: &Value) -> Vec<String> {
    raw.get("data")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("id").and_then(Value::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
