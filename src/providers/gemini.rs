//! # generateContent 线协议
//!
//! Google generateContent API：
//! `POST {base}/models/{model}:generateContent?key={apiKey}`，
//! system 提示折叠进唯一的 user part，回复文本为第一个 candidate
//! 所有 parts 文本的拼接。

use serde_json::{Value, json};

use super::types::ChatArgs;

/// 聊天端点，密钥经查询参数传递
pub fn chat_endpoint(base: &str, model: &str, api_key: &str) -> String {
    format!("{base}/models/{model}:generateContent?key={api_key}")
}

/// 追踪展示用端点（不含密钥）
pub fn display_endpoint(base: &str, model: &str) -> String {
    format!("{base}/models/{model}:generateContent")
}

/// 构建请求体
pub fn chat_body(args: &ChatArgs) -> Value {
    let text = match args.system.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(system) => format!("{system}\n\n{}", args.prompt),
        None => args.prompt.clone(),
    };
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": text }] }],
        "generationConfig": { "temperature": args.temperature },
    })
}

/// 拼接第一个 candidate 全部 parts 的文本
pub fn extract_content(raw: &Value) -> String {
    raw.pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}
