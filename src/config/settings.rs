//! # 分层设置对象
//!
//! 扁平的键值设置，按后端/服务商逻辑分区：通用回退键
//! （`provider` / `apiKey` / `baseUrl` / `model`）、服务商专用键
//! （`<provider>_key` / `<provider>_base`）以及后端专用键
//! （`backendUrl` / `backendApiKey`）。
//!
//! 部分键存在两种历史拼写，归一化在边界上一次性完成：
//! 规范拼写存在时优先，否则采用历史拼写。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 历史键名 → 规范键名映射表
const KEY_ALIASES: &[(&str, &str)] = &[
    ("api_key", "apiKey"),
    ("base_url", "baseUrl"),
    ("openaiKey", "openai_key"),
    ("openaiBase", "openai_base"),
    ("anthropicKey", "anthropic_key"),
    ("anthropicBase", "anthropic_base"),
    ("geminiKey", "gemini_key"),
    ("geminiBase", "gemini_base"),
    ("maximoUrl", "backendUrl"),
    ("maximoApiKey", "backendApiKey"),
];

/// 类型化的设置对象，字段均可缺省
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 通用「当前选中服务商」字段
    pub provider: Option<String>,
    /// 通用 API 密钥回退
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    /// 通用基础 URL 回退
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    /// 默认模型
    pub model: Option<String>,

    pub openai_key: Option<String>,
    pub openai_base: Option<String>,
    pub anthropic_key: Option<String>,
    pub anthropic_base: Option<String>,
    pub gemini_key: Option<String>,
    pub gemini_base: Option<String>,

    /// Maximo 后端根 URL
    #[serde(rename = "backendUrl")]
    pub backend_url: Option<String>,
    /// Maximo 后端 API 密钥
    #[serde(rename = "backendApiKey")]
    pub backend_api_key: Option<String>,
}

impl Settings {
    /// 将外部 JSON 的历史键名重写为规范键名
    ///
    /// 仅在规范键缺失时采用历史键的值；非对象输入原样返回。
    pub fn normalize(value: Value) -> Value {
        let Value::Object(mut map) = value else {
            return value;
        };
        for (legacy, canonical) in KEY_ALIASES {
            if let Some(v) = map.remove(*legacy)
                && !map.contains_key(*canonical)
            {
                map.insert((*canonical).to_string(), v);
            }
        }
        Value::Object(map)
    }

    /// 从外部 JSON 解析设置，先归一化键名
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(Self::normalize(value)).unwrap_or_default()
    }

    /// 用 patch 中已设置的字段覆盖当前设置，返回合并结果
    #[must_use]
    pub fn merged(&self, patch: &Self) -> Self {
        fn pick(base: &Option<String>, over: &Option<String>) -> Option<String> {
            over.clone().or_else(|| base.clone())
        }
        Self {
            provider: pick(&self.provider, &patch.provider),
            api_key: pick(&self.api_key, &patch.api_key),
            base_url: pick(&self.base_url, &patch.base_url),
            model: pick(&self.model, &patch.model),
            openai_key: pick(&self.openai_key, &patch.openai_key),
            openai_base: pick(&self.openai_base, &patch.openai_base),
            anthropic_key: pick(&self.anthropic_key, &patch.anthropic_key),
            anthropic_base: pick(&self.anthropic_base, &patch.anthropic_base),
            gemini_key: pick(&self.gemini_key, &patch.gemini_key),
            gemini_base: pick(&self.gemini_base, &patch.gemini_base),
            backend_url: pick(&self.backend_url, &patch.backend_url),
            backend_api_key: pick(&self.backend_api_key, &patch.backend_api_key),
        }
    }

    /// 指定后端/服务商的专用 API 密钥（去除空白，空串视为缺失）
    pub fn provider_key(&self, name: &str) -> Option<&str> {
        let field = match name {
            "openai" => &self.openai_key,
            "anthropic" => &self.anthropic_key,
            "gemini" => &self.gemini_key,
            "backend" => &self.backend_api_key,
            _ => &None,
        };
        trimmed(field)
    }

    /// 指定后端/服务商的专用基础 URL
    pub fn provider_base(&self, name: &str) -> Option<&str> {
        let field = match name {
            "openai" => &self.openai_base,
            "anthropic" => &self.anthropic_base,
            "gemini" => &self.gemini_base,
            "backend" => &self.backend_url,
            _ => &None,
        };
        trimmed(field)
    }

    /// 通用选中服务商（去除空白）
    pub fn selected_provider(&self) -> Option<&str> {
        trimmed(&self.provider)
    }

    /// 通用 API 密钥回退
    pub fn generic_key(&self) -> Option<&str> {
        trimmed(&self.api_key)
    }

    /// 通用基础 URL 回退
    pub fn generic_base(&self) -> Option<&str> {
        trimmed(&self.base_url)
    }

    /// API 密钥脱敏后的设置回显（保留末 4 位）
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for field in [
            &mut copy.api_key,
            &mut copy.openai_key,
            &mut copy.anthropic_key,
            &mut copy.gemini_key,
            &mut copy.backend_api_key,
        ] {
            if let Some(key) = field.as_mut() {
                *key = mask_secret(key);
            }
        }
        copy
    }
}

/// 去空白，空串视为缺失
fn trimmed(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// 密钥脱敏：短密钥整体掩盖，长密钥保留末 4 位
fn mask_secret(secret: &str) -> String {
    if secret.len() <= 4 {
        "****".to_string()
    } else {
        let tail: String = secret.chars().skip(secret.chars().count() - 4).collect();
        format!("****{tail}")
    }
}
