//! # 凭据解析
//!
//! 给定后端/服务商名称和分层设置，产出生效的 `{apiKey, baseUrl}`。
//! 专用字段优先；通用回退字段只在「选中服务商」恰好等于该名称时
//! 才允许使用——凭据绝不在未被显式指定的后端之间泄漏。

use super::settings::Settings;

/// 为某一服务商解析出的凭据，按调用计算，从不持久化
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderAuth {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderAuth {
    /// 是否解析到了 API 密钥
    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// 解析指定名称的凭据
///
/// 解析不到任何字段不是错误，由调用方决定缺失是否致命。
pub fn resolve(settings: &Settings, name: &str) -> ProviderAuth {
    let generic_selected = settings.selected_provider() == Some(name);

    let api_key = settings
        .provider_key(name)
        .or_else(|| generic_selected.then(|| settings.generic_key()).flatten())
        .map(String::from);

    let base_url = settings
        .provider_base(name)
        .or_else(|| generic_selected.then(|| settings.generic_base()).flatten())
        .map(String::from);

    ProviderAuth { api_key, base_url }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_key_resolves() {
        let settings = Settings {
            backend_api_key: Some("X".into()),
            ..Default::default()
        };
        let auth = resolve(&settings, "backend");
        assert_eq!(auth.api_key.as_deref(), Some("X"));
    }

    #[test]
    fn test_generic_key_does_not_leak_across_backends() {
        let settings = Settings {
            provider: Some("other".into()),
            api_key: Some("Y".into()),
            ..Default::default()
        };
        let auth = resolve(&settings, "backend");
        assert!(auth.api_key.is_none());
    }

    #[test]
    fn test_generic_fallback_when_provider_selected() {
        let settings = Settings {
            provider: Some("openai".into()),
            api_key: Some("sk-generic".into()),
            base_url: Some("https://proxy.example.com/v1".into()),
            ..Default::default()
        };
        let auth = resolve(&settings, "openai");
        assert_eq!(auth.api_key.as_deref(), Some("sk-generic"));
        assert_eq!(auth.base_url.as_deref(), Some("https://proxy.example.com/v1"));
    }

    #[test]
    fn test_specific_key_beats_generic() {
        let settings = Settings {
            provider: Some("openai".into()),
            api_key: Some("sk-generic".into()),
            openai_key: Some("sk-specific".into()),
            ..Default::default()
        };
        let auth = resolve(&settings, "openai");
        assert_eq!(auth.api_key.as_deref(), Some("sk-specific"));
    }

    #[test]
    fn test_empty_resolution_is_not_an_error() {
        let auth = resolve(&Settings::default(), "gemini");
        assert_eq!(auth, ProviderAuth::default());
    }
}
