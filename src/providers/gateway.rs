//! # 服务商网关
//!
//! 在一个内部契约（`list_models` / `chat`）之后执行具体线协议，
//! 每次出站调用无论成败都写入 TraceStore。

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Settings, credentials};
use crate::error::{GatewayError, Result};
use crate::trace::{TraceItem, TraceKind, TraceStore};

use super::types::{ChatArgs, ChatReply, ModelInfo, ProviderKind};
use super::{claude, gemini, models, openai};

/// AI 服务商网关
pub struct ProviderGateway {
    http: reqwest::Client,
    trace: Arc<TraceStore>,
}

impl ProviderGateway {
    /// 以共享 HTTP 客户端和追踪存储创建网关
    pub fn new(http: reqwest::Client, trace: Arc<TraceStore>) -> Self {
        Self { http, trace }
    }

    /// 列出服务商可用模型
    ///
    /// 有列表端点的服务商在凭据缺失或调用失败时静默退回精选列表，
    /// 保持 UI 可用；每次真实的列表调用都会被追踪。
    pub async fn list_models(
        &self,
        settings: &Settings,
        provider: &str,
    ) -> Result<Vec<ModelInfo>> {
        let kind = ProviderKind::from_name(provider).ok_or_else(|| {
            GatewayError::UnsupportedProvider {
                provider: provider.to_string(),
            }
        })?;

        match kind {
            ProviderKind::Anthropic => Ok(models::anthropic_models()),
            ProviderKind::Gemini => Ok(models::gemini_models()),
            ProviderKind::OpenAi => Ok(self.list_openai_models(settings).await),
        }
    }

    /// OpenAI 在线列表，失败降级为精选列表
    async fn list_openai_models(&self, settings: &Settings) -> Vec<ModelInfo> {
        let auth = credentials::resolve(settings, ProviderKind::OpenAi.name());
        let Some(api_key) = auth.api_key else {
            // 无凭据时直接回退，避免可预见的认证失败
            return models::openai_fallback();
        };
        let base = normalize_base(
            auth.base_url.as_deref(),
            ProviderKind::OpenAi.default_base_url(),
        );
        let url = openai::models_endpoint(&base);

        let started = Instant::now();
        let response = self.http.get(&url).bearer_auth(&api_key).send().await;
        let duration_ms = elapsed_ms(started);

        let item = TraceItem::new(TraceKind::Models)
            .with_provider(ProviderKind::OpenAi.name())
            .with_label("list models")
            .with_call("GET", &url);

        match response {
            Err(err) => {
                warn!(error = %err, "模型列表请求失败，使用精选回退列表");
                self.trace.record(
                    item.with_outcome(false, Some(0), duration_ms)
                        .with_error(err.to_string()),
                );
                models::openai_fallback()
            }
            Ok(response) => {
                let status = response.status().as_u16();
                let text = response.text().await.unwrap_or_default();
                if !(200..300).contains(&status) {
                    warn!(status, "模型列表返回非 2xx，使用精选回退列表");
                    self.trace.record(
                        item.with_outcome(false, Some(status), duration_ms)
                            .with_error(format!("OpenAI models error ({status})"))
                            .with_response(parse_or_raw(&text)),
                    );
                    return models::openai_fallback();
                }

                let raw = parse_or_raw(&text);
                let ids = openai::extract_model_ids(&raw);
                self.trace.record(
                    item.with_outcome(true, Some(status), duration_ms)
                        .with_response(serde_json::json!({ "count": ids.len() })),
                );
                models::filter_and_sort_openai(ids)
            }
        }
    }

    /// 执行一次聊天补全
    ///
    /// 缺少 API 密钥在任何网络调用之前即以配置错误失败；
    /// 非 2xx 携带上游自身的错误信息向上抛出。
    pub async fn chat(&self, args: &ChatArgs) -> Result<ChatReply> {
        let kind = ProviderKind::from_name(&args.provider).ok_or_else(|| {
            GatewayError::UnsupportedProvider {
                provider: args.provider.clone(),
            }
        })?;

        let api_key = args
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                GatewayError::config(format!(
                    "{} API key not configured",
                    kind.display_name()
                ))
            })?;

        let base = normalize_base(args.base_url.as_deref(), kind.default_base_url());

        let (url, display_url, body) = match kind {
            ProviderKind::OpenAi => {
                let url = openai::chat_endpoint(&base);
                (url.clone(), url, openai::chat_body(args))
            }
            ProviderKind::Anthropic => {
                let url = claude::chat_endpoint(&base);
                (url.clone(), url, claude::chat_body(args))
            }
            ProviderKind::Gemini => (
                gemini::chat_endpoint(&base, &args.model, api_key),
                gemini::display_endpoint(&base, &args.model),
                gemini::chat_body(args),
            ),
        };

        let mut request = self.http.post(&url).json(&body);
        request = match kind {
            ProviderKind::OpenAi => request.bearer_auth(api_key),
            ProviderKind::Anthropic => claude::apply_auth(request, api_key),
            // 密钥已在查询参数中
            ProviderKind::Gemini => request,
        };

        let item = TraceItem::new(TraceKind::Ai)
            .with_provider(kind.name())
            .with_label(format!("chat {}", args.model))
            .with_call("POST", &display_url)
            .with_request(body.clone());

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
        let raw = parse_or_raw(&text);

        if !(200..300).contains(&status) {
            let err = GatewayError::upstream(kind.display_name(), status, &text);
            self.trace.record(
                item.with_outcome(false, Some(status), duration_ms)
                    .with_response(raw)
                    .with_error(err.to_string()),
            );
            return Err(err);
        }

        let content = match kind {
            ProviderKind::OpenAi => openai::extract_content(&raw),
            ProviderKind::Anthropic => claude::extract_content(&raw),
            ProviderKind::Gemini => gemini::extract_content(&raw),
        };

        debug!(provider = kind.name(), model = %args.model, status, "聊天调用完成");
        self.trace.record(
            item.with_outcome(true, Some(status), duration_ms)
                .with_response(raw.clone()),
        );

        Ok(ChatReply { content, raw })
    }
}

/// 选用调用方基础 URL 或默认值，并去掉尾部斜杠
fn normalize_base(base_url: Option<&str>, default: &str) -> String {
    base_url
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

/// JSON 优先解析，失败时保留原始文本
fn parse_or_raw(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
