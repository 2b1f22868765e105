//! # 模型列表处理器

use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::Settings;
use crate::error::Result;
use crate::server::extract::Json;
use crate::server::state::AppState;

/// `GET /api/models` 查询参数
#[derive(Debug, Deserialize)]
pub struct ModelsQuery {
    pub provider: Option<String>,
}

/// `POST /api/models` 请求体，settings 仅请求期生效，不持久化
#[derive(Debug, Deserialize)]
pub struct ModelsBody {
    pub provider: Option<String>,
    pub settings: Option<Value>,
}

/// `GET /api/models?provider=<id>`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ModelsQuery>,
) -> Result<Json<Value>> {
    let settings = state.config.get().await;
    let provider = query.provider.unwrap_or_else(|| "openai".to_string());
    respond(&state, &settings, &provider).await
}

/// `POST /api/models`（请求作用域设置）
pub async fn list_with_settings(
    State(state): State<AppState>,
    Json(body): Json<ModelsBody>,
) -> Result<Json<Value>> {
    let mut settings = state.config.get().await;
    if let Some(scoped) = body.settings {
        settings = settings.merged(&Settings::from_value(scoped));
    }
    let provider = body.provider.unwrap_or_else(|| "openai".to_string());
    respond(&state, &settings, &provider).await
}

async fn respond(state: &AppState, settings: &Settings, provider: &str) -> Result<Json<Value>> {
    let models = state.providers.list_models(settings, provider).await?;
    let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
    Ok(Json(json!({ "models": ids })))
}
