//! # 聊天处理器

use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Settings;
use crate::error::Result;
use crate::router::{ChatOutcome, ChatRequest};
use crate::server::extract::Json;
use crate::server::state::AppState;

/// `POST /api/chat` 请求体：路由参数加请求作用域设置
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(flatten)]
    pub request: ChatRequest,
    pub settings: Option<Value>,
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatOutcome>> {
    let mut settings = state.config.get().await;
    if let Some(scoped) = body.settings {
        settings = settings.merged(&Settings::from_value(scoped));
    }

    let outcome = state.router.handle(&settings, &body.request).await?;
    Ok(Json(outcome))
}
