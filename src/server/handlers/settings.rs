//! # 设置读写处理器
//!
//! 持久化（Kubernetes Secret 引导等）由外部协作方负责，
//! 这里只维护进程内的运行时设置。

use axum::extract::State;
use serde_json::{Value, json};

use crate::config::Settings;
use crate::server::extract::Json;
use crate::server::state::AppState;

/// `GET /api/settings`：密钥脱敏后的设置回显
pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.config.get().await.redacted())
}

/// `PUT /api/settings`：经键名归一化合并更新
pub async fn put_settings(
    State(state): State<AppState>,
    Json(patch): Json<Value>,
) -> Json<Value> {
    state.config.merge_value(patch).await;
    Json(json!({ "ok": true }))
}
