//! # 追踪查询处理器

use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::server::extract::Json;
use crate::server::state::AppState;
use crate::trace::TraceKind;
use crate::trace::store::DEFAULT_MAX_ITEMS;

/// `GET /api/trace` 查询参数
#[derive(Debug, Deserialize)]
pub struct TraceQuery {
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

/// `GET /api/trace`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TraceQuery>,
) -> Json<Value> {
    let kind = query.kind.as_deref().and_then(TraceKind::from_name);
    let items = state.trace.list(kind, query.limit.unwrap_or(DEFAULT_MAX_ITEMS));
    Json(json!({
        "items": items,
        "state": state.trace.get_state(),
    }))
}

/// `POST /api/trace/clear`
pub async fn clear(State(state): State<AppState>) -> Json<Value> {
    state.trace.clear();
    Json(json!({ "ok": true }))
}

/// `PUT /api/trace/state`：浅合并 UI 辅助状态
pub async fn put_state(
    State(state): State<AppState>,
    Json(patch): Json<Value>,
) -> Json<Value> {
    state.trace.set_state(patch);
    Json(json!({ "ok": true }))
}
