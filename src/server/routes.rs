//! # 路由配置

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// 创建全部 API 路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/models",
            get(handlers::models::list).post(handlers::models::list_with_settings),
        )
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/proxy", post(handlers::proxy::forward))
        .route("/api/trace", get(handlers::trace::list))
        .route("/api/trace/clear", post(handlers::trace::clear))
        .route("/api/trace/state", put(handlers::trace::put_state))
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::put_settings),
        )
        // 浏览器 UI 在开发环境跑在独立源上
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
