//! # HTTP 服务模块
//!
//! 网关对外的 JSON 接口；所有网关层失败统一为
//! HTTP 400 + `{"error": message}`，上游状态码只透传不映射

pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_routes;
pub use state::AppState;
