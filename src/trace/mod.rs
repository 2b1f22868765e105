//! # 调用追踪模块
//!
//! 为每一次出站调用（AI / Maximo / 任意 REST / 模型列表）保留
//! 一条有界的、可查询的追踪记录，用于调试和审计

pub mod models;
pub mod store;

pub use models::{TraceItem, TraceKind};
pub use store::TraceStore;
