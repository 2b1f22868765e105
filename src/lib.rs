//! # Asset Gateway 核心库
//!
//! AI 服务商 / Maximo 资产管理后端的统一外部请求网关

pub mod backend;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod logging;
pub mod providers;
pub mod proxy;
pub mod router;
pub mod server;
pub mod trace;

// Re-export commonly used types
pub use config::Settings;
pub use error::{GatewayError, Result};
