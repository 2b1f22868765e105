//! # 请求处理器

pub mod chat;
pub mod models;
pub mod proxy;
pub mod settings;
pub mod trace;
