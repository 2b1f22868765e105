//! # 配置模块
//!
//! 分层设置对象、历史键名归一化、凭据解析与运行时共享存储

pub mod credentials;
pub mod settings;
pub mod store;

pub use credentials::{ProviderAuth, resolve};
pub use settings::Settings;
pub use store::ConfigStore;
