//! # AI 服务商适配模块
//!
//! 把三种异构聊天线协议（chat-completions / messages / generateContent）
//! 收敛到一个内部契约（`list_models` / `chat`）之后

pub mod claude;
pub mod gateway;
pub mod gemini;
pub mod models;
pub mod openai;
pub mod types;

pub use gateway::ProviderGateway;
pub use types::{ChatArgs, ChatReply, ModelInfo, ProviderKind};
