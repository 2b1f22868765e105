//! # 运行时配置存储
//!
//! 进程内共享的设置对象，通过 `/api/settings` 读写。
//! 持久化（Kubernetes Secret 等）由外部协作方负责。

use std::path::Path;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::settings::Settings;

/// 共享设置存储
pub struct ConfigStore {
    settings: RwLock<Settings>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl ConfigStore {
    /// 以初始设置创建存储
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }

    /// 从 JSON 文件引导初始设置，文件缺失或非法时回退为空设置
    pub fn from_file(path: &Path) -> Self {
        let settings = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(value) => {
                    info!(path = %path.display(), "已加载设置文件");
                    Settings::from_value(value)
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "设置文件解析失败，使用空设置");
                    Settings::default()
                }
            },
            Err(_) => Settings::default(),
        };
        Self::new(settings)
    }

    /// 读取当前设置的快照
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// 以归一化后的 patch 合并更新设置
    pub async fn merge_value(&self, patch: Value) {
        let patch = Settings::from_value(patch);
        let mut guard = self.settings.write().await;
        *guard = guard.merged(&patch);
    }

    /// 整体替换设置
    pub async fn replace(&self, settings: Settings) {
        *self.settings.write().await = settings;
    }
}
