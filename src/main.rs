//! # Asset Gateway 主程序
//!
//! AI 服务商 / Maximo 后端统一请求网关服务

use std::env;
use std::path::Path;

use asset_gateway::config::ConfigStore;
use asset_gateway::server::{AppState, create_routes};
use asset_gateway::logging;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init_logging();

    // 引导初始设置（文件可缺省，运行期通过 /api/settings 维护）
    let settings_path =
        env::var("GATEWAY_SETTINGS_PATH").unwrap_or_else(|_| "settings.json".to_string());
    let config = ConfigStore::from_file(Path::new(&settings_path));

    let state = AppState::new(config)?;
    let app = create_routes(state);

    let bind = env::var("GATEWAY_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(%bind, "🚀 服务启动");

    axum::serve(listener, app).await?;

    info!("服务正常关闭");
    Ok(())
}
