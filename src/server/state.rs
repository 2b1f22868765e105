//! # 应用共享状态

use std::sync::Arc;
use std::time::Duration;

use crate::backend::BackendGateway;
use crate::config::ConfigStore;
use crate::providers::ProviderGateway;
use crate::proxy::GenericProxy;
use crate::router::ChatRouter;
use crate::trace::TraceStore;

/// 每次上游调用的统一超时
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// 注入到所有请求处理器的共享状态
///
/// 可变共享资源（TraceStore、ConfigStore）都是显式持有的实例，
/// 并发契约由各自的锁保证，不依赖进程级全局变量。
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigStore>,
    pub trace: Arc<TraceStore>,
    pub providers: Arc<ProviderGateway>,
    pub backend: Arc<BackendGateway>,
    pub proxy: Arc<GenericProxy>,
    pub router: Arc<ChatRouter>,
}

impl AppState {
    /// 以给定配置存储装配全部网关组件
    pub fn new(config: ConfigStore) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;
        let trace = Arc::new(TraceStore::default());

        let providers = Arc::new(ProviderGateway::new(http.clone(), trace.clone()));
        let backend = Arc::new(BackendGateway::new(http.clone(), trace.clone()));
        let proxy = Arc::new(GenericProxy::new(http, trace.clone()));
        let router = Arc::new(ChatRouter::new(
            providers.clone(),
            backend.clone(),
            trace.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            trace,
            providers,
            backend,
            proxy,
            router,
        })
    }
}
