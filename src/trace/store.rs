//! # 有界追踪存储
//!
//! 追加式、容量有界的出站调用记录器。最新记录在前，
//! 超出容量后从尾部淘汰最旧的条目。

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde_json::{Value, json};

use super::models::{TraceItem, TraceKind};

/// 默认最大记录条数
pub const DEFAULT_MAX_ITEMS: usize = 500;

/// 被单个互斥锁保护的内部状态
struct TraceInner {
    /// 追踪记录，队首为最新
    items: VecDeque<TraceItem>,
    /// UI 辅助状态（请求构造器草稿等），与追踪数据一同更新
    aux_state: Value,
}

/// 出站调用追踪存储
///
/// 所有操作都在锁内同步完成（最坏 O(maxItems)），
/// 不在吞吐关键路径上，单把互斥锁足够。
pub struct TraceStore {
    inner: Mutex<TraceInner>,
    max_items: usize,
    enabled: AtomicBool,
    seq: AtomicU64,
}

impl Default for TraceStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITEMS)
    }
}

impl TraceStore {
    /// 创建指定容量的存储
    pub fn new(max_items: usize) -> Self {
        Self {
            inner: Mutex::new(TraceInner {
                items: VecDeque::new(),
                aux_state: json!({}),
            }),
            max_items: max_items.max(1),
            enabled: AtomicBool::new(true),
            seq: AtomicU64::new(0),
        }
    }

    /// 是否启用记录
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// 启用/停用记录；停用期间 `record` 为空操作
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// 追加一条记录并按容量淘汰最旧条目
    ///
    /// `id` 为空时由 store 生成按序可排序的 ID。
    /// 记录失败绝不能阻塞主响应，本操作不会返回错误。
    pub fn record(&self, mut item: TraceItem) {
        if !self.is_enabled() {
            return;
        }

        if item.id.is_empty() {
            let seq = self.seq.fetch_add(1, Ordering::Relaxed);
            item.id = format!("t-{seq:010}");
        }

        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            // 锁中毒只可能来自另一个写入者 panic，直接放弃本条记录
            Err(_) => return,
        };
        inner.items.push_front(item);
        inner.items.truncate(self.max_items);
    }

    /// 返回最多 `min(limit, maxItems)` 条记录，最新在前，可按类别过滤
    pub fn list(&self, kind: Option<TraceKind>, limit: usize) -> Vec<TraceItem> {
        let limit = limit.min(self.max_items);
        let inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(_) => return Vec::new(),
        };
        inner
            .items
            .iter()
            .filter(|item| kind.is_none_or(|k| item.kind == k))
            .take(limit)
            .cloned()
            .collect()
    }

    /// 最近一条指定类别的记录
    pub fn latest(&self, kind: TraceKind) -> Option<TraceItem> {
        self.list(Some(kind), 1).into_iter().next()
    }

    /// 清空全部记录
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.items.clear();
        }
    }

    /// 当前记录条数
    pub fn len(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.items.len())
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 读取 UI 辅助状态
    pub fn get_state(&self) -> Value {
        self.inner
            .lock()
            .map_or_else(|_| json!({}), |inner| inner.aux_state.clone())
    }

    /// 浅合并 UI 辅助状态（patch 的顶层键覆盖已有键）
    pub fn set_state(&self, patch: Value) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        match (inner.aux_state.as_object_mut(), patch) {
            (Some(state), Value::Object(patch)) => {
                for (key, value) in patch {
                    state.insert(key, value);
                }
            }
            // 非对象 patch 直接整体替换
            (_, patch) => inner.aux_state = patch,
        }
    }
}
