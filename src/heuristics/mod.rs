//! # 查询意图启发式
//!
//! 把一小组规范的自然语言意图翻译为结构化后端查询。
//! 规则是确定性的关键词匹配，按固定优先级自上而下求值，
//! 与 HTTP 层完全无关，可独立单测。

use serde::Serialize;

/// 结构化后端查询：对象结构、过滤器、字段选择、页大小
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendQuery {
    pub object_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    pub page_size: u32,
}

/// 分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// 字面路径输入，绕过启发式直接调用
    DirectPath(String),
    /// 总结上一次后端查询结果，不发起新查询
    SummarizeLast,
    /// 发起一次结构化查询
    Query(BackendQuery),
}

/// 默认页大小；列表型复合规则放宽到 [`WIDE_PAGE_SIZE`]
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const WIDE_PAGE_SIZE: u32 = 100;

/// 「开放工单」的默认状态排除策略
///
/// 这是一个按部署配置变化的近似值，不保证对所有环境正确。
pub const OPEN_WO_FILTER: &str = r#"status not in ["CLOSE","COMP","CAN"]"#;

const WO_FIELDS: &str = "wonum,description,status,worktype,siteid";
const ASSET_FIELDS: &str = "assetnum,description,status,location";
const LOCATION_FIELDS: &str = "location,description,status";
const SR_FIELDS: &str = "ticketid,description,status";
const INVENTORY_FIELDS: &str = "itemnum,location,curbal";

/// 一条 (谓词, 查询) 规则
struct Rule {
    name: &'static str,
    matches: fn(&str) -> bool,
    build: fn() -> BackendQuery,
}

fn query(object_type: &str, filter: Option<&str>, fields: &str, page_size: u32) -> BackendQuery {
    BackendQuery {
        object_type: object_type.to_string(),
        filter: filter.map(String::from),
        fields: Some(fields.to_string()),
        page_size,
    }
}

fn mentions_work_order(text: &str) -> bool {
    text.contains("work order") || text.contains("workorder") || text.contains(" wo ")
}

/// 规则表，自上而下求值，先匹配先赢
static RULES: &[Rule] = &[
    Rule {
        name: "corrective-work-orders",
        matches: |t| mentions_work_order(t) && t.contains("corrective"),
        build: || {
            query(
                "mxapiwodetail",
                Some(r#"worktype="CORRECTIVE""#),
                WO_FIELDS,
                WIDE_PAGE_SIZE,
            )
        },
    },
    Rule {
        name: "open-work-orders",
        matches: |t| mentions_work_order(t) && t.contains("open"),
        build: || query("mxapiwodetail", Some(OPEN_WO_FILTER), WO_FIELDS, WIDE_PAGE_SIZE),
    },
    Rule {
        name: "locations",
        matches: |t| t.contains("location"),
        build: || query("mxapilocations", None, LOCATION_FIELDS, DEFAULT_PAGE_SIZE),
    },
    Rule {
        name: "assets",
        matches: |t| t.contains("asset"),
        build: || query("mxapiasset", None, ASSET_FIELDS, DEFAULT_PAGE_SIZE),
    },
    Rule {
        name: "service-requests",
        matches: |t| t.contains("service request") || t.contains("ticket"),
        build: || query("mxapisr", None, SR_FIELDS, DEFAULT_PAGE_SIZE),
    },
    Rule {
        name: "inventory",
        matches: |t| t.contains("inventory") || t.contains("item"),
        build: || query("mxapiinvbal", None, INVENTORY_FIELDS, DEFAULT_PAGE_SIZE),
    },
];

/// 未命中任何规则时的默认查询：工单对象结构
fn default_query() -> BackendQuery {
    query("mxapiwodetail", None, WO_FIELDS, DEFAULT_PAGE_SIZE)
}

/// 是否为「总结上一次结果」意图
///
/// 名词性的 `summary` 结尾（如 "... status summary"）不算，
/// 只认指令式的 `summary of`。
fn is_summarize(text: &str) -> bool {
    text.contains("summarize") || text.contains("summary of") || text.contains("sum up")
}

/// 分类一条用户输入
///
/// 优先级：字面路径 > 总结意图 > 关键词规则 > 默认对象结构。
pub fn classify(text: &str) -> Intent {
    let trimmed = text.trim();
    if trimmed.starts_with('/') {
        return Intent::DirectPath(trimmed.to_string());
    }

    let lowered = trimmed.to_lowercase();
    if is_summarize(&lowered) {
        return Intent::SummarizeLast;
    }

    for rule in RULES {
        if (rule.matches)(&lowered) {
            tracing::debug!(rule = rule.name, "查询规则命中");
            return Intent::Query((rule.build)());
        }
    }
    Intent::Query(default_query())
}
