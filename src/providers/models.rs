//! # 模型列表策略
//!
//! 无列表端点（或无凭据）的服务商使用精选静态列表；
//! OpenAI 的在线列表结果按「现代聊天/推理模型」命名模式过滤，
//! 并做数字感知的字典序排序。

use std::cmp::Ordering;

use super::types::ModelInfo;

/// OpenAI 无凭据或列表失败时的精选回退列表
const OPENAI_FALLBACK: &[&str] = &[
    "gpt-4.1",
    "gpt-4.1-mini",
    "gpt-4o",
    "gpt-4o-mini",
    "o3-mini",
];

/// Anthropic 无列表端点，固定精选列表
const ANTHROPIC_MODELS: &[&str] = &[
    "claude-3-5-haiku-latest",
    "claude-3-5-sonnet-latest",
    "claude-3-7-sonnet-latest",
];

/// Gemini 无兼容列表端点，固定精选列表
const GEMINI_MODELS: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-2.0-flash",
];

fn to_infos(ids: &[&str]) -> Vec<ModelInfo> {
    ids.iter().map(|id| ModelInfo::new(*id)).collect()
}

pub fn openai_fallback() -> Vec<ModelInfo> {
    to_infos(OPENAI_FALLBACK)
}

pub fn anthropic_models() -> Vec<ModelInfo> {
    to_infos(ANTHROPIC_MODELS)
}

pub fn gemini_models() -> Vec<ModelInfo> {
    to_infos(GEMINI_MODELS)
}

/// 命中即排除的旧世代/非聊天用途标记
const LEGACY_MARKERS: &[&str] = &[
    "davinci",
    "curie",
    "babbage",
    "ada",
    "instruct",
    "embedding",
    "whisper",
    "tts",
    "dall-e",
    "audio",
    "realtime",
    "moderation",
    "transcribe",
];

/// 是否为现代聊天/推理模型命名
pub fn is_modern_chat_model(id: &str) -> bool {
    let id = id.to_ascii_lowercase();
    if LEGACY_MARKERS.iter().any(|marker| id.contains(marker)) {
        return false;
    }
    id.starts_with("gpt-")
        || id.starts_with("chatgpt-")
        || id.starts_with("o1")
        || id.starts_with("o3")
        || id.starts_with("o4")
}

/// 过滤 + 排序 OpenAI 在线列表的原始模型 ID
///
/// 优先保留现代命名的子集；子集为空时退回未过滤的全集。
pub fn filter_and_sort_openai(ids: Vec<String>) -> Vec<ModelInfo> {
    let preferred: Vec<&String> = ids.iter().filter(|id| is_modern_chat_model(id)).collect();
    let mut chosen: Vec<String> = if preferred.is_empty() {
        ids.clone()
    } else {
        preferred.into_iter().cloned().collect()
    };
    chosen.sort_by(|a, b| natural_cmp(a, b));
    chosen.dedup();
    chosen.into_iter().map(ModelInfo::new).collect()
}

/// 数字感知的字典序比较：连续数字段按数值比较，其余按字符比较
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let na = take_number(&mut ca);
                let nb = take_number(&mut cb);
                match na.cmp(&nb) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            (Some(x), Some(y)) => {
                match x.cmp(&y) {
                    Ordering::Equal => {
                        ca.next();
                        cb.next();
                    }
                    other => return other,
                }
            }
        }
    }
}

/// 读取一段连续数字并转为数值（超长段饱和到 u64::MAX）
fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
    let mut value: u64 = 0;
    while let Some(c) = chars.peek().copied() {
        if let Some(digit) = c.to_digit(10) {
            value = value.saturating_mul(10).saturating_add(u64::from(digit));
            chars.next();
        } else {
            break;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modern_model_detection() {
        assert!(is_modern_chat_model("gpt-4o"));
        assert!(is_modern_chat_model("gpt-4.1-mini"));
        assert!(is_modern_chat_model("o3-mini"));
        assert!(is_modern_chat_model("chatgpt-4o-latest"));
        assert!(!is_modern_chat_model("text-davinci-003"));
        assert!(!is_modern_chat_model("gpt-3.5-turbo-instruct"));
        assert!(!is_modern_chat_model("text-embedding-3-small"));
    }

    #[test]
    fn test_filter_excludes_legacy_and_sorts() {
        let ids = vec![
            "gpt-4o".to_string(),
            "text-davinci-003".to_string(),
            "gpt-4.1-mini".to_string(),
        ];
        let result = filter_and_sort_openai(ids);
        let ids: Vec<&str> = result.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["gpt-4.1-mini", "gpt-4o"]);
    }

    #[test]
    fn test_empty_preferred_subset_keeps_all() {
        let ids = vec!["text-davinci-003".to_string(), "text-curie-001".to_string()];
        let result = filter_and_sort_openai(ids);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_natural_cmp_compares_digit_runs_numerically() {
        assert_eq!(natural_cmp("gpt-4", "gpt-10"), Ordering::Less);
        assert_eq!(natural_cmp("v2.9", "v2.10"), Ordering::Less);
        assert_eq!(natural_cmp("gpt-4o", "gpt-4o"), Ordering::Equal);
        assert_eq!(natural_cmp("gpt-4.1-mini", "gpt-4o"), Ordering::Less);
    }
}
