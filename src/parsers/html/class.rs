//! `class` 属性的读取与合并

use std::sync::OnceLock;

use regex::Regex;

use crate::parsers::html::utils::append_attr;

/// 匹配 `class="..."` 或 `class='...'`，要求前面是空白，避免命中 `data-class`
fn class_regex() -> &'static Regex {
    static CLASS_REGEX: OnceLock<Regex> = OnceLock::new();
    CLASS_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
    })
}

/// 读取标签的 `class` 属性，不存在时返回空串
pub fn get_class(tag: &str) -> String {
    class_regex()
        .captures(tag)
        .and_then(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|value| value.as_str().to_string())
        .unwrap_or_default()
}

/// 设置标签的 `class` 属性
///
/// 已有 `class` 时原地替换它的值（保留原来的引号）；
/// 没有时在结束符之前插入 `class="..."`。
pub fn set_class(tag: &str, value: &str) -> String {
    let value_range = class_regex()
        .captures(tag)
        .and_then(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|m| m.range());

    match value_range {
        Some(range) => {
            let mut result = String::with_capacity(tag.len() + value.len());
            result.push_str(&tag[..range.start]);
            result.push_str(value);
            result.push_str(&tag[range.end..]);
            result
        }
        None => append_attr(tag, "class", value),
    }
}

/// 把标记类名合并进 `class`
///
/// 只要当前值里已经包含该子串就不再添加（不按单词边界判断）。
pub fn merge_marker(tag: &str, marker: &str) -> String {
    let current = get_class(tag);
    if current.contains(marker) {
        return tag.to_string();
    }

    let merged = if current.is_empty() {
        marker.to_string()
    } else {
        format!("{} {}", current, marker)
    };
    set_class(tag, &merged)
}
