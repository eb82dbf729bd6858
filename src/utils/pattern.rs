//! 正则匹配辅助
//!
//! 每次调用都返回一份全新的匹配列表，不在调用之间保留任何扫描位置。

use std::ops::Range;

use regex::Regex;

/// 一次匹配：完整匹配的范围以及各个捕获组的范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'t> {
    haystack: &'t str,
    range: Range<usize>,
    groups: Vec<Option<Range<usize>>>,
}

impl<'t> Match<'t> {
    /// 完整匹配的文本
    pub fn as_str(&self) -> &'t str {
        &self.haystack[self.range.clone()]
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// 第 `index` 个捕获组的文本，0 表示完整匹配
    pub fn group(&self, index: usize) -> Option<&'t str> {
        self.group_range(index).map(|range| &self.haystack[range])
    }

    /// 第 `index` 个捕获组在原文中的绝对偏移
    pub fn group_range(&self, index: usize) -> Option<Range<usize>> {
        if index == 0 {
            return Some(self.range.clone());
        }
        self.groups.get(index - 1).cloned().flatten()
    }

    /// 返回第一个参与了匹配的捕获组，用于 `"..."|'...'` 这类互斥分支
    pub fn first_group(&self, indices: &[usize]) -> Option<&'t str> {
        indices.iter().find_map(|&index| self.group(index))
    }

    /// 同 [`Match::first_group`]，返回偏移
    pub fn first_group_range(&self, indices: &[usize]) -> Option<Range<usize>> {
        indices.iter().find_map(|&index| self.group_range(index))
    }
}

/// 在 `text` 中查找 `pattern` 的所有匹配，按起始偏移从左到右排列
///
/// 零宽匹配由 `regex` 的迭代器保证向前推进，不会死循环。
pub fn find_matches<'t>(text: &'t str, pattern: &Regex) -> Vec<Match<'t>> {
    pattern
        .captures_iter(text)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let groups = captures
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.range()))
                .collect();
            Some(Match {
                haystack: text,
                range: whole.range(),
                groups,
            })
        })
        .collect()
}
