//! 图片类型过滤
//!
//! 只有扩展名（不区分大小写、锚定在路径末尾）属于配置集合的引用才会被处理。

use std::fmt;

use regex::Regex;

/// 默认处理的图片扩展名
pub const DEFAULT_IMAGE_TYPES: &[&str] = &["jpg", "jpeg", "png"];

/// WebP 扩展名
pub const WEBP_EXTENSION: &str = ".webp";

/// 有序、去重的扩展名集合
///
/// 空集合得到一个什么都不匹配的过滤器，而不是错误。
#[derive(Clone)]
pub struct ImageTypes {
    extensions: Vec<String>,
    pattern: Option<Regex>,
}

impl ImageTypes {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for extension in extensions {
            let extension = extension.as_ref().trim().trim_start_matches('.');
            if extension.is_empty() {
                continue;
            }
            if !list.iter().any(|e| e.eq_ignore_ascii_case(extension)) {
                list.push(extension.to_string());
            }
        }

        let pattern = if list.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = list.iter().map(|e| regex::escape(e)).collect();
            Regex::new(&format!(r"(?i)\.(?:{})$", alternatives.join("|"))).ok()
        };

        Self {
            extensions: list,
            pattern,
        }
    }

    /// 解析逗号分隔的形式，如 `"jpg,jpeg,png"`
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// 路径是否以集合中的某个扩展名结尾
    pub fn is_eligible(&self, path: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(path))
    }

    /// 把末尾的扩展名替换成 `.webp`；不符合条件时返回 `None`
    pub fn webp_path(&self, path: &str) -> Option<String> {
        let re = self.pattern.as_ref()?;
        if !re.is_match(path) {
            return None;
        }
        Some(re.replace(path, WEBP_EXTENSION).into_owned())
    }
}

impl Default for ImageTypes {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_TYPES)
    }
}

impl PartialEq for ImageTypes {
    fn eq(&self, other: &Self) -> bool {
        self.extensions == other.extensions
    }
}

impl fmt::Debug for ImageTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImageTypes").field(&self.extensions).finish()
    }
}

impl fmt::Display for ImageTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extensions.join(","))
    }
}
