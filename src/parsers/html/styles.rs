//! 文档引用的样式表
//!
//! 两种来源：`<link href="*.css">` 指向的外部文件，以及内联的 `<style>` 块。

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use encoding_rs::UTF_8;
use regex::Regex;
use tracing::debug;

use crate::core::{WebpError, WebpResult};
use crate::utils::path::{is_local_reference, strip_query, AssetResolver};
use crate::utils::pattern::find_matches;

fn link_regex() -> &'static Regex {
    static LINK_REGEX: OnceLock<Regex> = OnceLock::new();
    LINK_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)<link\b[^>]*?\shref\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#).unwrap()
    })
}

fn style_block_regex() -> &'static Regex {
    static STYLE_BLOCK_REGEX: OnceLock<Regex> = OnceLock::new();
    STYLE_BLOCK_REGEX.get_or_init(|| Regex::new(r"(?is)<style\b[^>]*>(.*?)</style\s*>").unwrap())
}

/// 一份样式表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    /// `<link>` 上写的 href；内联块为 `None`
    pub link_path: Option<String>,
    /// 外部文件解析后的磁盘路径
    pub location: Option<PathBuf>,
    pub content: String,
    /// 内联块内容在文档中的字节范围
    pub inline_span: Option<Range<usize>>,
}

impl StyleSheet {
    pub fn is_inline(&self) -> bool {
        self.link_path.is_none()
    }
}

/// 文档中的样式表来源，尚未读取
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleSource {
    Linked { href: String },
    Inline { span: Range<usize> },
}

impl StyleSource {
    /// 加载内容
    ///
    /// 外部文件读取失败返回 `MissingFile`；空的内联块和远程样式表返回 `None`。
    pub fn load(
        &self,
        html: &str,
        resolver: &AssetResolver,
        document_dir: &Path,
    ) -> WebpResult<Option<StyleSheet>> {
        match self {
            StyleSource::Inline { span } => {
                let content = &html[span.clone()];
                if content.trim().is_empty() {
                    return Ok(None);
                }
                Ok(Some(StyleSheet {
                    link_path: None,
                    location: None,
                    content: content.to_string(),
                    inline_span: Some(span.clone()),
                }))
            }
            StyleSource::Linked { href } => {
                if !is_local_reference(href) {
                    debug!("跳过远程样式表: {}", href);
                    return Ok(None);
                }

                let location = resolver.resolve(href, document_dir);
                let bytes = fs::read(&location).map_err(|source| WebpError::MissingFile {
                    path: location.clone(),
                    source,
                })?;
                let (content, _) = UTF_8.decode_with_bom_removal(&bytes);

                Ok(Some(StyleSheet {
                    link_path: Some(href.clone()),
                    location: Some(location),
                    content: content.into_owned(),
                    inline_span: None,
                }))
            }
        }
    }
}

fn is_css_href(href: &str) -> bool {
    strip_query(href.trim()).to_ascii_lowercase().ends_with(".css")
}

/// 找出内联 `<style>` 块的内容范围
pub fn locate_style_blocks(html: &str) -> Vec<Range<usize>> {
    find_matches(html, style_block_regex())
        .iter()
        .filter_map(|m| m.group_range(1))
        .collect()
}

/// 按文档顺序列出所有样式表来源
pub fn locate_style_sources(html: &str) -> Vec<(usize, StyleSource)> {
    let mut sources: Vec<(usize, StyleSource)> = find_matches(html, link_regex())
        .iter()
        .filter_map(|m| {
            let href = m.first_group(&[1, 2])?;
            is_css_href(href).then(|| {
                (
                    m.start(),
                    StyleSource::Linked {
                        href: href.trim().to_string(),
                    },
                )
            })
        })
        .collect();

    sources.extend(
        locate_style_blocks(html)
            .into_iter()
            .map(|span| (span.start, StyleSource::Inline { span })),
    );
    sources.sort_by_key(|(offset, _)| *offset);
    sources
}

/// 读取文档引用的所有样式表，任何外部文件缺失都会立即返回错误
pub fn resolve_styles(
    html: &str,
    resolver: &AssetResolver,
    document_dir: &Path,
) -> WebpResult<Vec<StyleSheet>> {
    let mut sheets = Vec::new();
    for (_, source) in locate_style_sources(html) {
        if let Some(sheet) = source.load(html, resolver, document_dir)? {
            sheets.push(sheet);
        }
    }
    Ok(sheets)
}
