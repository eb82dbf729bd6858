//! 图片标签的定位与改写
//!
//! 改写前：`<img src="/assets/images/test.png">`
//!
//! 改写后：`<img data-src="/assets/images/test.png" data-webp-src="/assets/images/test.webp" class="j-webp">`
//!
//! `src`（`<video>` 上是 `poster`）被改名为 `data-` 前缀的懒加载属性，由页面脚本
//! 根据浏览器是否支持 WebP 决定加载哪一个地址。标签里出现忽略标记（默认
//! `_nowebp`）时整个标签保持原样。

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::core::WebpOptions;
use crate::parsers::html::class::merge_marker;
use crate::parsers::html::utils::append_attr;
use crate::utils::pattern::find_matches;

/// 定位 `<img ... src="...">`
fn img_regex() -> &'static Regex {
    static IMG_REGEX: OnceLock<Regex> = OnceLock::new();
    IMG_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)<img\b[^>]*?\s(src)\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#).unwrap()
    })
}

/// 定位 `<video ... poster="...">`
fn video_regex() -> &'static Regex {
    static VIDEO_REGEX: OnceLock<Regex> = OnceLock::new();
    VIDEO_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)<video\b[^>]*?\s(poster)\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#)
            .unwrap()
    })
}

fn src_attr_regex() -> &'static Regex {
    static SRC_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
    SRC_ATTR_REGEX.get_or_init(|| Regex::new(r"(?i)\s(src)\s*=").unwrap())
}

fn poster_attr_regex() -> &'static Regex {
    static POSTER_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
    POSTER_ATTR_REGEX.get_or_init(|| Regex::new(r"(?i)\s(poster)\s*=").unwrap())
}

/// 从文档中找到的一处图片引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// 原始标签文本；来自 CSS 的引用没有所属标签
    pub owner_tag: Option<String>,
    pub source_path: String,
    pub is_video: bool,
    /// 标签（或 `url(...)`）在所在文本中的字节范围
    pub span: Range<usize>,
}

impl ImageReference {
    /// 改名后的懒加载属性名
    pub fn lazy_attr(&self) -> &'static str {
        if self.is_video {
            "data-poster"
        } else {
            "data-src"
        }
    }

    /// 承载 WebP 地址的属性名
    pub fn webp_attr(&self) -> &'static str {
        if self.is_video {
            "data-webp-poster"
        } else {
            "data-webp-src"
        }
    }
}

/// 判断标签是否带有忽略标记；空标记视为未启用
pub fn is_ignored(tag: &str, ignore_attr: &str) -> bool {
    !ignore_attr.is_empty() && tag.contains(ignore_attr)
}

/// 找出文档中所有需要处理的 `<img>` 与 `<video>` 标签，按出现顺序返回
pub fn locate_tags(html: &str, options: &WebpOptions) -> Vec<ImageReference> {
    let mut references: Vec<ImageReference> = Vec::new();

    for (pattern, is_video) in [(img_regex(), false), (video_regex(), true)] {
        for m in find_matches(html, pattern) {
            let tag = m.as_str();
            if is_ignored(tag, &options.ignore_attr) {
                debug!("跳过带有忽略标记的标签: {}", tag);
                continue;
            }

            let Some(source_path) = m.first_group(&[2, 3]) else {
                continue;
            };
            if !options.image_types.is_eligible(source_path) {
                continue;
            }

            references.push(ImageReference {
                owner_tag: Some(tag.to_string()),
                source_path: source_path.to_string(),
                is_video,
                span: m.range(),
            });
        }
    }

    references.sort_by_key(|reference| reference.span.start);
    references
}

/// 生成单个标签的改写结果
///
/// 找不到源属性或路径不符合类型时返回 `None`，调用方应保持标签不变。
pub fn rewrite_tag(reference: &ImageReference, options: &WebpOptions) -> Option<String> {
    let tag = reference.owner_tag.as_deref()?;
    let webp_path = options.image_types.webp_path(&reference.source_path)?;

    let attr_regex = if reference.is_video {
        poster_attr_regex()
    } else {
        src_attr_regex()
    };
    let name_start = attr_regex.captures(tag)?.get(1)?.start();

    // src= -> data-src=
    let mut renamed = String::with_capacity(tag.len() + 5);
    renamed.push_str(&tag[..name_start]);
    renamed.push_str("data-");
    renamed.push_str(&tag[name_start..]);

    let with_webp = append_attr(&renamed, reference.webp_attr(), &webp_path);
    Some(merge_marker(&with_webp, &options.class_name))
}

/// 改写文档中的所有图片标签，返回新文档和改写的标签数
///
/// 按偏移从左到右拼接原文片段与改写结果，内容相同的重复标签各自独立处理。
pub fn rewrite_tags(html: &str, options: &WebpOptions) -> (String, usize) {
    let references = locate_tags(html, options);
    let mut result = String::with_capacity(html.len() + references.len() * 64);
    let mut cursor = 0;
    let mut rewritten = 0;

    for reference in &references {
        if reference.span.start < cursor {
            continue;
        }
        let Some(new_tag) = rewrite_tag(reference, options) else {
            continue;
        };

        debug!("{} -> {}", reference.source_path, reference.webp_attr());
        result.push_str(&html[cursor..reference.span.start]);
        result.push_str(&new_tag);
        cursor = reference.span.end;
        rewritten += 1;
    }

    result.push_str(&html[cursor..]);
    (result, rewritten)
}
