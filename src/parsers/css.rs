//! CSS 解析器模块
//!
//! 找出样式表中 `url(...)` 引用的图片，并为每条规则追加一条指向 WebP 图片的规则：
//!
//! ```css
//! .a{background-image:url(b.png)}
//! ```
//!
//! 变为
//!
//! ```css
//! .a{background-image:url(b.png)}html.webp .a{background-image:url(b.webp)}
//! ```
//!
//! 前缀（默认 `html.webp`）由页面脚本在检测到 WebP 支持后加到根元素上。
//!
//! `url()` 的位置由 cssparser 的分词器确定，因此注释和字符串里的 `url(` 不会被误认。
//! 所属规则的选择器则用括号配对的启发式查找：从 `url()` 向前找最近的 `{`，
//! 再向前找最近的 `}` 或 `{`，两者之间的文本就是选择器。这对扁平样式表和
//! `@media` 中的一层嵌套是正确的；值里出现字面量 `{`/`}` 时会定位错误。

use std::ops::Range;

use cssparser::{serialize_string, ParseError, Parser, ParserInput, Token};
use tracing::debug;

use crate::core::WebpOptions;

/// 需要加引号才能放进 `url()` 的字符
const URL_SPECIAL_CHARS: &[char] = &[' ', '\t', '\n', '(', ')', '"', '\'', '\\'];

/// 样式表中的一处 `url(...)` 图片引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRuleReference {
    /// 原文中的 `url(...)` 文本
    pub rule_url_text: String,
    /// 所属规则的选择器
    pub rule_selector: String,
    /// `url()` 中的路径（已去掉引号和转义）
    pub source_path: String,
    /// `url(...)` 在样式表中的字节范围
    pub url_span: Range<usize>,
    /// 所属规则右花括号之后的偏移
    pub rule_end: usize,
}

/// 分词得到的 `url()`
#[derive(Debug, Clone, PartialEq, Eq)]
struct UrlToken {
    span: Range<usize>,
    value: String,
}

/// 格式化带引号的CSS字符串
pub fn format_quoted_string(string: &str) -> String {
    let mut res: String = "".to_string();
    let _ = serialize_string(string, &mut res);
    res
}

/// 生成 `url(...)`，路径含特殊字符时加引号
pub fn format_url(path: &str) -> String {
    if path.contains(URL_SPECIAL_CHARS) {
        format!("url({})", format_quoted_string(path))
    } else {
        format!("url({})", path)
    }
}

fn scan_url_tokens(css: &str) -> Vec<UrlToken> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut tokens = Vec::new();
    collect_url_tokens(&mut parser, &mut tokens);
    tokens
}

/// 递归遍历所有 token（包括嵌套块），收集 `url()`
fn collect_url_tokens<'i, 't>(parser: &mut Parser<'i, 't>, tokens: &mut Vec<UrlToken>) {
    loop {
        let start = parser.position().byte_index();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            // url(a.png)
            Token::UnquotedUrl(value) => tokens.push(UrlToken {
                span: start..parser.position().byte_index(),
                value: value.to_string(),
            }),
            // url("a.png")
            Token::Function(ref name) if name.eq_ignore_ascii_case("url") => {
                let value = parser
                    .parse_nested_block(|parser| {
                        let value = match parser.next() {
                            Ok(Token::QuotedString(value)) => Some(value.to_string()),
                            _ => None,
                        };
                        Ok::<_, ParseError<'i, ()>>(value)
                    })
                    .ok()
                    .flatten();
                if let Some(value) = value {
                    tokens.push(UrlToken {
                        span: start..parser.position().byte_index(),
                        value,
                    });
                }
            }
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                let _ = parser.parse_nested_block(|parser| {
                    collect_url_tokens(parser, tokens);
                    Ok::<_, ParseError<'i, ()>>(())
                });
            }
            _ => {}
        }
    }
}

/// 找出 `url()` 所在规则的选择器和右花括号之后的偏移
///
/// `url()` 前最近的 `{` 若已被一个 `}` 闭合，说明它不在任何规则内，返回 `None`。
fn enclosing_rule(css: &str, url_span: &Range<usize>) -> Option<(String, usize)> {
    let before = &css[..url_span.start];
    let open = before.rfind('{')?;
    if before[open..].contains('}') {
        return None;
    }

    let selector_start = css[..open]
        .rfind(['}', '{', ';'])
        .map(|index| index + 1)
        .unwrap_or(0);
    let selector = css[selector_start..open].trim();
    if selector.is_empty() {
        return None;
    }

    let close = css[url_span.end..].find('}')? + url_span.end;
    Some((selector.to_string(), close + 1))
}

/// 在顶层逗号处拆分选择器列表，括号内的逗号不拆
fn split_selector_list(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, c) in selector.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(selector[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(selector[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

/// 给选择器列表中的每一项加上前缀
pub fn prefix_selector(prefix: &str, selector: &str) -> String {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return selector.to_string();
    }
    split_selector_list(selector)
        .iter()
        .map(|part| format!("{} {}", prefix, part))
        .collect::<Vec<_>>()
        .join(",")
}

/// 找出样式表中所有符合类型、且位于某条规则内的 `url()` 图片引用
pub fn locate_css_rules(style_text: &str, options: &WebpOptions) -> Vec<CssRuleReference> {
    scan_url_tokens(style_text)
        .into_iter()
        .filter(|token| options.image_types.is_eligible(&token.value))
        .filter_map(|token| {
            let Some((selector, rule_end)) = enclosing_rule(style_text, &token.span) else {
                debug!("url() 不在任何规则内，跳过: {}", token.value);
                return None;
            };
            Some(CssRuleReference {
                rule_url_text: style_text[token.span.clone()].to_string(),
                rule_selector: selector,
                source_path: token.value,
                url_span: token.span,
                rule_end,
            })
        })
        .collect()
}

/// 为每条引用了图片的规则追加一条 WebP 规则，紧跟在原规则的右花括号之后
///
/// 同一条规则里的多个 `url()` 合并为一条 `background-image`。所有插入点都基于
/// 原文偏移，一次从左到右拼接完成。右花括号后已经是同样的 WebP 规则时不再追加，
/// 返回的计数只包含新追加的规则。
pub fn rewrite_style(style_text: &str, options: &WebpOptions) -> (String, usize) {
    let references = locate_css_rules(style_text, options);

    // (插入偏移, 选择器, WebP 地址列表)
    let mut insertions: Vec<(usize, String, Vec<String>)> = Vec::new();
    for reference in &references {
        let Some(webp_path) = options.image_types.webp_path(&reference.source_path) else {
            continue;
        };
        match insertions.last_mut() {
            Some((offset, _, urls)) if *offset == reference.rule_end => urls.push(webp_path),
            _ => insertions.push((
                reference.rule_end,
                reference.rule_selector.clone(),
                vec![webp_path],
            )),
        }
    }

    let mut result = String::with_capacity(style_text.len() + insertions.len() * 64);
    let mut cursor = 0;
    let mut inserted = 0;
    for (offset, selector, urls) in &insertions {
        let rule = webp_rule(&options.css_rule_prefix, selector, urls);
        // 已经改写过的样式表不再重复追加
        if style_text[*offset..].starts_with(&rule) {
            debug!("WebP 规则已存在，跳过: {}", selector);
            continue;
        }
        result.push_str(&style_text[cursor..*offset]);
        result.push_str(&rule);
        cursor = *offset;
        inserted += 1;
    }
    result.push_str(&style_text[cursor..]);

    (result, inserted)
}

/// 生成追加的规则文本
fn webp_rule(prefix: &str, selector: &str, urls: &[String]) -> String {
    let urls: Vec<String> = urls.iter().map(|url| format_url(url)).collect();
    format!(
        "{}{{background-image:{}}}",
        prefix_selector(prefix, selector),
        urls.join(",")
    )
}
