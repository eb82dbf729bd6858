use std::io;
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::env::{self, EnvVar};
use crate::parsers::css::{locate_css_rules, rewrite_style};
use crate::parsers::html::styles::{locate_style_blocks, locate_style_sources, resolve_styles};
use crate::parsers::html::tags::{locate_tags, rewrite_tags};
use crate::utils::image_types::ImageTypes;
use crate::utils::path::{is_local_reference, AssetResolver};

/// Errors that can occur while collecting or rewriting image references
#[derive(Error, Debug)]
pub enum WebpError {
    /// 引用的图片或样式表无法读取
    #[error("文件读取失败 {}: {source}", .path.display())]
    MissingFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 文档编码错误
    #[error("编码错误: {0}")]
    Encoding(String),

    /// 配置文件解析错误
    #[error("解析TOML配置失败: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O错误: {0}")]
    Io(#[from] io::Error),
}

impl WebpError {
    /// 缺失的图片只影响它自己，其余错误会中止当前文档
    pub fn is_fatal(&self) -> bool {
        !matches!(self, WebpError::MissingFile { .. })
    }

    /// 配置错误对所有文档都成立，批处理应立即停止
    pub fn is_config_error(&self) -> bool {
        matches!(self, WebpError::Config(_) | WebpError::Toml(_))
    }
}

pub type WebpResult<T> = Result<T, WebpError>;

pub const DEFAULT_CLASS_NAME: &str = "j-webp";
pub const DEFAULT_IGNORE_ATTR: &str = "_nowebp";
pub const DEFAULT_CSS_RULE_PREFIX: &str = "html.webp";

/// Configuration options for webp processing
///
/// Built once per run and only read afterwards, so one instance can be shared
/// across documents processed in parallel.
#[derive(Debug, Clone, PartialEq)]
pub struct WebpOptions {
    /// 标记类名，页面脚本据此判断元素是否有 WebP 版本
    pub class_name: String,
    pub image_types: ImageTypes,
    /// 标签中出现该子串时跳过整个标签
    pub ignore_attr: String,
    /// 追加的 WebP 规则的选择器前缀
    pub css_rule_prefix: String,
    /// 解析 `/` 开头引用的根目录
    pub source_root: PathBuf,
    /// collect 输出文件的目标根目录
    pub output_base: Option<PathBuf>,
    /// 文档字符集标签，默认 UTF-8
    pub encoding: Option<String>,
    pub silent: bool,
}

impl Default for WebpOptions {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_CLASS_NAME.to_string(),
            image_types: ImageTypes::default(),
            ignore_attr: DEFAULT_IGNORE_ATTR.to_string(),
            css_rule_prefix: DEFAULT_CSS_RULE_PREFIX.to_string(),
            source_root: PathBuf::from("."),
            output_base: None,
            encoding: None,
            silent: false,
        }
    }
}

impl WebpOptions {
    pub fn validate(&self) -> WebpResult<()> {
        if self.class_name.trim().is_empty() {
            return Err(WebpError::Config("class name must not be empty".to_string()));
        }
        if self.class_name.contains(['"', '\'', '<', '>']) {
            return Err(WebpError::Config(format!(
                "invalid class name \"{}\"",
                self.class_name
            )));
        }
        self.document_encoding()?;
        Ok(())
    }

    pub fn resolver(&self) -> AssetResolver {
        AssetResolver::new(&self.source_root)
    }

    fn document_encoding(&self) -> WebpResult<&'static Encoding> {
        match &self.encoding {
            Some(label) => Encoding::for_label_no_replacement(label.as_bytes())
                .ok_or_else(|| WebpError::Config(format!("unknown encoding \"{}\"", label))),
            None => Ok(UTF_8),
        }
    }
}

/// 一个待处理的文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    pub fn read(path: impl Into<PathBuf>) -> WebpResult<Self> {
        let path = path.into();
        let contents = std::fs::read(&path).map_err(|source| WebpError::MissingFile {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, contents })
    }
}

/// 输出文件：目标路径和内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// `collect` 的结果
#[derive(Debug, Default)]
pub struct Collection {
    pub artifacts: Vec<Artifact>,
    /// 读取失败而被跳过的文件
    pub missing: Vec<PathBuf>,
}

/// `replace` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOutput {
    pub document: Vec<u8>,
    /// 改写过的外部样式表，路径与原文件相同
    pub stylesheets: Vec<Artifact>,
}

/// 解码后的文档，以及写回时使用的字符集
struct DecodedDocument {
    text: String,
    encoding: &'static Encoding,
    /// 原文以 BOM 开头
    bom: bool,
}

fn decode_document(document: &Document, options: &WebpOptions) -> WebpResult<DecodedDocument> {
    let configured = options.document_encoding()?;
    let (encoding, bom) = match Encoding::for_bom(&document.contents) {
        Some((encoding, _)) => (encoding, true),
        None => (configured, false),
    };

    let (text, _, had_errors) = encoding.decode(&document.contents);
    if had_errors {
        return Err(WebpError::Encoding(format!(
            "{} is not valid {}, use --encoding to set the document charset",
            document.path.display(),
            encoding.name()
        )));
    }
    Ok(DecodedDocument {
        text: text.into_owned(),
        encoding,
        bom,
    })
}

fn encode_document(text: &str, decoded: &DecodedDocument) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() + 3);

    // encoding_rs 不输出 UTF-16，按码元手工写出
    if decoded.encoding == UTF_16LE || decoded.encoding == UTF_16BE {
        let little_endian = decoded.encoding == UTF_16LE;
        if decoded.bom {
            bytes.extend_from_slice(if little_endian { b"\xFF\xFE" } else { b"\xFE\xFF" });
        }
        for unit in text.encode_utf16() {
            if little_endian {
                bytes.extend_from_slice(&unit.to_le_bytes());
            } else {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
        }
        return bytes;
    }

    if decoded.bom {
        bytes.extend_from_slice(b"\xEF\xBB\xBF");
    }
    let (encoded, _, _) = decoded.encoding.encode(text);
    bytes.extend_from_slice(&encoded);
    bytes
}

/// 改写内联 `<style>` 块
fn rewrite_style_blocks(html: &str, options: &WebpOptions) -> (String, usize) {
    let mut result = String::with_capacity(html.len());
    let mut cursor = 0;
    let mut rewritten = 0;

    for span in locate_style_blocks(html) {
        let (css, count) = rewrite_style(&html[span.clone()], options);
        if count == 0 {
            continue;
        }
        result.push_str(&html[cursor..span.start]);
        result.push_str(&css);
        cursor = span.end;
        rewritten += count;
    }

    result.push_str(&html[cursor..]);
    (result, rewritten)
}

/// 改写 HTML 文本：图片标签和内联样式块
pub fn replace_html(html: &str, options: &WebpOptions) -> String {
    let (html_with_styles, rules) = rewrite_style_blocks(html, options);
    let (result, tags) = rewrite_tags(&html_with_styles, options);
    debug!("改写了 {} 个标签、{} 条内联样式规则", tags, rules);
    result
}

/// 改写文档以及它链接的样式表
///
/// 链接的样式表读取失败时整个文档返回错误。
pub fn replace(document: &Document, options: &WebpOptions) -> WebpResult<ReplaceOutput> {
    let decoded = decode_document(document, options)?;
    let html = decoded.text.as_str();
    let rewritten = replace_html(html, options);

    let resolver = options.resolver();
    let document_dir = resolver.owner_dir(&document.path);
    let mut stylesheets: Vec<Artifact> = Vec::new();

    for sheet in resolve_styles(html, &resolver, &document_dir)? {
        let Some(location) = sheet.location else {
            continue;
        };
        if stylesheets.iter().any(|artifact| artifact.path == location) {
            continue;
        }
        let (css, rules) = rewrite_style(&sheet.content, options);
        if rules == 0 {
            continue;
        }
        debug!("样式表 {} 追加了 {} 条 WebP 规则", location.display(), rules);
        stylesheets.push(Artifact {
            path: location,
            contents: css.into_bytes(),
        });
    }

    let contents = if rewritten == html {
        document.contents.clone()
    } else {
        encode_document(&rewritten, &decoded)
    };

    info!(
        "{}: {} 个样式表已改写",
        document.path.display(),
        stylesheets.len()
    );

    Ok(ReplaceOutput {
        document: contents,
        stylesheets,
    })
}

/// 一处待读取的图片引用和它所在文件的目录
struct PendingRead {
    reference: String,
    owner_dir: PathBuf,
}

fn read_reference(
    pending: &PendingRead,
    resolver: &AssetResolver,
    output_base: Option<&Path>,
) -> WebpResult<Option<Artifact>> {
    if !is_local_reference(&pending.reference) {
        debug!("跳过非本地图片: {}", pending.reference);
        return Ok(None);
    }

    let resolved = resolver.resolve(&pending.reference, &pending.owner_dir);
    let contents = std::fs::read(&resolved).map_err(|source| WebpError::MissingFile {
        path: resolved.clone(),
        source,
    })?;

    Ok(Some(Artifact {
        path: resolver.rebase(&resolved, output_base),
        contents,
    }))
}

/// 收集文档（及其样式表）引用的所有图片文件
///
/// 每处引用产出一个文件，相同路径被引用多次时也不去重。
/// 缺失的文件记入 `missing` 并跳过，不影响其余引用。
pub fn collect(document: &Document, options: &WebpOptions) -> WebpResult<Collection> {
    let html = decode_document(document, options)?.text;
    let resolver = options.resolver();
    let document_dir = resolver.owner_dir(&document.path);
    let mut collection = Collection::default();

    let mut pending: Vec<PendingRead> = locate_tags(&html, options)
        .into_iter()
        .map(|reference| PendingRead {
            reference: reference.source_path,
            owner_dir: document_dir.clone(),
        })
        .collect();

    for (_, source) in locate_style_sources(&html) {
        let sheet = match source.load(&html, &resolver, &document_dir) {
            Ok(Some(sheet)) => sheet,
            Ok(None) => continue,
            Err(WebpError::MissingFile { path, source }) => {
                warn!("样式表不存在，跳过: {} ({})", path.display(), source);
                collection.missing.push(path);
                continue;
            }
            Err(e) => return Err(e),
        };

        let owner_dir = match &sheet.location {
            Some(location) => resolver.owner_dir(location),
            None => document_dir.clone(),
        };
        pending.extend(
            locate_css_rules(&sheet.content, options)
                .into_iter()
                .map(|reference| PendingRead {
                    reference: reference.source_path,
                    owner_dir: owner_dir.clone(),
                }),
        );
    }

    let output_base = options.output_base.as_deref();
    let results: Vec<WebpResult<Option<Artifact>>> = pending
        .par_iter()
        .map(|pending| read_reference(pending, &resolver, output_base))
        .collect();

    for result in results {
        match result {
            Ok(Some(artifact)) => collection.artifacts.push(artifact),
            Ok(None) => {}
            Err(WebpError::MissingFile { path, source }) => {
                warn!("图片不存在，跳过: {} ({})", path.display(), source);
                collection.missing.push(path);
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "{}: 收集到 {} 个图片，{} 个缺失",
        document.path.display(),
        collection.artifacts.len(),
        collection.missing.len()
    );

    Ok(collection)
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// stderr 是终端且没有设置 NO_COLOR
pub fn use_color() -> bool {
    atty::is(atty::Stream::Stderr) && !env::core::NoColor::get().unwrap_or(false)
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    if use_color() {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}
