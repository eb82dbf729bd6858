//! 配置文件加载
//!
//! 优先级从低到高：内置默认值、TOML 配置文件、环境变量、命令行参数。
//! 命令行参数由调用方在 [`load_options`] 之后覆盖。

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::core::{WebpError, WebpOptions, WebpResult};
use crate::env::apply_env_overrides;
use crate::utils::image_types::ImageTypes;

/// 未显式指定时依次查找的配置文件
pub const CONFIG_PATHS: &[&str] = &[
    "webpify.toml",
    ".webpify.toml",
    "~/.config/webpify/config.toml",
];

/// 配置文件内容，所有字段可选
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub class_name: Option<String>,
    pub image_types: Option<Vec<String>>,
    pub ignore_attr: Option<String>,
    pub css_rule_prefix: Option<String>,
    pub source_root: Option<String>,
    pub output_base: Option<String>,
    pub encoding: Option<String>,
}

impl FileConfig {
    pub fn from_toml(content: &str) -> WebpResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> WebpResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| WebpError::MissingFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// 把文件中出现的字段写入选项
    pub fn apply(self, options: &mut WebpOptions) {
        if let Some(class_name) = self.class_name {
            options.class_name = class_name;
        }
        if let Some(image_types) = self.image_types {
            options.image_types = ImageTypes::new(image_types);
        }
        if let Some(ignore_attr) = self.ignore_attr {
            options.ignore_attr = ignore_attr;
        }
        if let Some(prefix) = self.css_rule_prefix {
            options.css_rule_prefix = prefix;
        }
        if let Some(source_root) = self.source_root {
            options.source_root = expand_path(&source_root);
        }
        if let Some(output_base) = self.output_base {
            options.output_base = Some(expand_path(&output_base));
        }
        if let Some(encoding) = self.encoding {
            options.encoding = Some(encoding);
        }
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// 找到第一个存在的默认配置文件
pub fn find_config_file() -> Option<PathBuf> {
    CONFIG_PATHS
        .iter()
        .map(|path| expand_path(path))
        .find(|path| path.exists())
}

/// 组合默认值、配置文件与环境变量
///
/// 显式给出的配置文件不存在时返回错误；默认位置都没有文件时直接使用默认值。
pub fn load_options(config_path: Option<&Path>) -> WebpResult<WebpOptions> {
    let mut options = WebpOptions::default();

    let path = match config_path {
        Some(path) => Some(expand_path(&path.to_string_lossy())),
        None => find_config_file(),
    };
    match path {
        Some(path) => {
            info!("加载配置文件: {}", path.display());
            FileConfig::from_file(&path)?.apply(&mut options);
        }
        None => debug!("未找到配置文件，使用默认配置"),
    }

    apply_env_overrides(&mut options)?;
    options.validate()?;
    Ok(options)
}
