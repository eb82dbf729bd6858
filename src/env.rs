//! 统一的环境变量管理
//!
//! 每个变量是一个实现 [`EnvVar`] 的零大小类型，负责自己的名字、默认值和解析。

use std::env;
use std::fmt;

use crate::core::{WebpError, WebpOptions};
use crate::utils::image_types::ImageTypes as ImageTypeList;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

impl From<EnvError> for WebpError {
    fn from(error: EnvError) -> Self {
        WebpError::Config(error.to_string())
    }
}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 变量未设置时返回 `None`，设置了但无法解析时返回错误
    fn get_optional() -> EnvResult<Option<T>> {
        Self::lookup(|name| env::var(name).ok())
    }

    /// 从给定的查找函数读取变量
    fn lookup<F>(source: F) -> EnvResult<Option<T>>
    where
        F: Fn(&str) -> Option<String>,
    {
        source(Self::NAME)
            .map(|value| Self::parse(&value))
            .transpose()
    }
}

/// 进程级变量
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "WEBPIFY_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 约定：任何非空值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 覆盖 [`WebpOptions`] 字段的变量
pub mod options {
    use super::*;

    pub struct ClassName;
    impl EnvVar<String> for ClassName {
        const NAME: &'static str = "WEBPIFY_CLASS_NAME";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Marker class added to rewritten tags";

        fn parse(value: &str) -> EnvResult<String> {
            let value = value.trim();
            if value.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Class name must not be empty".to_string(),
                });
            }
            Ok(value.to_string())
        }
    }

    pub struct ImageTypes;
    impl EnvVar<ImageTypeList> for ImageTypes {
        const NAME: &'static str = "WEBPIFY_IMAGE_TYPES";
        const DEFAULT: Option<ImageTypeList> = None;
        const DESCRIPTION: &'static str = "Eligible image extensions (comma-separated)";

        fn parse(value: &str) -> EnvResult<ImageTypeList> {
            Ok(ImageTypeList::parse(value))
        }
    }

    pub struct IgnoreAttr;
    impl EnvVar<String> for IgnoreAttr {
        const NAME: &'static str = "WEBPIFY_IGNORE_ATTR";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Tags containing this text are left untouched";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }

    pub struct CssPrefix;
    impl EnvVar<String> for CssPrefix {
        const NAME: &'static str = "WEBPIFY_CSS_PREFIX";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Selector prefix of generated WebP rules";

        fn parse(value: &str) -> EnvResult<String> {
            Ok(value.trim().to_string())
        }
    }
}

/// 用已设置的环境变量覆盖选项
pub fn apply_env_overrides(options: &mut WebpOptions) -> EnvResult<()> {
    apply_overrides_from(options, |name| env::var(name).ok())
}

/// 用查找函数提供的变量覆盖选项
pub fn apply_overrides_from<F>(options: &mut WebpOptions, source: F) -> EnvResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(class_name) = options::ClassName::lookup(&source)? {
        options.class_name = class_name;
    }
    if let Some(image_types) = options::ImageTypes::lookup(&source)? {
        options.image_types = image_types;
    }
    if let Some(ignore_attr) = options::IgnoreAttr::lookup(&source)? {
        options.ignore_attr = ignore_attr;
    }
    if let Some(prefix) = options::CssPrefix::lookup(&source)? {
        options.css_rule_prefix = prefix;
    }
    Ok(())
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    let entries = [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (core::NoColor::NAME, core::NoColor::DESCRIPTION),
        (options::ClassName::NAME, options::ClassName::DESCRIPTION),
        (options::ImageTypes::NAME, options::ImageTypes::DESCRIPTION),
        (options::IgnoreAttr::NAME, options::IgnoreAttr::DESCRIPTION),
        (options::CssPrefix::NAME, options::CssPrefix::DESCRIPTION),
    ];
    for (name, description) in entries {
        docs.push_str(&format!("- `{}`: {}\n", name, description));
    }

    docs
}
