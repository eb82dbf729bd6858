//! # webpify
//!
//! 为 HTML 文档中的图片接入 WebP：把 `<img>` / `<video poster>` 改写为懒加载属性并
//! 附上 `.webp` 地址，为样式表中的背景图追加带前缀的 WebP 规则，并收集所有被引用的
//! 图片文件以便后续转码。
//!
//! ## 模块组织
//!
//! - `core` - 选项、错误类型以及 `replace` / `collect` 两个入口
//! - `parsers` - HTML 标签与 CSS 规则的定位和改写
//! - `utils` - 模式匹配、图片类型过滤、路径解析
//! - `config` - TOML 配置文件
//! - `env` - 环境变量

pub mod config;
pub mod core;
pub mod env;
pub mod parsers;
pub mod utils;

// Re-export commonly used items for convenience
pub use self::core::*;
pub use parsers::*;
pub use utils::*;
