//! # 工具模块
//!
//! 这个模块包含各种工具函数和实用程序：
//!
//! - 无状态的正则匹配辅助
//! - 图片扩展名过滤和 WebP 路径推导
//! - 引用路径解析和输出目录重定位
//!
//! # 模块组织
//!
//! - `pattern` - 返回完整匹配列表的正则辅助函数
//! - `image_types` - 图片类型过滤器
//! - `path` - 本地引用判断、路径规范化、`AssetResolver`

pub mod image_types;
pub mod path;
pub mod pattern;

// Re-export commonly used items for convenience
pub use image_types::{ImageTypes, DEFAULT_IMAGE_TYPES, WEBP_EXTENSION};
pub use path::{is_local_reference, normalize_path, strip_query, AssetResolver};
pub use pattern::{find_matches, Match};
