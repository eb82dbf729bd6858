//! # 解析器模块
//!
//! - `html` - 图片标签、`class` 属性、样式表来源
//! - `css` - 样式表中 `url()` 的定位与 WebP 规则追加

pub mod css;
pub mod html;

// Re-export commonly used items for convenience
pub use css::{locate_css_rules, rewrite_style, CssRuleReference};
pub use html::{
    get_class, locate_style_blocks, locate_tags, merge_marker, resolve_styles, rewrite_tag,
    rewrite_tags, set_class, ImageReference, StyleSheet,
};
