//! HTML 处理模块
//!
//! - `utils`: 标签文本的基础操作
//! - `class`: `class` 属性的读取与合并
//! - `tags`: `<img>` / `<video>` 的定位与改写
//! - `styles`: 外部样式表与内联 `<style>` 块

pub mod class;
pub mod styles;
pub mod tags;
pub mod utils;

pub use class::{get_class, merge_marker, set_class};
pub use styles::{
    locate_style_blocks, locate_style_sources, resolve_styles, StyleSheet, StyleSource,
};
pub use tags::{is_ignored, locate_tags, rewrite_tag, rewrite_tags, ImageReference};
