//! 引用路径到磁盘路径的映射

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

/// 判断引用是否指向本地文件
///
/// 远程地址、协议相对地址和内联数据都没有可读取的本地文件。
pub fn is_local_reference(reference: &str) -> bool {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with("//") || reference.starts_with('#') {
        return false;
    }

    match reference.find(':') {
        // Windows 盘符（C:\）不算协议
        Some(1) => true,
        Some(colon) => reference[..colon].contains(['/', '?', '#']),
        None => true,
    }
}

/// 去掉引用中的查询串和片段
pub fn strip_query(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    &reference[..end]
}

/// 词法规范化：折叠 `.` 和 `..`，不访问文件系统
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// 以 `source_root` 为根解析引用
#[derive(Debug, Clone)]
pub struct AssetResolver {
    source_root: PathBuf,
}

impl AssetResolver {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// 文件所在目录；没有父目录时退回到 `source_root`
    pub fn owner_dir(&self, owner: &Path) -> PathBuf {
        match owner.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => self.source_root.clone(),
        }
    }

    /// `/a.png` 相对 `source_root`，`a.png` 相对引用者所在目录
    pub fn resolve(&self, reference: &str, owner_dir: &Path) -> PathBuf {
        let reference = strip_query(reference.trim());
        let decoded = percent_decode_str(reference).decode_utf8_lossy();

        let joined = match decoded.strip_prefix('/') {
            Some(rooted) => self.source_root.join(rooted),
            None => owner_dir.join(&*decoded),
        };
        normalize_path(&joined)
    }

    /// 把已解析的路径从 `source_root` 下移到 `output_base` 下
    pub fn rebase(&self, resolved: &Path, output_base: Option<&Path>) -> PathBuf {
        let Some(output_base) = output_base else {
            return resolved.to_path_buf();
        };
        let root = normalize_path(&self.source_root);
        let relative = resolved.strip_prefix(&root).unwrap_or(resolved);
        let relative: PathBuf = relative
            .components()
            .filter(|c| matches!(c, Component::Normal(_) | Component::ParentDir))
            .collect();
        normalize_path(&output_base.join(relative))
    }
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new(".")
    }
}
