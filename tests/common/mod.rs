//! 集成测试共用的站点夹具

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use webpify::core::{Document, WebpOptions};

/// 临时目录中的一个站点
pub struct Site {
    dir: TempDir,
}

impl Site {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// 写入文件，自动创建父目录
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// 写入并读回一个 HTML 文档
    pub fn document(&self, relative: &str, html: &str) -> Document {
        Document::read(self.write(relative, html)).unwrap()
    }

    /// 以站点目录为根的选项
    pub fn options(&self) -> WebpOptions {
        WebpOptions {
            source_root: self.root().to_path_buf(),
            ..WebpOptions::default()
        }
    }
}
