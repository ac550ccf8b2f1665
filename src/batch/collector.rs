//! # 文件收集器
//!
//! 根据输入目录和 glob 模式收集待转换的源文件。
//!
//! ## 功能
//! - glob 模式匹配（逗号分隔多模式，不区分大小写）
//! - 可选递归目录搜索
//! - 结果按完整路径排序，保证同一输入的发现顺序稳定
//! - 指向文件的符号链接与普通文件同样收集（不跟随目录链接）
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs`, `commands/interactive.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{ConverterError, Result};

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// 默认源格式模式
pub const DEFAULT_PATTERN: &str = "*.png";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// 文件收集器
#[derive(Debug, Clone)]
pub struct FileCollector {
    /// 输入目录
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器，默认匹配 `*.png`
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            patterns: parse_patterns(DEFAULT_PATTERN).unwrap_or_default(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = parse_patterns(pattern)?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 文件名是否匹配任一模式
    pub fn matches(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns
            .iter()
            .any(|p| p.matches_with(filename, MATCH_OPTIONS))
    }

    /// 收集所有匹配的文件
    pub fn collect(&self) -> Vec<PathBuf> {
        let walker = if self.recursive {
            WalkDir::new(&self.input)
        } else {
            WalkDir::new(&self.input).max_depth(1)
        };

        let mut files: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file() || (e.path_is_symlink() && e.path().is_file()))
            .filter(|e| self.matches(e.path()))
            .map(|e| e.into_path())
            .collect();

        files.sort();
        files
    }
}

fn parse_patterns(pattern: &str) -> Result<Vec<Pattern>> {
    let patterns = pattern
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Pattern::new(s).map_err(|e| {
                ConverterError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if patterns.is_empty() {
        return Err(ConverterError::InvalidArgument(format!(
            "Empty pattern '{}'",
            pattern
        )));
    }
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use tempfile::TempDir;

    #[test]
    fn test_pattern_matching() {
        let collector = FileCollector::new(".");
        assert!(collector.matches(Path::new("a.png")));
        assert!(collector.matches(Path::new("dir/SHOUT.PNG")));
        assert!(!collector.matches(Path::new("a.jpg")));

        let multi = FileCollector::new(".").with_pattern("*.png, *.jpg").unwrap();
        assert!(multi.matches(Path::new("a.jpg")));
        assert!(FileCollector::new(".").with_pattern(" , ").is_err());
        assert!(FileCollector::new(".").with_pattern("[").is_err());
    }

    #[test]
    fn test_recursive_vs_flat() {
        let dir = TempDir::new().unwrap();
        testutil::write_png(&dir.path().join("a.png"), 2, 2);
        testutil::write_png(&dir.path().join("sub/b.png"), 2, 2);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let flat = FileCollector::new(dir.path()).collect();
        assert_eq!(flat, vec![dir.path().join("a.png")]);

        let deep = FileCollector::new(dir.path()).recursive(true).collect();
        assert_eq!(
            deep,
            vec![dir.path().join("a.png"), dir.path().join("sub/b.png")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_collected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        testutil::write_png(&root.join("plain.png"), 2, 2);
        testutil::write_png(&dir.path().join("elsewhere/real.png"), 2, 2);
        std::os::unix::fs::symlink(
            dir.path().join("elsewhere/real.png"),
            root.join("linked.png"),
        )
        .unwrap();
        std::os::unix::fs::symlink(dir.path().join("elsewhere"), root.join("linked-dir")).unwrap();

        let files = FileCollector::new(&root).recursive(true).collect();
        assert_eq!(files, vec![root.join("linked.png"), root.join("plain.png")]);
    }

    #[test]
    fn test_sorted_order() {
        let dir = TempDir::new().unwrap();
        for name in ["c.png", "a.png", "b.png"] {
            testutil::write_png(&dir.path().join(name), 1, 1);
        }
        let names: Vec<_> = FileCollector::new(dir.path())
            .collect()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    }
}
