//! # convert 子命令 CLI 定义
//!
//! 将单个 PNG 文件或目录中的 PNG 文件转换为 WebP / PDF
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::Args;
use std::path::PathBuf;

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input file or directory path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (single input) or directory path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output type (pdf or webp)
    #[arg(short = 't', long = "type")]
    pub kind: String,

    /// Process directories recursively
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Glob pattern for source files (comma-separated)
    #[arg(short, long, default_value = "*.png")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Write a batch report (.json, otherwise CSV)
    #[arg(long)]
    pub report: Option<PathBuf>,
}
