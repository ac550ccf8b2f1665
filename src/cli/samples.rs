//! # samples 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/samples.rs`

use clap::Args;
use std::path::PathBuf;

/// samples 子命令参数
#[derive(Args, Debug)]
pub struct SamplesArgs {
    /// Directory to write the sample images into
    #[arg(short, long, default_value = "test/images")]
    pub output: PathBuf,
}
