//! # interactive 子命令 CLI 定义
//!
//! 交互式向导，参数由提示逐步收集
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/interactive.rs`

use clap::Args;

/// interactive 子命令参数
#[derive(Args, Debug)]
pub struct InteractiveArgs {
    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
