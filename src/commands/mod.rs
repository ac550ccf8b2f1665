//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `models/`, `utils/`, `server/`
//! - 子模块: convert, interactive, serve, samples

pub mod convert;
pub mod interactive;
pub mod samples;
pub mod serve;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Convert(args) => convert::execute(args),
        Commands::Interactive(args) => interactive::execute(args),
        Commands::Serve(args) => serve::execute(args),
        Commands::Samples(args) => samples::execute(args),
    }
}
