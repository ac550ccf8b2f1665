//! # Dark Spell - PNG 转 WebP / PDF 工具
//!
//! 脚本化命令行、交互式向导与本地 Web 服务共用同一条批量转换流水线。
//!
//! ## 子命令
//! - `convert`     - 单文件或目录批量转换
//! - `interactive` - 交互式向导
//! - `serve`       - 本地 Web 服务
//! - `samples`     - 生成示例 PNG
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   ├── server/     (HTTP 服务)
//!   ├── batch/      (文件发现、路径映射、并行执行)
//!   │     └── converter.rs (单文件转换)
//!   │           └── codec/ (解码、WebP 编码、PDF 写入)
//!   ├── models/     (请求、结果与报告)
//!   ├── utils/      (输出、进度条、日志、示例图像)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod codec;
mod commands;
mod converter;
mod error;
mod models;
mod server;
#[cfg(test)]
mod testutil;
mod utils;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve(args) => utils::logging::init("info", args.log_json),
        _ => utils::logging::init("warn", false),
    }

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
