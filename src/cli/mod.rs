//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `convert`: 脚本化转换（文件或目录）
//! - `interactive`: 交互式向导
//! - `serve`: 本地 Web 服务
//! - `samples`: 生成示例 PNG
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: convert, interactive, serve, samples

pub mod convert;
pub mod interactive;
pub mod samples;
pub mod serve;

use clap::{Parser, Subcommand};

/// Dark Spell - PNG to WebP / PDF converter
#[derive(Parser)]
#[command(name = "dark-spell")]
#[command(version)]
#[command(about = "Convert PNG files to PDF or WebP format", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert a PNG file or a directory of PNG files
    Convert(convert::ConvertArgs),

    /// Guided conversion with interactive prompts
    Interactive(interactive::InteractiveArgs),

    /// Run the local web converter
    Serve(serve::ServeArgs),

    /// Write sample PNG images to try the converter on
    Samples(samples::SamplesArgs),
}
