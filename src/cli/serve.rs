//! # serve 子命令 CLI 定义
//!
//! 本地 Web 转换服务配置，所有选项均可通过环境变量设置
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/serve.rs`

use clap::Args;
use std::path::PathBuf;

/// serve 子命令参数
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "DARK_SPELL_BIND", default_value = "127.0.0.1:3000")]
    pub bind: String,

    /// Directory for uploads and session outputs [default: <temp>/dark-spell]
    #[arg(long, env = "DARK_SPELL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Maximum request body size in MiB
    #[arg(long, env = "DARK_SPELL_MAX_UPLOAD_MB", default_value_t = 50)]
    pub max_upload_mb: usize,

    /// Number of parallel jobs for folder conversions (0 = auto)
    #[arg(short, long, env = "DARK_SPELL_JOBS", default_value_t = 0)]
    pub jobs: usize,

    /// Open the web interface in the default browser once listening
    #[arg(long, default_value_t = false)]
    pub open: bool,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    pub log_json: bool,
}
