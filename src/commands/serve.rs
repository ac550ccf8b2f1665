//! # serve 命令实现
//!
//! 构建 tokio 运行时并启动 Web 服务。
//!
//! ## 依赖关系
//! - 使用 `cli/serve.rs` 定义的参数
//! - 使用 `server/`

use crate::cli::serve::ServeArgs;
use crate::error::{ConverterError, Result};
use crate::server::{self, ServerConfig};
use crate::utils::output;

/// 执行 serve 命令
pub fn execute(args: ServeArgs) -> Result<()> {
    let config = ServerConfig::from_args(&args);
    output::print_header("Dark Spell Converter - Web Interface");
    output::print_info(&format!("Data directory: {}", config.data_dir.display()));
    output::print_success(&format!("Server starting at http://{}", config.bind));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ConverterError::Other(format!("failed to start async runtime: {}", e)))?;

    runtime
        .block_on(server::serve(config))
        .map_err(|e| ConverterError::Other(format!("{:#}", e)))
}
