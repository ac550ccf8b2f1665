//! # samples 命令实现
//!
//! 生成纯色示例 PNG。
//!
//! ## 依赖关系
//! - 使用 `cli/samples.rs` 定义的参数
//! - 使用 `utils/samples.rs`, `utils/output.rs`

use crate::cli::samples::SamplesArgs;
use crate::error::Result;
use crate::utils::{output, samples};

/// 执行 samples 命令
pub fn execute(args: SamplesArgs) -> Result<()> {
    for path in samples::generate_samples(&args.output)? {
        output::print_success(&format!("Sample image written to '{}'", path.display()));
    }
    Ok(())
}
