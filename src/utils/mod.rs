//! # 工具函数模块
//!
//! 提供美化输出、进度条、日志初始化、示例图像生成等工具。
//!
//! ## 依赖关系
//! - 被 `commands/`, `batch/` 模块使用
//! - 子模块: logging, output, progress, samples

pub mod logging;
pub mod output;
pub mod progress;
pub mod samples;
