//! # 批量处理模块
//!
//! 批量转换流水线：发现文件、映射输出路径、执行转换、汇总报告。
//!
//! ## 功能
//! - 自动检测输入类型（文件/目录）
//! - 收集匹配文件列表
//! - 并行处理
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/`, `server/` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod mapper;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchRunner, BatchSpec, CancelToken};
