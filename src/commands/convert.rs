//! # convert 命令实现
//!
//! 脚本化转换：单文件或目录批量转换为 WebP / PDF。
//!
//! ## 功能
//! - 校验转换类型与输入路径（失败时退出码 1）
//! - 目录模式保留相对目录结构，可选递归
//! - 并行处理，逐文件状态行与汇总
//! - 可选写出 JSON / CSV 报告
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `batch/` 执行批处理
//! - 使用 `utils/output.rs`

use crate::batch::{BatchRunner, BatchSpec};
use crate::cli::convert::ConvertArgs;
use crate::error::Result;
use crate::models::{BatchReport, ConversionKind};
use crate::utils::output;

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    let kind: ConversionKind = args.kind.parse()?;
    output::print_header(&format!("Converting to {} format", kind.to_string().to_uppercase()));

    let spec = BatchSpec::new(&args.input, &args.output, kind)
        .recursive(args.recursive)
        .with_pattern(&args.pattern);

    let report = convert(&spec, args.jobs)?;

    if let Some(path) = &args.report {
        report.save(path)?;
        output::print_info(&format!("Report written to '{}'", path.display()));
    }

    Ok(())
}

/// 执行批处理并打印状态，供 convert / interactive 共用
pub fn convert(spec: &BatchSpec, jobs: usize) -> Result<BatchReport> {
    let runner = BatchRunner::new(jobs)
        .with_progress(true)
        .on_outcome(output::print_outcome);

    let requests = runner.plan(spec)?;
    if spec.input.is_dir() {
        if requests.is_empty() {
            output::print_warning(&format!(
                "No files matching '{}' found in {}",
                spec.pattern,
                spec.input.display()
            ));
        } else {
            output::print_info(&format!("Found {} files to convert", requests.len()));
        }
    } else {
        output::print_info(&format!("Single file mode: '{}'", spec.input.display()));
    }

    let report = runner.run_planned(spec, requests)?;
    if report.total > 0 {
        output::print_summary(&report);
    }

    Ok(report)
}
