//! # 美化输出工具
//!
//! 提供统一的终端输出样式。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored` crate, `tabled` 渲染失败列表

use crate::models::{BatchReport, ConversionOutcome};

use colored::Colorize;
use std::path::Path;
use tabled::{Table, Tabled};

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印转换成功消息
pub fn print_conversion(from: &str, to: &str) {
    println!(
        "{} {} {} {}",
        "[OK]".green().bold(),
        from.dimmed(),
        "->".cyan(),
        to
    );
}

/// 打印单个文件的转换状态
pub fn print_outcome(outcome: &ConversionOutcome) {
    let input = file_name(&outcome.request.input_path);
    if outcome.success {
        print_conversion(&input, &file_name(&outcome.request.output_path));
    } else {
        print_error(&format!(
            "{}: {}",
            outcome.request.input_path.display(),
            outcome.error.as_deref().unwrap_or("unknown error")
        ));
    }
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// 失败列表行
#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Error")]
    error: String,
}

/// 打印批处理汇总
pub fn print_summary(report: &BatchReport) {
    print_separator();
    let line = format!(
        "Conversion complete: {} of {} files converted successfully",
        report.succeeded, report.total
    );
    if report.failed() == 0 {
        print_done(&line);
    } else {
        print_warning(&line);
    }

    if report.cancelled {
        print_warning("Batch was cancelled before every file was attempted");
    }

    let rows: Vec<FailureRow> = report
        .failures()
        .map(|o| FailureRow {
            file: o.request.input_path.display().to_string(),
            kind: o.error_kind.map(|k| k.to_string()).unwrap_or_default(),
            error: o.error.clone().unwrap_or_default(),
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", Table::new(&rows));
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
