//! # interactive 命令实现
//!
//! 交互式向导：逐步询问操作、输入路径、格式与输出目录，确认后执行。
//!
//! ## 流程
//! 操作选择 -> 输入路径 -> 输出格式 -> 输出目录 -> 摘要 -> 确认 -> 转换
//!
//! ## 依赖关系
//! - 使用 `cli/interactive.rs` 定义的参数
//! - 使用 `commands/convert.rs` 执行批处理
//! - 使用 `console` 读写终端

use crate::batch::{BatchSpec, FileCollector};
use crate::cli::interactive::InteractiveArgs;
use crate::commands::convert;
use crate::error::{ConverterError, Result};
use crate::models::ConversionKind;
use crate::utils::output;

use console::{style, Term};
use std::io;
use std::path::{Path, PathBuf};

/// 单个问题的最大重试次数
const MAX_ATTEMPTS: usize = 5;

/// 提示输入/输出通道
pub trait Prompter {
    fn show(&mut self, line: &str) -> io::Result<()>;
    fn ask(&mut self, prompt: &str) -> io::Result<String>;
}

impl Prompter for Term {
    fn show(&mut self, line: &str) -> io::Result<()> {
        self.write_line(line)
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.write_str(&format!("{} {} ", style("?").green().bold(), style(prompt).bold()))?;
        self.read_line()
    }
}

/// 用户选择的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Single,
    Directory,
    Recursive,
}

/// 确认后的转换计划
#[derive(Debug, Clone, PartialEq)]
struct Plan {
    action: Action,
    input: PathBuf,
    output: PathBuf,
    kind: ConversionKind,
}

/// 执行 interactive 命令
pub fn execute(args: InteractiveArgs) -> Result<()> {
    let mut term = Term::stdout();
    term.show(&format!("{}", style("Dark Spell Converter").cyan().bold()))
        .map_err(prompt_error)?;
    term.show(&format!("{}\n", style("Convert PNG files to PDF or WebP").cyan()))
        .map_err(prompt_error)?;

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let plan = match build_plan(&mut term, &cwd)? {
        Some(plan) => plan,
        None => {
            output::print_warning("Conversion cancelled.");
            return Ok(());
        }
    };

    let spec = BatchSpec::new(&plan.input, &plan.output, plan.kind)
        .recursive(plan.action == Action::Recursive);
    let report = convert::convert(&spec, args.jobs)?;

    if report.succeeded > 0 {
        output::print_done(&format!(
            "Converted files are available in: {}",
            plan.output.display()
        ));
    }
    Ok(())
}

/// 按顺序收集参数；用户拒绝确认时返回 `None`
fn build_plan<P: Prompter>(io: &mut P, cwd: &Path) -> Result<Option<Plan>> {
    let action = match choose(
        io,
        "What would you like to do?",
        &[
            "Convert a single PNG file",
            "Convert every PNG in a folder",
            "Convert a folder and its subfolders",
        ],
    )? {
        0 => Action::Single,
        1 => Action::Directory,
        _ => Action::Recursive,
    };

    let input_prompt = match action {
        Action::Single => "Full path of the PNG file:",
        _ => "Path of the folder containing the PNG files:",
    };
    let input = ask_valid(io, input_prompt, |answer| validate_input(action, answer))?;

    let kind = match choose(io, "Choose the output format:", &["PDF", "WebP"])? {
        0 => ConversionKind::Pdf,
        _ => ConversionKind::WebP,
    };

    let default_output = cwd.join("output");
    let answer = io
        .ask(&format!(
            "Folder for converted files ({}):",
            default_output.display()
        ))
        .map_err(prompt_error)?;
    let mut output = if answer.trim().is_empty() {
        default_output
    } else {
        PathBuf::from(answer.trim())
    };

    if action == Action::Single {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "converted".to_string());
        output = output.join(format!("{}.{}", stem, kind.extension()));
    }

    io.show("").map_err(prompt_error)?;
    io.show(&format!("{}", style("Summary:").cyan())).map_err(prompt_error)?;
    io.show(&format!("Source: {}", style(input.display()).yellow()))
        .map_err(prompt_error)?;
    io.show(&format!("Destination: {}", style(output.display()).yellow()))
        .map_err(prompt_error)?;
    io.show(&format!(
        "Format: {}",
        style(kind.to_string().to_uppercase()).yellow()
    ))
    .map_err(prompt_error)?;

    if !confirm(io, "Start the conversion?", true)? {
        return Ok(None);
    }

    Ok(Some(Plan {
        action,
        input,
        output,
        kind,
    }))
}

/// 编号选择，返回 0 起始的下标
fn choose<P: Prompter>(io: &mut P, question: &str, options: &[&str]) -> Result<usize> {
    io.show(question).map_err(prompt_error)?;
    for (i, option) in options.iter().enumerate() {
        io.show(&format!("  {}) {}", i + 1, option)).map_err(prompt_error)?;
    }

    ask_valid(io, &format!("Choice [1-{}]:", options.len()), |answer| {
        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => Ok(n - 1),
            _ => Err(format!("Please enter a number between 1 and {}", options.len())),
        }
    })
}

/// y/n 确认，空回答取默认值
fn confirm<P: Prompter>(io: &mut P, question: &str, default: bool) -> Result<bool> {
    let hint = if default { "(Y/n)" } else { "(y/N)" };
    ask_valid(io, &format!("{} {}", question, hint), |answer| {
        match answer.trim().to_lowercase().as_str() {
            "" => Ok(default),
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => Err("Please answer y or n".to_string()),
        }
    })
}

/// 重复提问直到校验通过
fn ask_valid<P, T, F>(io: &mut P, prompt: &str, validate: F) -> Result<T>
where
    P: Prompter,
    F: Fn(&str) -> std::result::Result<T, String>,
{
    for _ in 0..MAX_ATTEMPTS {
        let answer = io.ask(prompt).map_err(prompt_error)?;
        match validate(&answer) {
            Ok(value) => return Ok(value),
            Err(msg) => io
                .show(&format!("{} {}", style(">>").red(), msg))
                .map_err(prompt_error)?,
        }
    }

    Err(ConverterError::InvalidArgument(format!(
        "no valid answer to '{}' after {} attempts",
        prompt, MAX_ATTEMPTS
    )))
}

fn validate_input(action: Action, answer: &str) -> std::result::Result<PathBuf, String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Err("The path cannot be empty".to_string());
    }

    let path = PathBuf::from(answer);
    match action {
        Action::Single => {
            if !path.is_file() {
                return Err("The file does not exist".to_string());
            }
            if !FileCollector::new(".").matches(&path) {
                return Err("The file must be a PNG image".to_string());
            }
        }
        Action::Directory | Action::Recursive => {
            if !path.is_dir() {
                return Err("The folder does not exist".to_string());
            }
        }
    }

    Ok(path)
}

fn prompt_error(e: io::Error) -> ConverterError {
    ConverterError::Other(format!("prompt failed: {}", e))
}
