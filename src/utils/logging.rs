//! # 日志初始化
//!
//! 使用 `tracing-subscriber` 输出诊断日志到 stderr。
//! `RUST_LOG` 优先；否则使用调用方给出的默认级别。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用

use tracing_subscriber::EnvFilter;

/// 初始化全局 subscriber，重复调用时静默忽略
pub fn init(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("WARN: logging already initialised: {}", e);
    }
}
