//! # Web 服务模块
//!
//! 基于 axum 的本地转换服务：上传转换、文件夹转换、下载与会话清理。
//!
//! ## 功能
//! - `POST /convert`, `POST /convert-folder`
//! - `GET /downloads/...`, `GET /download-all/{id}`
//! - `DELETE /sessions/{id}`, `GET /health`
//! - Ctrl-C / SIGTERM 优雅停机
//! - 可选启动后在浏览器中打开页面
//!
//! ## 依赖关系
//! - 被 `commands/serve.rs` 调用
//! - 使用 `batch/` 执行转换
//! - 使用 `axum`, `tokio`, `tower-http`

pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use crate::cli::serve::ServeArgs;
use crate::server::session::SessionStore;
use crate::server::state::AppState;

use anyhow::Context;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{info, warn};

/// 服务配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// 上传与会话输出的根目录
    pub data_dir: PathBuf,
    /// 单个请求体上限（字节）
    pub max_upload_bytes: usize,
    /// 文件夹转换的并行作业数
    pub jobs: usize,
    /// 监听后打开浏览器
    pub open_browser: bool,
}

impl ServerConfig {
    pub fn from_args(args: &ServeArgs) -> Self {
        Self {
            bind: args.bind.clone(),
            data_dir: args
                .data_dir
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("dark-spell")),
            max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
            jobs: args.jobs,
            open_browser: args.open,
        }
    }
}

/// 启动服务，直到收到停机信号
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let sessions = SessionStore::new(&config.data_dir);
    sessions
        .init()
        .await
        .with_context(|| format!("failed to prepare data directory {}", config.data_dir.display()))?;

    let bind = config.bind.clone();
    let open = config.open_browser;
    let state = Arc::new(AppState { config, sessions });
    let app = routes::build(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    let addr = listener.local_addr()?;
    info!(%addr, "HTTP server listening");

    if open {
        open_browser(&format!("http://{}", addr));
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// 在默认浏览器中打开地址，失败只记录警告
fn open_browser(url: &str) {
    match browser_command(url)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => info!(%url, "opened browser"),
        Err(e) => warn!(%url, error = %e, "failed to open browser"),
    }
}

fn browser_command(url: &str) -> Command {
    #[cfg(target_os = "macos")]
    let command = {
        let mut c = Command::new("open");
        c.arg(url);
        c
    };

    #[cfg(windows)]
    let command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    };

    #[cfg(not(any(target_os = "macos", windows)))]
    let command = {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    command
}

/// SIGINT (Ctrl-C) 或 SIGTERM 时返回
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
