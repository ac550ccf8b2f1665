//! # HTTP 路由
//!
//! 组装 axum 路由并实现各处理函数。转换在阻塞线程池中执行，
//! 请求被丢弃（客户端断开）时通过 `CancelToken` 停止尚未开始的文件。
//!
//! ## 依赖关系
//! - 被 `server/mod.rs` 调用
//! - 使用 `batch/` 执行转换，`server/session.rs` 管理会话目录
//! - 使用 `tower-http` 提供静态下载与请求追踪

use crate::batch::{mapper, BatchRunner, BatchSpec, CancelToken};
use crate::error::Result as ConvertResult;
use crate::models::{BatchReport, ConversionKind, ConversionOutcome, ConversionRequest};
use crate::server::error::ServerError;
use crate::server::session::{url_path, Session, SessionStore};
use crate::server::state::AppState;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{self, DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

/// 单次上传的最大文件数
pub const MAX_FILES: usize = 100;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid filename pattern"));

/// 构建完整路由
pub fn build(state: Arc<AppState>) -> Router {
    let downloads = ServeDir::new(state.sessions.output_root());

    Router::new()
        .route("/health", get(health))
        .route("/convert", post(convert_upload))
        .route("/convert-folder", post(convert_folder))
        .route("/download-all/{id}", get(download_all))
        .route("/sessions/{id}", delete(delete_session))
        .nest_service("/downloads", downloads)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 单个文件的转换结果
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    pub original_name: String,
    pub converted_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,
    pub download_path: String,
    pub format: ConversionKind,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<FileResult>,
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRequest {
    pub folder_path: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub recursive: Option<Flag>,
}

/// 接受 `true` 或 `"true"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn enabled(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => s.trim().eq_ignore_ascii_case("true"),
        }
    }
}

struct Upload {
    name: String,
    data: Bytes,
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /convert`：multipart 上传并转换
async fn convert_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ServerError> {
    let mut uploads: Vec<Upload> = Vec::new();
    let mut kind_field: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        match file_name {
            Some(name) => {
                if uploads.len() >= MAX_FILES {
                    return Err(ServerError::BadRequest(format!(
                        "At most {} files can be uploaded at once",
                        MAX_FILES
                    )));
                }
                if !is_png_upload(&name, content_type.as_deref()) {
                    return Err(ServerError::BadRequest(format!(
                        "'{}' is not a PNG image",
                        name
                    )));
                }
                let data = field.bytes().await.map_err(multipart_error)?;
                uploads.push(Upload { name, data });
            }
            None if field_name == "type" => {
                kind_field = Some(field.text().await.map_err(multipart_error)?);
            }
            None => debug!(field = %field_name, "ignoring form field"),
        }
    }

    let kind: ConversionKind = kind_field
        .ok_or_else(|| ServerError::BadRequest("Missing 'type' field".to_string()))?
        .parse()?;
    if uploads.is_empty() {
        return Err(ServerError::BadRequest("No files were uploaded".to_string()));
    }

    let session = state.sessions.allocate();
    tokio::fs::create_dir_all(&session.upload_dir).await?;

    let mut used = HashSet::new();
    let mut original_names: HashMap<PathBuf, String> = HashMap::with_capacity(uploads.len());
    let mut requests = Vec::with_capacity(uploads.len());

    for (index, upload) in uploads.iter().enumerate() {
        let safe = sanitize_filename(&upload.name);
        let stored = session.upload_dir.join(format!("{:03}-{}", index, safe));
        tokio::fs::write(&stored, &upload.data).await?;

        let output = session.output_dir.join(unique_output_name(&mut used, &safe, kind));
        original_names.insert(stored.clone(), upload.name.clone());
        requests.push(ConversionRequest::new(stored, output, kind));
    }

    info!(session = %session.id, files = requests.len(), %kind, "converting uploads");
    let report = run_blocking(state.config.jobs, move |runner| runner.convert_all(requests)).await?;

    let results = report
        .outcomes
        .iter()
        .map(|outcome| {
            let input = &outcome.request.input_path;
            let original_name = original_names
                .get(input)
                .cloned()
                .unwrap_or_else(|| file_name_of(input));
            file_result(&session, outcome, original_name, None, None)
        })
        .collect();

    Ok(Json(response(&session, &report, uploads.len(), results)))
}

/// `POST /convert-folder`：转换服务器本地目录
async fn convert_folder(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FolderRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>, ServerError> {
    let Json(request) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let (folder, kind) = match (
        request.folder_path.as_deref().map(str::trim),
        request.kind.as_deref(),
    ) {
        (Some(folder), Some(kind)) if !folder.is_empty() => {
            (PathBuf::from(folder), kind.parse::<ConversionKind>()?)
        }
        _ => {
            return Err(ServerError::BadRequest(
                "'folderPath' and 'type' are required".to_string(),
            ))
        }
    };

    if !folder.exists() {
        return Err(ServerError::BadRequest(format!(
            "Folder does not exist: {}",
            folder.display()
        )));
    }
    if !folder.is_dir() {
        return Err(ServerError::BadRequest(format!(
            "Not a directory: {}",
            folder.display()
        )));
    }

    let recursive = request.recursive.as_ref().is_some_and(Flag::enabled);
    let session = state.sessions.allocate();
    let spec = BatchSpec::new(&folder, &session.output_dir, kind).recursive(recursive);
    let jobs = state.config.jobs;

    let plan_spec = spec.clone();
    let requests = run_blocking(jobs, move |runner| runner.plan(&plan_spec)).await?;
    if requests.is_empty() {
        return Err(ServerError::BadRequest(format!(
            "No PNG files found in {}",
            folder.display()
        )));
    }

    info!(
        session = %session.id,
        folder = %folder.display(),
        files = requests.len(),
        recursive,
        "converting folder"
    );
    let total = requests.len();
    let report = run_blocking(jobs, move |runner| runner.run_planned(&spec, requests)).await?;

    let results = report
        .outcomes
        .iter()
        .map(|outcome| {
            let input = &outcome.request.input_path;
            let relative = mapper::relative_to(&folder, input)
                .map(|p| url_path(&p))
                .ok();
            file_result(
                &session,
                outcome,
                file_name_of(input),
                Some(input.display().to_string()),
                relative,
            )
        })
        .collect();

    Ok(Json(response(&session, &report, total, results)))
}

/// `GET /download-all/{id}`：列出会话中的文件
async fn download_all(
    State(state): State<Arc<AppState>>,
    extract::Path(id): extract::Path<String>,
) -> Result<Json<Value>, ServerError> {
    let id = parse_session_id(&id)?;
    let files = state
        .sessions
        .list_files(id)
        .ok_or_else(|| ServerError::NotFound(format!("Session {} not found", id)))?;

    let downloads: Vec<String> = files
        .iter()
        .map(|f| format!("/downloads/{}/{}", id, f))
        .collect();

    Ok(Json(json!({
        "sessionId": id,
        "files": files,
        "downloads": downloads,
    })))
}

/// `DELETE /sessions/{id}`
async fn delete_session(
    State(state): State<Arc<AppState>>,
    extract::Path(id): extract::Path<String>,
) -> Result<Json<Value>, ServerError> {
    let id = parse_session_id(&id)?;
    state.sessions.purge(id).await?;
    info!(session = %id, "session deleted");
    Ok(Json(json!({ "success": true, "message": "Session deleted" })))
}

/// 在阻塞线程池中运行批处理；返回的 future 被丢弃时取消剩余文件
async fn run_blocking<T, F>(jobs: usize, task: F) -> Result<T, ServerError>
where
    F: FnOnce(&BatchRunner) -> ConvertResult<T> + Send + 'static,
    T: Send + 'static,
{
    let cancel = CancelToken::new();
    let _guard = CancelOnDrop(cancel.clone());
    let runner = BatchRunner::new(jobs).with_cancel(cancel);

    let result = tokio::task::spawn_blocking(move || task(&runner)).await?;
    Ok(result?)
}

struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

fn response(
    session: &Session,
    report: &BatchReport,
    total: usize,
    results: Vec<FileResult>,
) -> ConvertResponse {
    ConvertResponse {
        success: report.is_complete_success(),
        message: format!(
            "{} of {} files converted successfully.",
            report.succeeded, total
        ),
        results,
        session_id: session.id,
    }
}

fn file_result(
    session: &Session,
    outcome: &ConversionOutcome,
    original_name: String,
    original_path: Option<String>,
    relative_path: Option<String>,
) -> FileResult {
    let output = &outcome.request.output_path;
    FileResult {
        original_name,
        converted_name: file_name_of(output),
        original_path,
        relative_path,
        download_path: session.download_path(output),
        format: outcome.request.kind,
        success: outcome.success,
        error: outcome.error.clone(),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn parse_session_id(id: &str) -> Result<Uuid, ServerError> {
    SessionStore::parse_id(id)
        .ok_or_else(|| ServerError::BadRequest(format!("Invalid session id: {}", id)))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::TooLarge(e.body_text())
    } else {
        ServerError::BadRequest(format!("Invalid upload: {}", e.body_text()))
    }
}

/// `image/png`，或缺少具体类型时按 `.png` 扩展名判断
fn is_png_upload(file_name: &str, content_type: Option<&str>) -> bool {
    match content_type {
        Some("image/png") => true,
        None | Some("application/octet-stream") => Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png")),
        Some(_) => false,
    }
}

/// 去掉目录部分并替换不安全字符
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or("");
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload.png".to_string()
    } else {
        cleaned.to_string()
    }
}

/// 同一会话内的输出文件名去重：`a.webp`, `a-1.webp`, ...
fn unique_output_name(used: &mut HashSet<String>, safe_name: &str, kind: ConversionKind) -> String {
    let stem = Path::new(safe_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());

    let mut candidate = format!("{}.{}", stem, kind.extension());
    let mut n = 1;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}-{}.{}", stem, n, kind.extension());
        n += 1;
    }
    candidate
}
