//! # 转换请求与结果数据模型
//!
//! 单个文件转换的输入（`ConversionRequest`）与输出（`ConversionOutcome`）。
//!
//! ## 依赖关系
//! - 被 `batch/`, `converter.rs`, `server/` 使用
//! - 使用 `error.rs` 的 `ErrorKind`

use crate::error::{ConverterError, ErrorKind};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// 目标转换类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionKind {
    /// 有损 WebP（质量 90）
    WebP,
    /// 单页 PDF，页面尺寸等于像素尺寸
    Pdf,
}

impl ConversionKind {
    /// 输出文件扩展名（不含点）
    pub fn extension(&self) -> &'static str {
        match self {
            ConversionKind::WebP => "webp",
            ConversionKind::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ConversionKind {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "webp" => Ok(ConversionKind::WebP),
            "pdf" => Ok(ConversionKind::Pdf),
            other => Err(ConverterError::UnsupportedFormat(format!(
                "conversion type must be 'pdf' or 'webp', got '{}'",
                other
            ))),
        }
    }
}

/// 单文件转换请求（创建后不再修改）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub kind: ConversionKind,
}

impl ConversionRequest {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>, kind: ConversionKind) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            kind,
        }
    }
}

/// 单文件转换结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub request: ConversionRequest,
    pub success: bool,
    /// 失败原因，如 `decode failed: ...`
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl ConversionOutcome {
    pub fn succeeded(request: ConversionRequest) -> Self {
        Self {
            request,
            success: true,
            error: None,
            error_kind: None,
        }
    }

    pub fn failed(request: ConversionRequest, err: &ConverterError) -> Self {
        Self {
            request,
            success: false,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
        }
    }
}
