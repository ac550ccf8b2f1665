//! # 统一错误处理模块
//!
//! 定义 dark-spell 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - 批量级前置条件错误（路径不存在、格式不支持、输出冲突）会终止整个调用
//! - 单文件错误（解码、编码、写入）被记录到 `ConversionOutcome`，不会中断批处理
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// dark-spell 统一错误类型
#[derive(Error, Debug)]
pub enum ConverterError {
    // ─────────────────────────────────────────────────────────────
    // 路径错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid path: {path} ({reason})")]
    InvalidPath { path: String, reason: String },

    #[error("Path escapes its root: {path}")]
    PathEscape { path: String },

    #[error("Input path does not exist: {path}")]
    NotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 格式错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 转换错误（单文件，记录到 ConversionOutcome）
    // ─────────────────────────────────────────────────────────────
    #[error("decode failed: {0}")]
    DecodeFailure(String),

    #[error("encode failed: {0}")]
    EncodeFailure(String),

    #[error("write failed: {path}: {source}")]
    WriteFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 批处理错误
    // ─────────────────────────────────────────────────────────────
    #[error("Destination collision: {first} and {second} both map to {output}")]
    DestinationCollision {
        first: String,
        second: String,
        output: String,
    },

    #[error("Batch cancelled")]
    Cancelled,

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to write {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

/// 可序列化的错误类别标签，用于批处理报告和 HTTP 响应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidPath,
    PathEscape,
    NotFound,
    UnsupportedFormat,
    DecodeFailure,
    EncodeFailure,
    WriteFailure,
    DestinationCollision,
    Cancelled,
    Io,
    InvalidArgument,
    Other,
}

impl ConverterError {
    /// 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConverterError::InvalidPath { .. } => ErrorKind::InvalidPath,
            ConverterError::PathEscape { .. } => ErrorKind::PathEscape,
            ConverterError::NotFound { .. } => ErrorKind::NotFound,
            ConverterError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ConverterError::DecodeFailure(_) => ErrorKind::DecodeFailure,
            ConverterError::EncodeFailure(_) => ErrorKind::EncodeFailure,
            ConverterError::WriteFailure { .. } => ErrorKind::WriteFailure,
            ConverterError::DestinationCollision { .. } => ErrorKind::DestinationCollision,
            ConverterError::Cancelled => ErrorKind::Cancelled,
            ConverterError::FileWriteError { .. }
            | ConverterError::CsvError(_)
            | ConverterError::JsonError(_) => ErrorKind::Io,
            ConverterError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ConverterError::Other(_) => ErrorKind::Other,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::InvalidPath => "invalid_path",
            ErrorKind::PathEscape => "path_escape",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UnsupportedFormat => "unsupported_format",
            ErrorKind::DecodeFailure => "decode_failure",
            ErrorKind::EncodeFailure => "encode_failure",
            ErrorKind::WriteFailure => "write_failure",
            ErrorKind::DestinationCollision => "destination_collision",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Io => "io",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ConverterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(ConverterError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(
            serde_json::to_string(&ErrorKind::DestinationCollision).unwrap(),
            "\"destination_collision\""
        );
    }

    #[test]
    fn test_decode_message_prefix() {
        let err = ConverterError::DecodeFailure("invalid PNG signature".into());
        assert_eq!(err.to_string(), "decode failed: invalid PNG signature");
        assert_eq!(err.kind().to_string(), "decode_failure");
    }
}
