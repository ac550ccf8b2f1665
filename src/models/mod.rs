//! # 数据模型模块
//!
//! 定义转换请求、单文件结果与批处理报告。
//!
//! ## 依赖关系
//! - 被 `batch/`, `converter.rs`, `commands/`, `server/` 使用
//! - 子模块: conversion, report

pub mod conversion;
pub mod report;

pub use conversion::{ConversionKind, ConversionOutcome, ConversionRequest};
pub use report::BatchReport;
