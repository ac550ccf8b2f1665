//! # 编解码模块
//!
//! 外部图像编解码库与 PDF 构建库的窄接口封装。
//!
//! ## 依赖关系
//! - 被 `converter.rs` 使用
//! - 子模块: raster (`image` + `webp`), pdf (`lopdf`)

pub mod pdf;
pub mod raster;

pub use pdf::PdfBuilder;
pub use raster::RasterImage;
