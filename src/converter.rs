//! # 单文件转换器
//!
//! 将一个输入文件按 `ConversionKind` 转换为一个输出文件。
//!
//! ## 功能
//! - WebP: 解码后以质量 90 重新编码
//! - PDF: 单页文档，页面尺寸 = 像素尺寸（1 像素 = 1 point），图像铺满页面
//! - 任何失败都记录为 `ConversionOutcome`，不向上传播
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs`, `server/` 调用
//! - 使用 `codec/`

use crate::codec::{raster, PdfBuilder, RasterImage};
use crate::error::{ConverterError, Result};
use crate::models::{ConversionKind, ConversionOutcome, ConversionRequest};

use std::fs;
use tracing::debug;

/// 固定 WebP 质量
pub const WEBP_QUALITY: f32 = 90.0;

/// 单文件转换器
#[derive(Debug, Clone)]
pub struct FileConverter {
    webp_quality: f32,
}

impl Default for FileConverter {
    fn default() -> Self {
        Self {
            webp_quality: WEBP_QUALITY,
        }
    }
}

impl FileConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 执行转换，结果总是以 `ConversionOutcome` 返回
    pub fn convert(&self, request: &ConversionRequest) -> ConversionOutcome {
        match self.try_convert(request) {
            Ok(()) => {
                debug!(
                    input = %request.input_path.display(),
                    output = %request.output_path.display(),
                    "converted"
                );
                ConversionOutcome::succeeded(request.clone())
            }
            Err(e) => {
                // 用户可见的失败信息由调用方的逐文件回调输出
                debug!(input = %request.input_path.display(), error = %e, "conversion failed");
                ConversionOutcome::failed(request.clone(), &e)
            }
        }
    }

    fn try_convert(&self, request: &ConversionRequest) -> Result<()> {
        // 无法打开的文件同样视为解码失败
        let bytes = fs::read(&request.input_path).map_err(|e| {
            ConverterError::DecodeFailure(format!("{}: {}", request.input_path.display(), e))
        })?;
        let image = raster::decode(&bytes)?;

        let encoded = match request.kind {
            ConversionKind::WebP => raster::encode_webp(&image, self.webp_quality)?,
            ConversionKind::Pdf => image_to_pdf(&image)?,
        };

        fs::write(&request.output_path, encoded).map_err(|e| ConverterError::WriteFailure {
            path: request.output_path.display().to_string(),
            source: e,
        })
    }
}

/// 单页 PDF，图像位于原点并铺满页面
fn image_to_pdf(image: &RasterImage) -> Result<Vec<u8>> {
    let (width, height) = (image.width as f32, image.height as f32);

    let mut builder = PdfBuilder::new();
    let page = builder.add_page(width, height);
    let image_ref = builder.embed_raster(image)?;
    builder.draw_image(page, image_ref, 0.0, 0.0, width, height)?;
    builder.serialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testutil;
    use lopdf::{Document, Object};
    use tempfile::TempDir;

    #[test]
    fn test_webp_round_trip_dimensions() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("photo.png");
        testutil::write_png(&input, 120, 80);
        let output = dir.path().join("photo.webp");

        let outcome =
            FileConverter::new().convert(&ConversionRequest::new(&input, &output, ConversionKind::WebP));
        assert!(outcome.success, "{:?}", outcome.error);

        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 80));
    }

    #[test]
    fn test_pdf_page_matches_pixels() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.png");
        testutil::write_png(&input, 800, 600);
        let output = dir.path().join("page.pdf");

        let outcome =
            FileConverter::new().convert(&ConversionRequest::new(&input, &output, ConversionKind::Pdf));
        assert!(outcome.success, "{:?}", outcome.error);

        let doc = Document::load(&output).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        let media_box: Vec<f32> = doc
            .get_object(page_id)
            .and_then(Object::as_dict)
            .and_then(|d| d.get(b"MediaBox"))
            .and_then(Object::as_array)
            .unwrap()
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect();
        assert_eq!(media_box, vec![0.0, 0.0, 800.0, 600.0]);
    }

    #[test]
    fn test_pdf_image_fills_page_losslessly() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("gradient.png");
        let source = image::RgbImage::from_fn(7, 5, |x, y| {
            image::Rgb([(x * 36) as u8, (y * 50) as u8, ((x + y) * 20) as u8])
        });
        source.save(&input).unwrap();
        let output = dir.path().join("gradient.pdf");

        let outcome =
            FileConverter::new().convert(&ConversionRequest::new(&input, &output, ConversionKind::Pdf));
        assert!(outcome.success, "{:?}", outcome.error);

        let doc = Document::load(&output).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_and_decode_page_content(page_id).unwrap();
        let operators: Vec<&str> = content
            .operations
            .iter()
            .map(|op| op.operator.as_str())
            .collect();
        assert_eq!(operators, vec!["q", "cm", "Do", "Q"]);

        let matrix: Vec<f32> = content.operations[1]
            .operands
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect();
        assert_eq!(matrix, vec![7.0, 0.0, 0.0, 5.0, 0.0, 0.0]);
        assert_eq!(content.operations[2].operands[0].as_name().unwrap(), b"Im0");

        let xobject = doc
            .objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .find(|s| {
                s.dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .map(|n| n == b"Image")
                    .unwrap_or(false)
            })
            .unwrap();
        assert_eq!(xobject.get_plain_content().unwrap(), source.into_raw());
    }

    #[test]
    fn test_failures_do_not_log_warnings() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::fmt::MakeWriter;

        #[derive(Clone, Default)]
        struct Capture(Arc<Mutex<Vec<u8>>>);

        impl Write for Capture {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        impl<'a> MakeWriter<'a> for Capture {
            type Writer = Capture;

            fn make_writer(&'a self) -> Self::Writer {
                self.clone()
            }
        }

        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.png");
        testutil::write_corrupt(&input);

        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(capture.clone())
            .finish();

        let outcome = tracing::subscriber::with_default(subscriber, || {
            FileConverter::new().convert(&ConversionRequest::new(
                &input,
                dir.path().join("broken.pdf"),
                ConversionKind::Pdf,
            ))
        });

        assert!(!outcome.success);
        assert!(capture.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_input_is_captured() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.png");
        testutil::write_corrupt(&input);

        let outcome = FileConverter::new().convert(&ConversionRequest::new(
            &input,
            dir.path().join("broken.webp"),
            ConversionKind::WebP,
        ));
        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, Some(ErrorKind::DecodeFailure));
        assert!(outcome.error.unwrap().starts_with("decode failed:"));
    }

    #[test]
    fn test_missing_input_is_decode_failure() {
        let dir = TempDir::new().unwrap();
        let outcome = FileConverter::new().convert(&ConversionRequest::new(
            dir.path().join("nope.png"),
            dir.path().join("nope.pdf"),
            ConversionKind::Pdf,
        ));
        assert_eq!(outcome.error_kind, Some(ErrorKind::DecodeFailure));
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.png");
        testutil::write_png(&input, 4, 4);

        let outcome = FileConverter::new().convert(&ConversionRequest::new(
            &input,
            dir.path().join("missing-dir").join("a.pdf"),
            ConversionKind::Pdf,
        ));
        assert_eq!(outcome.error_kind, Some(ErrorKind::WriteFailure));
        assert!(outcome.error.unwrap().starts_with("write failed:"));
    }

    #[test]
    fn test_overwrite_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.png");
        testutil::write_png(&input, 16, 16);
        let request = ConversionRequest::new(&input, dir.path().join("a.webp"), ConversionKind::WebP);

        let converter = FileConverter::new();
        assert!(converter.convert(&request).success);
        assert!(converter.convert(&request).success);

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 2);
        assert!(image::open(&request.output_path).is_ok());
    }
}
