//! # 光栅图像编解码
//!
//! 封装 `image`（解码）与 `webp`（有损 WebP 编码）。
//!
//! ## 功能
//! - 从字节解码任意已编译支持的光栅格式 (PNG, JPEG, WebP, GIF, BMP, TIFF)
//! - 以给定质量编码为有损 WebP
//!
//! ## 依赖关系
//! - 被 `converter.rs`, `codec/pdf.rs` 使用

use crate::error::{ConverterError, Result};

use image::DynamicImage;
use tracing::debug;

/// 已解码的光栅图像
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pixels: DynamicImage,
}

impl RasterImage {
    /// 是否带 alpha 通道
    pub fn has_alpha(&self) -> bool {
        self.pixels.color().has_alpha()
    }

    /// 8 位 RGB 像素（行优先，无填充）
    pub fn rgb8(&self) -> Vec<u8> {
        self.pixels.to_rgb8().into_raw()
    }

    /// 8 位 RGBA 像素
    pub fn rgba8(&self) -> Vec<u8> {
        self.pixels.to_rgba8().into_raw()
    }

    /// 8 位 alpha 通道
    pub fn alpha8(&self) -> Vec<u8> {
        self.pixels
            .to_rgba8()
            .pixels()
            .map(|p| p.0[3])
            .collect()
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(pixels: DynamicImage) -> Self {
        Self {
            width: pixels.width(),
            height: pixels.height(),
            pixels,
        }
    }
}

/// 解码图像字节，自动识别格式
pub fn decode(bytes: &[u8]) -> Result<RasterImage> {
    let pixels =
        image::load_from_memory(bytes).map_err(|e| ConverterError::DecodeFailure(e.to_string()))?;
    let image = RasterImage::from(pixels);
    debug!(width = image.width, height = image.height, "decoded raster image");
    Ok(image)
}

/// 编码为有损 WebP，`quality` 取值 0-100
pub fn encode_webp(image: &RasterImage, quality: f32) -> Result<Vec<u8>> {
    if image.width == 0 || image.height == 0 {
        return Err(ConverterError::EncodeFailure(format!(
            "cannot encode empty {}x{} image",
            image.width, image.height
        )));
    }

    let quality = quality.clamp(0.0, 100.0);
    let memory = if image.has_alpha() {
        let rgba = image.rgba8();
        webp::Encoder::from_rgba(&rgba, image.width, image.height)
            .encode_simple(false, quality)
            .map_err(|e| ConverterError::EncodeFailure(format!("{:?}", e)))?
            .to_vec()
    } else {
        let rgb = image.rgb8();
        webp::Encoder::from_rgb(&rgb, image.width, image.height)
            .encode_simple(false, quality)
            .map_err(|e| ConverterError::EncodeFailure(format!("{:?}", e)))?
            .to_vec()
    };

    Ok(memory)
}
