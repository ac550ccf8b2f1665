//! # 示例图像生成
//!
//! 生成纯色 PNG 示例文件，便于试用转换器。
//!
//! ## 依赖关系
//! - 被 `commands/samples.rs` 和测试使用
//! - 使用 `image` crate 编码 PNG

use crate::error::{ConverterError, Result};

use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

/// 示例文件：(相对路径, 宽, 高, 颜色)
const SAMPLES: [(&str, u32, u32, [u8; 3]); 3] = [
    ("test1.png", 800, 600, [0, 0, 255]),
    ("test2.png", 400, 300, [255, 0, 0]),
    ("subfolder/test3.png", 600, 400, [0, 128, 0]),
];

/// 写入纯色 PNG，自动创建父目录
pub fn write_solid_png(path: &Path, width: u32, height: u32, color: [u8; 3]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConverterError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    RgbImage::from_pixel(width, height, Rgb(color))
        .save(path)
        .map_err(|e| ConverterError::EncodeFailure(format!("{}: {}", path.display(), e)))
}

/// 在目录下生成全部示例文件
pub fn generate_samples(output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(SAMPLES.len());
    for (relative, width, height, color) in SAMPLES {
        let path = output_dir.join(relative);
        write_solid_png(&path, width, height, color)?;
        written.push(path);
    }
    Ok(written)
}
