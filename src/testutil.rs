//! 测试辅助函数

use crate::utils::samples::write_solid_png;

use std::path::Path;

pub fn write_png(path: &Path, width: u32, height: u32) {
    write_solid_png(path, width, height, [30, 60, 90]).unwrap();
}

/// 带 PNG 签名但内容截断的文件
pub fn write_corrupt(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"\x89PNG\r\n\x1a\nthis is not really a png").unwrap();
}
