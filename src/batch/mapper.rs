//! # 输出路径映射
//!
//! 将输入根目录下的文件映射到输出根目录下的对应位置：
//! 保留相对目录结构，只替换扩展名。纯函数，不创建目录。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs`, `server/` 调用

use crate::error::{ConverterError, Result};
use crate::models::ConversionKind;

use std::path::{Component, Path, PathBuf};

/// 计算 `file_path` 在 `output_root` 下的目标路径
///
/// `input_root/sub/a.png` + `Pdf` -> `output_root/sub/a.pdf`
pub fn map_path(
    input_root: &Path,
    output_root: &Path,
    file_path: &Path,
    kind: ConversionKind,
) -> Result<PathBuf> {
    let relative = relative_to(input_root, file_path)?;
    Ok(output_root.join(relative).with_extension(kind.extension()))
}

/// 文件相对于根目录的路径，拒绝越出根目录的结果
pub fn relative_to(root: &Path, file_path: &Path) -> Result<PathBuf> {
    let root = normalize(root);
    let file = normalize(file_path);

    let relative = file
        .strip_prefix(&root)
        .map_err(|_| ConverterError::InvalidPath {
            path: file_path.display().to_string(),
            reason: format!("not under {}", root.display()),
        })?;

    if relative.as_os_str().is_empty() {
        return Err(ConverterError::InvalidPath {
            path: file_path.display().to_string(),
            reason: "path is the root itself".to_string(),
        });
    }

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(ConverterError::PathEscape {
            path: file_path.display().to_string(),
        });
    }

    Ok(relative.to_path_buf())
}

/// 词法规范化：去掉 `.`，折叠 `name/..`，保留开头无法折叠的 `..`
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    out.iter().collect()
}
