//! # 会话目录管理
//!
//! 每个转换请求对应一个 UUID 会话，上传文件与转换结果分别存放在
//! `<data>/uploads/<id>/` 与 `<data>/output/<id>/`。
//!
//! ## 依赖关系
//! - 被 `server/routes.rs` 使用
//! - 使用 `uuid` 生成与校验会话 ID，`walkdir` 列出会话文件

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

/// 会话目录根
#[derive(Debug, Clone)]
pub struct SessionStore {
    uploads_root: PathBuf,
    output_root: PathBuf,
}

/// 一次请求分配的会话
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            uploads_root: data_dir.join("uploads"),
            output_root: data_dir.join("output"),
        }
    }

    /// 创建上传与输出根目录
    pub async fn init(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.uploads_root).await?;
        tokio::fs::create_dir_all(&self.output_root).await
    }

    /// 静态下载的根目录
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// 分配新会话，不创建目录
    pub fn allocate(&self) -> Session {
        self.session(Uuid::new_v4())
    }

    fn session(&self, id: Uuid) -> Session {
        let name = id.to_string();
        Session {
            id,
            upload_dir: self.uploads_root.join(&name),
            output_dir: self.output_root.join(&name),
        }
    }

    /// 解析会话 ID，只接受 UUID
    pub fn parse_id(id: &str) -> Option<Uuid> {
        Uuid::parse_str(id).ok()
    }

    /// 会话输出目录下的所有文件（相对路径，`/` 分隔，已排序）；会话不存在时为 `None`
    pub fn list_files(&self, id: Uuid) -> Option<Vec<String>> {
        let dir = self.session(id).output_dir;
        if !dir.is_dir() {
            return None;
        }

        let mut files: Vec<String> = WalkDir::new(&dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.path().strip_prefix(&dir).ok().map(url_path))
            .collect();
        files.sort();
        Some(files)
    }

    /// 删除会话的上传与输出目录；不存在的会话视为成功
    pub async fn purge(&self, id: Uuid) -> io::Result<()> {
        let session = self.session(id);
        for dir in [&session.upload_dir, &session.output_dir] {
            match tokio::fs::remove_dir_all(dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl Session {
    /// 输出文件的下载 URL
    pub fn download_path(&self, output: &Path) -> String {
        let relative = output.strip_prefix(&self.output_dir).unwrap_or(output);
        format!("/downloads/{}/{}", self.id, url_path(relative))
    }
}

/// 相对路径转为 `/` 分隔形式
pub fn url_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_and_purge() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        store.init().await.unwrap();

        let session = store.allocate();
        assert!(store.list_files(session.id).is_none());

        std::fs::create_dir_all(session.output_dir.join("sub")).unwrap();
        std::fs::write(session.output_dir.join("sub/b.pdf"), b"x").unwrap();
        std::fs::write(session.output_dir.join("a.pdf"), b"x").unwrap();

        assert_eq!(
            store.list_files(session.id).unwrap(),
            vec!["a.pdf".to_string(), "sub/b.pdf".to_string()]
        );

        store.purge(session.id).await.unwrap();
        assert!(store.list_files(session.id).is_none());
        store.purge(session.id).await.unwrap();
    }

    #[test]
    fn test_download_path() {
        let store = SessionStore::new(Path::new("/data"));
        let session = store.allocate();
        let out = session.output_dir.join("sub").join("b.webp");
        assert_eq!(
            session.download_path(&out),
            format!("/downloads/{}/sub/b.webp", session.id)
        );
    }

    #[test]
    fn test_parse_id() {
        assert!(SessionStore::parse_id("../etc").is_none());
        let id = Uuid::new_v4();
        assert_eq!(SessionStore::parse_id(&id.to_string()), Some(id));
    }
}
