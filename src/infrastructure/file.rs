use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

/// 文件存储
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// 保存文件，返回存储后的对象名
    async fn put_object(&self, name: &str, bytes: &[u8]) -> io::Result<String>;

    async fn remove_object(&self, object: &str) -> io::Result<()>;
}

/// 本地磁盘文件存储，对象名为 `{uuid}-{原文件名}`
pub struct LocalFileRepository {
    dir: PathBuf,
}

impl LocalFileRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn generate_file_name(name: &str) -> String {
        // 只保留最后一级文件名，防止路径穿越
        let base = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");
        format!("{}-{}", Uuid::new_v4(), base)
    }

    fn object_path(&self, object: &str) -> io::Result<PathBuf> {
        let file_name = Path::new(object)
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid object name"))?;
        Ok(self.dir.join(file_name))
    }
}

#[async_trait]
impl FileRepository for LocalFileRepository {
    async fn put_object(&self, name: &str, bytes: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let object = Self::generate_file_name(name);
        tokio::fs::write(self.dir.join(&object), bytes).await?;
        tracing::debug!("Stored upload {} ({} bytes)", object, bytes.len());
        Ok(object)
    }

    async fn remove_object(&self, object: &str) -> io::Result<()> {
        tokio::fs::remove_file(self.object_path(object)?).await
    }
}
