// 文件上传业务逻辑

use std::sync::Arc;

use crate::error::AppError;
use crate::infrastructure::FileRepository;
use crate::utils::image::check_image_content_type;

/// 上传文件对外访问的路径前缀
pub const UPLOADS_PATH: &str = "/uploads";

pub struct FileOperations {
    files: Arc<dyn FileRepository>,
}

impl FileOperations {
    pub fn new(files: Arc<dyn FileRepository>) -> Self {
        Self { files }
    }

    /// 校验图片类型并保存，返回可访问的 URL 路径
    pub async fn put_image(&self, name: &str, bytes: &[u8]) -> Result<String, AppError> {
        let content_type = check_image_content_type(bytes)?;
        let object = self
            .files
            .put_object(name, bytes)
            .await
            .map_err(|e| AppError::internal(format!("failed to store upload: {e}")))?;
        tracing::info!("Stored {} upload as {}", content_type, object);
        Ok(format!("{}/{}", UPLOADS_PATH, object))
    }

    /// 删除旧文件；失败只记录日志
    pub async fn remove_object(&self, url: &str) {
        if let Err(e) = self.files.remove_object(url).await {
            tracing::warn!("Failed to remove old upload {}: {}", url, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::testing::TestApp;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

    #[tokio::test]
    async fn stores_image_under_uploads_path() {
        let app = TestApp::new();
        let files = &app.state.files;

        let url = files.put_image("me.png", PNG).await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-me.png"));

        let object = url.trim_start_matches("/uploads/");
        assert!(app.upload_dir.path().join(object).exists());

        files.remove_object(&url).await;
        assert!(!app.upload_dir.path().join(object).exists());
    }

    #[tokio::test]
    async fn rejects_non_image_upload() {
        let app = TestApp::new();
        let err = app
            .state
            .files
            .put_image("notes.txt", b"plain text")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(std::fs::read_dir(app.upload_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn removing_missing_object_is_not_an_error() {
        let app = TestApp::new();
        app.state.files.remove_object("/uploads/missing.png").await;
    }
}
