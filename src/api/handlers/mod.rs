// API 处理器模块
// 解析请求、做权限检查，再调用 operations

use axum::body::Bytes;
use axum::extract::Multipart;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;

pub mod health;
pub mod tweet;
pub mod user;

/// 只允许资源所有者本人操作
pub(crate) fn ensure_owner(current: &CurrentUser, user_id: Uuid) -> Result<(), AppError> {
    if current.user.user_id != user_id {
        return Err(AppError::Forbidden("只能修改自己的资源".into()));
    }
    Ok(())
}

/// 只允许管理员操作
pub(crate) fn ensure_admin(current: &CurrentUser) -> Result<(), AppError> {
    if !current.user.is_admin() {
        return Err(AppError::Forbidden("需要管理员权限".into()));
    }
    Ok(())
}

/// 上传的文件
pub(crate) struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// 表单中的文本字段和文件字段
#[derive(Default)]
pub(crate) struct UploadForm {
    pub text: Option<String>,
    pub file: Option<Upload>,
}

/// 读取 multipart 表单：`text` 为文本，`file`（或 `image`）为文件，空文件视为未上传
pub(crate) async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("text") => form.text = Some(field.text().await?),
            Some("file") | Some("image") => {
                let file_name = field.file_name().unwrap_or("upload").to_owned();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.file = Some(Upload { file_name, bytes });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}
