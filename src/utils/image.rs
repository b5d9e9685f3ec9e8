use crate::error::AppError;

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

/// 根据文件头识别图片类型，只接受 PNG 和 JPEG
pub fn check_image_content_type(bytes: &[u8]) -> Result<&'static str, AppError> {
    if bytes.starts_with(PNG_SIGNATURE) {
        Ok("image/png")
    } else if bytes.starts_with(JPEG_SIGNATURE) {
        Ok("image/jpeg")
    } else {
        Err(AppError::bad_request("不支持的图片类型，仅允许 PNG 或 JPEG"))
    }
}
