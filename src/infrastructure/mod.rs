// 基础设施：令牌、CSRF 和文件存储

pub mod auth;
pub mod csrf;
pub mod file;

pub use file::{FileRepository, LocalFileRepository};
