// 业务逻辑模块
// 每个实体一组操作，处理器只负责解析请求和组装响应

pub mod file;
pub mod follow;
pub mod like;
pub mod session;
pub mod tweet;
pub mod user;

pub use file::FileOperations;
pub use follow::FollowOperations;
pub use like::LikeOperations;
pub use session::SessionOperations;
pub use tweet::TweetOperations;
pub use user::UserOperations;
