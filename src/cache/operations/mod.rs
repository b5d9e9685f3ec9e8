/// 缓存操作
/// 提供缓存操作的功能实现

pub mod follow;
pub mod session;
pub mod user;

pub use follow::FollowCacheOperations;
pub use session::SessionCacheOperations;
pub use user::UserCacheOperations;
