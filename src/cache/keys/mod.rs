/// 缓存键模块
/// 提供各种缓存键生成函数

pub mod rate_limit_keys;
pub mod session_keys;
pub mod user_keys;

pub use rate_limit_keys::rate_limit_key;
pub use session_keys::session_key;
pub use user_keys::{FollowCountKind, follow_count_key, follow_key, user_key};
