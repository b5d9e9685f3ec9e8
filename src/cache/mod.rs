// 缓存模块
// 包含键值存储抽象、缓存键、缓存操作以及用户资料的旁路缓存协调

use thiserror::Error;

pub mod keys;
pub mod operations;
pub mod profile;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use operations::{FollowCacheOperations, SessionCacheOperations, UserCacheOperations};
pub use profile::{CacheAdvisory, Populated, ProfileCache};
pub use store::{KeyValueStore, RedisStore};

/// 缓存错误
///
/// `Miss` 表示键不存在或已过期，调用方应回源到数据库。
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache miss for key `{0}`")]
    Miss(String),
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("cannot decode value `{value}` of key `{key}`")]
    Decode { key: String, value: String },
}

impl CacheError {
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss(_))
    }
}
