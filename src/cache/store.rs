use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::CacheError;

/// 键值存储
///
/// 所有过期时间以秒为单位。
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// 固定窗口计数：自增，首次自增时设置窗口过期时间，返回当前计数
    async fn incr_window(&self, key: &str, window_secs: u64) -> Result<u64, CacheError>;
}

/// 基于 Redis 的键值存储
#[derive(Clone)]
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn incr_window(&self, key: &str, window_secs: u64) -> Result<u64, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // INCR + EXPIRE 实现固定窗口计数器
        let count: u64 = conn.incr(key, 1).await?;
        if count == 1 {
            let _: () = conn.expire(key, window_secs as i64).await?;
        }
        Ok(count)
    }
}
