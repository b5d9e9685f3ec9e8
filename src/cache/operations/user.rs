use std::sync::Arc;

use uuid::Uuid;

use crate::cache::keys::user_keys;
use crate::cache::{CacheError, KeyValueStore};
use crate::models::User;

/// 用户资料缓存操作
#[derive(Clone)]
pub struct UserCacheOperations {
    store: Arc<dyn KeyValueStore>,
}

impl UserCacheOperations {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 缓存用户资料，调用方负责事先清空密码和关系字段
    pub async fn cache_user(&self, user: &User, ttl_secs: u64) -> Result<(), CacheError> {
        let json = serde_json::to_string(user)?;
        self.store
            .set_ex(&user_keys::user_key(user.user_id), &json, ttl_secs)
            .await
    }

    /// 从缓存获取用户资料
    pub async fn get_cached_user(&self, user_id: Uuid) -> Result<User, CacheError> {
        let key = user_keys::user_key(user_id);
        let json = self
            .store
            .get(&key)
            .await?
            .ok_or(CacheError::Miss(key))?;
        Ok(serde_json::from_str(&json)?)
    }

    pub async fn remove_user(&self, user_id: Uuid) -> Result<(), CacheError> {
        self.store.del(&user_keys::user_key(user_id)).await
    }
}
