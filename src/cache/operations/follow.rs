use std::sync::Arc;

use uuid::Uuid;

use crate::cache::keys::user_keys::{self, FollowCountKind};
use crate::cache::{CacheError, KeyValueStore};

/// 关注关系与关注计数缓存操作
///
/// 布尔值存为 `true`/`false`，计数存为十进制整数。
#[derive(Clone)]
pub struct FollowCacheOperations {
    store: Arc<dyn KeyValueStore>,
}

impl FollowCacheOperations {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn cache_is_following(
        &self,
        viewer_id: Uuid,
        subject_id: Uuid,
        is_following: bool,
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        let key = user_keys::follow_key(viewer_id, subject_id);
        self.store
            .set_ex(&key, if is_following { "true" } else { "false" }, ttl_secs)
            .await
    }

    pub async fn get_is_following(
        &self,
        viewer_id: Uuid,
        subject_id: Uuid,
    ) -> Result<bool, CacheError> {
        let key = user_keys::follow_key(viewer_id, subject_id);
        let raw = self.fetch(&key).await?;
        raw.parse::<bool>()
            .map_err(|_| CacheError::Decode { key, value: raw })
    }

    pub async fn remove_is_following(
        &self,
        viewer_id: Uuid,
        subject_id: Uuid,
    ) -> Result<(), CacheError> {
        self.store
            .del(&user_keys::follow_key(viewer_id, subject_id))
            .await
    }

    pub async fn cache_count(
        &self,
        kind: FollowCountKind,
        user_id: Uuid,
        count: i64,
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        let key = user_keys::follow_count_key(kind, user_id);
        self.store.set_ex(&key, &count.to_string(), ttl_secs).await
    }

    pub async fn get_count(&self, kind: FollowCountKind, user_id: Uuid) -> Result<i64, CacheError> {
        let key = user_keys::follow_count_key(kind, user_id);
        let raw = self.fetch(&key).await?;
        raw.parse::<i64>()
            .map_err(|_| CacheError::Decode { key, value: raw })
    }

    pub async fn remove_count(&self, kind: FollowCountKind, user_id: Uuid) -> Result<(), CacheError> {
        self.store
            .del(&user_keys::follow_count_key(kind, user_id))
            .await
    }

    async fn fetch(&self, key: &str) -> Result<String, CacheError> {
        self.store
            .get(key)
            .await?
            .ok_or_else(|| CacheError::Miss(key.to_string()))
    }
}
