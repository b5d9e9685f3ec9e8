use std::sync::Arc;

use uuid::Uuid;

use crate::cache::keys::session_keys;
use crate::cache::{CacheError, KeyValueStore};
use crate::models::Session;

/// 会话缓存操作
#[derive(Clone)]
pub struct SessionCacheOperations {
    store: Arc<dyn KeyValueStore>,
}

impl SessionCacheOperations {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 创建会话，返回新的会话 ID
    pub async fn create_session(&self, user_id: Uuid, expire_secs: u64) -> Result<String, CacheError> {
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            user_id,
        };
        let json = serde_json::to_string(&session)?;
        self.store
            .set_ex(&session_keys::session_key(&session.session_id), &json, expire_secs)
            .await?;
        Ok(session.session_id)
    }

    /// 获取会话
    pub async fn get_session(&self, session_id: &str) -> Result<Session, CacheError> {
        let key = session_keys::session_key(session_id);
        let json = self
            .store
            .get(&key)
            .await?
            .ok_or(CacheError::Miss(key))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// 删除会话
    pub async fn remove_session(&self, session_id: &str) -> Result<(), CacheError> {
        self.store.del(&session_keys::session_key(session_id)).await
    }
}
