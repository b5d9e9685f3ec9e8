// 会话业务逻辑

use uuid::Uuid;

use crate::cache::SessionCacheOperations;
use crate::error::AppError;
use crate::models::Session;

pub struct SessionOperations {
    sessions: SessionCacheOperations,
    expire_secs: u64,
}

impl SessionOperations {
    pub fn new(sessions: SessionCacheOperations, expire_secs: u64) -> Self {
        Self {
            sessions,
            expire_secs,
        }
    }

    /// 创建会话，返回会话 ID
    pub async fn create_session(&self, user_id: Uuid) -> Result<String, AppError> {
        Ok(self.sessions.create_session(user_id, self.expire_secs).await?)
    }

    /// 会话不存在或已过期时返回 `Unauthorized`
    pub async fn get_session_by_id(&self, session_id: &str) -> Result<Session, AppError> {
        self.sessions.get_session(session_id).await.map_err(|e| {
            if e.is_miss() {
                AppError::Unauthorized
            } else {
                AppError::from(e)
            }
        })
    }

    pub async fn delete_by_id(&self, session_id: &str) -> Result<(), AppError> {
        Ok(self.sessions.remove_session(session_id).await?)
    }
}
