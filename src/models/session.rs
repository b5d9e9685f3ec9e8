use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 会话，存储在 Redis 中
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: Uuid,
}
