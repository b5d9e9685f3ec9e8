/// 会话缓存键前缀
const SESSION_PREFIX: &str = "api-session:";

/// 生成会话缓存键
pub fn session_key(session_id: &str) -> String {
    format!("{}{}", SESSION_PREFIX, session_id)
}
