use uuid::Uuid;

/// 用户资料缓存键前缀
const USER_PREFIX: &str = "user:";

/// 关注关系缓存键前缀
const FOLLOW_PREFIX: &str = "follow:";

/// 关注计数缓存键前缀
const FOLLOW_COUNT_PREFIX: &str = "followcount:";

/// 关注计数的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowCountKind {
    /// 关注该用户的人数
    FollowersOf,
    /// 该用户关注的人数
    FollowingOf,
}

impl FollowCountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FollowCountKind::FollowersOf => "followers of",
            FollowCountKind::FollowingOf => "following of",
        }
    }
}

/// 生成用户资料缓存键
pub fn user_key(user_id: Uuid) -> String {
    format!("{}{}", USER_PREFIX, user_id)
}

/// 生成 "viewer 是否关注 subject" 缓存键
pub fn follow_key(viewer_id: Uuid, subject_id: Uuid) -> String {
    format!("{}{}+{}", FOLLOW_PREFIX, viewer_id, subject_id)
}

/// 生成关注计数缓存键
pub fn follow_count_key(kind: FollowCountKind, user_id: Uuid) -> String {
    format!("{}{}:{}", FOLLOW_COUNT_PREFIX, kind.as_str(), user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        let a = Uuid::nil();
        let b = Uuid::from_u128(1);

        assert_eq!(user_key(a), format!("user:{a}"));
        assert_eq!(follow_key(a, b), format!("follow:{a}+{b}"));
        assert_eq!(
            follow_count_key(FollowCountKind::FollowersOf, b),
            format!("followcount:followers of:{b}")
        );
        assert_eq!(
            follow_count_key(FollowCountKind::FollowingOf, b),
            format!("followcount:following of:{b}")
        );
    }
}
