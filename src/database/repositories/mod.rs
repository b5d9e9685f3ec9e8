// 存储库：每个实体一个 trait 和一个 PostgreSQL 实现

pub mod follow;
pub mod like;
pub mod tweet;
pub mod user;

pub use follow::{FollowRepository, PgFollowRepository};
pub use like::{LikeRepository, PgLikeRepository};
pub use tweet::{PgTweetRepository, TweetRepository};
pub use user::{PgUserRepository, UserRepository};

/// 带关注计数与观察者关注状态的用户查询
///
/// `$1` 为观察者；`filter` 拼接在 CTE 内，`tail`（排序与分页）拼接在外层。
pub(crate) fn user_with_follow_query(filter: &str, tail: &str) -> String {
    format!(
        r#"
        WITH __u AS (
            SELECT u.user_id, u.user_name, u.name, u.email, u.role, u.about, u.avatar, u.header,
                   u.phone_number, u.country, u.gender, u.birthday, u.created_at, u.updated_at, u.login_date,
                   COUNT(DISTINCT f1.following_id) AS following,
                   COUNT(DISTINCT f2.follower_id) AS followers
            FROM users u
            LEFT JOIN follows f1 ON f1.follower_id = u.user_id
            LEFT JOIN follows f2 ON f2.following_id = u.user_id
            {filter}
            GROUP BY u.user_id
        )
        SELECT __u.*,
               EXISTS (SELECT 1 FROM follows f WHERE f.following_id = __u.user_id AND f.follower_id = $1) AS is_following
        FROM __u
        {tail}
        "#
    )
}

/// 带作者信息、计数与观察者点赞状态的推文查询，`$1` 为观察者
pub(crate) fn tweet_with_user_query(filter: &str, tail: &str) -> String {
    format!(
        r#"
        SELECT t.id, t.text, t.image, t.created_at,
               u.user_id, u.name, u.user_name, u.about, u.avatar,
               COUNT(DISTINCT r.reply_id) AS replys,
               COUNT(DISTINCT l.user_id) AS likes,
               EXISTS (SELECT 1 FROM tweets_likes tl WHERE tl.tweet_id = t.id AND tl.user_id = $1) AS already_liked
        FROM tweets t
        INNER JOIN users u ON t.user_id = u.user_id
        LEFT JOIN tweets_replys r ON t.id = r.tweet_id
        LEFT JOIN tweets_likes l ON t.id = l.tweet_id
        {filter}
        GROUP BY t.id, u.user_id
        {tail}
        "#
    )
}

/// 用户列表允许的排序字段
pub(crate) const USER_ORDER_COLUMNS: &[(&str, &str)] = &[
    ("name", "name, user_name"),
    ("user_name", "user_name"),
    ("created_at", "created_at DESC"),
];

/// 推文列表允许的排序字段
pub(crate) const TWEET_ORDER_COLUMNS: &[(&str, &str)] = &[
    ("id", "t.id DESC"),
    ("created_at", "t.created_at DESC"),
    ("likes", "likes DESC, t.id DESC"),
];
