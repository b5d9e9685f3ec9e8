// 数据库模块
// 包含各实体的存储库 trait 及其 PostgreSQL 实现

pub mod repositories;

pub use repositories::{
    FollowRepository, LikeRepository, PgFollowRepository, PgLikeRepository, PgTweetRepository,
    PgUserRepository, TweetRepository, UserRepository,
};
