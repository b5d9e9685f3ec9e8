use std::sync::Arc;

use sqlx::PgPool;

use api::operations::{
    FileOperations, FollowOperations, LikeOperations, SessionOperations, TweetOperations,
    UserOperations,
};
use cache::{KeyValueStore, ProfileCache, SessionCacheOperations};
use config::Config;
use database::{
    FollowRepository, LikeRepository, PgFollowRepository, PgLikeRepository, PgTweetRepository,
    PgUserRepository, TweetRepository, UserRepository,
};
use infrastructure::FileRepository;

pub mod api;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod infrastructure;
pub mod middleware;
pub mod models;
pub mod router;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

/// 存储库集合
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub tweets: Arc<dyn TweetRepository>,
    pub likes: Arc<dyn LikeRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            follows: Arc::new(PgFollowRepository::new(pool.clone())),
            tweets: Arc::new(PgTweetRepository::new(pool.clone())),
            likes: Arc::new(PgLikeRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn KeyValueStore>,
    pub users: Arc<UserOperations>,
    pub follows: Arc<FollowOperations>,
    pub tweets: Arc<TweetOperations>,
    pub likes: Arc<LikeOperations>,
    pub sessions: Arc<SessionOperations>,
    pub files: Arc<FileOperations>,
}

impl AppState {
    pub fn new(
        config: Config,
        repos: Repositories,
        store: Arc<dyn KeyValueStore>,
        files: Arc<dyn FileRepository>,
    ) -> Self {
        let config = Arc::new(config);
        let profile = Arc::new(ProfileCache::new(
            repos.users.clone(),
            store.clone(),
            config.cache_ttl_secs,
        ));

        Self {
            users: Arc::new(UserOperations::new(repos.users, profile.clone(), config.clone())),
            follows: Arc::new(FollowOperations::new(repos.follows, profile)),
            tweets: Arc::new(TweetOperations::new(repos.tweets)),
            likes: Arc::new(LikeOperations::new(repos.likes)),
            sessions: Arc::new(SessionOperations::new(
                SessionCacheOperations::new(store.clone()),
                config.session_expire_secs,
            )),
            files: Arc::new(FileOperations::new(files)),
            store,
            config,
        }
    }
}
