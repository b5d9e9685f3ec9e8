//! 用户资料的旁路缓存。
//!
//! 一次回源会写入四个独立过期的片段：
//!
//! - `user:{subject}`：去掉密码和关系字段的资料快照
//! - `follow:{viewer}+{subject}`：viewer 是否关注 subject
//! - `followcount:followers of:{subject}` / `followcount:following of:{subject}`
//!
//! 读取时任一片段缺失或无法解码都会让整次读取失败，调用方随后回源。
//! 缓存写入和失效的失败只作为 [`CacheAdvisory`] 返回并记录日志，不会让请求失败。

use std::sync::Arc;

use futures_util::future::join4;
use uuid::Uuid;

use crate::cache::keys::user_keys::{self, FollowCountKind};
use crate::cache::{CacheError, FollowCacheOperations, KeyValueStore, UserCacheOperations};
use crate::database::UserRepository;
use crate::error::AppError;
use crate::models::User;

/// 非致命的缓存失败
#[derive(Debug)]
pub struct CacheAdvisory {
    pub key: String,
    pub error: CacheError,
}

impl CacheAdvisory {
    fn from_result(key: String, result: Result<(), CacheError>) -> Option<Self> {
        let error = result.err()?;
        tracing::warn!("Cache operation on {} failed: {}", key, error);
        Some(Self { key, error })
    }
}

/// 回源结果：数据库中的用户，以及写缓存时出现的非致命失败
#[derive(Debug)]
pub struct Populated {
    pub user: User,
    pub advisories: Vec<CacheAdvisory>,
}

pub struct ProfileCache {
    users: Arc<dyn UserRepository>,
    user_cache: UserCacheOperations,
    follow_cache: FollowCacheOperations,
    ttl_secs: u64,
}

impl ProfileCache {
    pub fn new(users: Arc<dyn UserRepository>, store: Arc<dyn KeyValueStore>, ttl_secs: u64) -> Self {
        Self {
            users,
            user_cache: UserCacheOperations::new(store.clone()),
            follow_cache: FollowCacheOperations::new(store),
            ttl_secs,
        }
    }

    /// 从数据库读取用户并写回全部缓存片段
    ///
    /// 数据库错误会返回给调用方；缓存写入错误只出现在 `advisories` 中。
    pub async fn populate_on_miss(&self, viewer_id: Uuid, subject_id: Uuid) -> Result<Populated, AppError> {
        let mut user = self.users.get_by_id(viewer_id, subject_id).await?;
        user.sanitize_password();

        let is_following = user.is_following.unwrap_or(false);
        let followers = user.followers.unwrap_or(0);
        let following = user.following.unwrap_or(0);
        user.is_following = Some(is_following);
        user.followers = Some(followers);
        user.following = Some(following);

        let mut snapshot = user.clone();
        snapshot.sanitize_follow();

        let ttl = self.ttl_secs;
        let (flag, followers_res, following_res, profile) = join4(
            self.follow_cache
                .cache_is_following(viewer_id, subject_id, is_following, ttl),
            self.follow_cache
                .cache_count(FollowCountKind::FollowersOf, subject_id, followers, ttl),
            self.follow_cache
                .cache_count(FollowCountKind::FollowingOf, subject_id, following, ttl),
            self.user_cache.cache_user(&snapshot, ttl),
        )
        .await;

        let advisories = [
            (user_keys::follow_key(viewer_id, subject_id), flag),
            (
                user_keys::follow_count_key(FollowCountKind::FollowersOf, subject_id),
                followers_res,
            ),
            (
                user_keys::follow_count_key(FollowCountKind::FollowingOf, subject_id),
                following_res,
            ),
            (user_keys::user_key(subject_id), profile),
        ]
        .into_iter()
        .filter_map(|(key, result)| CacheAdvisory::from_result(key, result))
        .collect();

        Ok(Populated { user, advisories })
    }

    /// 只从缓存组装用户，不访问数据库
    ///
    /// 按固定顺序读取片段，遇到第一个失败立即返回。
    pub async fn read_from_cache(&self, viewer_id: Uuid, subject_id: Uuid) -> Result<User, CacheError> {
        let followers = self
            .follow_cache
            .get_count(FollowCountKind::FollowersOf, subject_id)
            .await?;
        let following = self
            .follow_cache
            .get_count(FollowCountKind::FollowingOf, subject_id)
            .await?;
        let is_following = self
            .follow_cache
            .get_is_following(viewer_id, subject_id)
            .await?;
        let mut user = self.user_cache.get_cached_user(subject_id).await?;

        user.followers = Some(followers);
        user.following = Some(following);
        user.is_following = Some(is_following);
        Ok(user)
    }

    /// 先读缓存，未命中再回源
    pub async fn get(&self, viewer_id: Uuid, subject_id: Uuid) -> Result<User, AppError> {
        match self.read_from_cache(viewer_id, subject_id).await {
            Ok(user) => Ok(user),
            Err(e) => {
                if e.is_miss() {
                    tracing::debug!("Profile cache miss: {}", e);
                } else {
                    tracing::warn!("Profile cache read failed, falling back to database: {}", e);
                }
                Ok(self.populate_on_miss(viewer_id, subject_id).await?.user)
            }
        }
    }

    /// 删除用户资料片段
    pub async fn invalidate(&self, subject_id: Uuid) -> Option<CacheAdvisory> {
        let result = self.user_cache.remove_user(subject_id).await;
        CacheAdvisory::from_result(user_keys::user_key(subject_id), result)
    }

    /// 关注关系变化后删除相关的计数和关注标记
    pub async fn invalidate_follow_edge(&self, follower_id: Uuid, following_id: Uuid) -> Vec<CacheAdvisory> {
        let (following_of, followers_of, flag) = tokio::join!(
            self.follow_cache
                .remove_count(FollowCountKind::FollowingOf, follower_id),
            self.follow_cache
                .remove_count(FollowCountKind::FollowersOf, following_id),
            self.follow_cache.remove_is_following(follower_id, following_id),
        );

        [
            (
                user_keys::follow_count_key(FollowCountKind::FollowingOf, follower_id),
                following_of,
            ),
            (
                user_keys::follow_count_key(FollowCountKind::FollowersOf, following_id),
                followers_of,
            ),
            (user_keys::follow_key(follower_id, following_id), flag),
        ]
        .into_iter()
        .filter_map(|(key, result)| CacheAdvisory::from_result(key, result))
        .collect()
    }
}
