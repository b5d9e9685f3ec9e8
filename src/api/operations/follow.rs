// 关注业务逻辑

use std::sync::Arc;

use uuid::Uuid;

use crate::cache::ProfileCache;
use crate::database::FollowRepository;
use crate::error::AppError;
use crate::models::UsersList;
use crate::utils::pagination::PaginationQuery;

pub struct FollowOperations {
    follows: Arc<dyn FollowRepository>,
    profile: Arc<ProfileCache>,
}

impl FollowOperations {
    pub fn new(follows: Arc<dyn FollowRepository>, profile: Arc<ProfileCache>) -> Self {
        Self { follows, profile }
    }

    pub async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), AppError> {
        if follower_id == following_id {
            return Err(AppError::bad_request("不能关注自己"));
        }
        self.follows.follow(follower_id, following_id).await?;
        self.profile
            .invalidate_follow_edge(follower_id, following_id)
            .await;
        Ok(())
    }

    pub async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), AppError> {
        self.follows.delete(follower_id, following_id).await?;
        self.profile
            .invalidate_follow_edge(follower_id, following_id)
            .await;
        Ok(())
    }

    pub async fn get_followers(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<UsersList, AppError> {
        Ok(self.follows.get_followers(viewer_id, user_id, pq).await?)
    }

    pub async fn get_following(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<UsersList, AppError> {
        Ok(self.follows.get_following(viewer_id, user_id, pq).await?)
    }
}
