// 点赞业务逻辑

use std::sync::Arc;

use uuid::Uuid;

use crate::database::LikeRepository;
use crate::error::AppError;
use crate::models::{TweetsList, UsersList};
use crate::utils::pagination::PaginationQuery;

pub struct LikeOperations {
    likes: Arc<dyn LikeRepository>,
}

impl LikeOperations {
    pub fn new(likes: Arc<dyn LikeRepository>) -> Self {
        Self { likes }
    }

    pub async fn like(&self, user_id: Uuid, tweet_id: i64) -> Result<(), AppError> {
        Ok(self.likes.like(user_id, tweet_id).await?)
    }

    pub async fn delete(&self, user_id: Uuid, tweet_id: i64) -> Result<(), AppError> {
        Ok(self.likes.delete(user_id, tweet_id).await?)
    }

    pub async fn get_liked_tweets(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, AppError> {
        Ok(self.likes.get_liked_tweets(viewer_id, user_id, pq).await?)
    }

    pub async fn get_liked_users(
        &self,
        viewer_id: Uuid,
        tweet_id: i64,
        pq: &PaginationQuery,
    ) -> Result<UsersList, AppError> {
        Ok(self.likes.get_liked_users(viewer_id, tweet_id, pq).await?)
    }
}
