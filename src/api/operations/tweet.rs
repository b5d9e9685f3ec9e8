// 推文业务逻辑

use std::sync::Arc;

use uuid::Uuid;

use crate::database::TweetRepository;
use crate::error::AppError;
use crate::models::{Tweet, TweetWithUser, TweetsList};
use crate::utils::pagination::PaginationQuery;

pub struct TweetOperations {
    tweets: Arc<dyn TweetRepository>,
}

impl TweetOperations {
    pub fn new(tweets: Arc<dyn TweetRepository>) -> Self {
        Self { tweets }
    }

    pub async fn create(&self, user_id: Uuid, mut tweet: Tweet) -> Result<Tweet, AppError> {
        tweet.user_id = user_id;
        tweet.validate()?;
        Ok(self.tweets.create(&tweet).await?)
    }

    /// 创建回复；关联失败时删除已插入的回复
    pub async fn create_reply(&self, user_id: Uuid, tweet_id: i64, mut tweet: Tweet) -> Result<Tweet, AppError> {
        if !self.tweets.check_tweet_exist(tweet_id).await? {
            return Err(AppError::not_found("推文不存在"));
        }

        tweet.user_id = user_id;
        tweet.validate()?;
        let reply = self.tweets.create(&tweet).await?;

        if let Err(link_err) = self.tweets.create_reply(tweet_id, reply.id).await {
            tracing::error!(
                "Failed to link reply {} to tweet {}: {}",
                reply.id,
                tweet_id,
                link_err
            );
            if let Err(e) = self.tweets.delete(reply.id).await {
                tracing::error!("Failed to remove orphan reply {}: {}", reply.id, e);
            }
            return Err(link_err.into());
        }

        Ok(reply)
    }

    pub async fn get_tweet_by_id(&self, viewer_id: Uuid, tweet_id: i64) -> Result<TweetWithUser, AppError> {
        Ok(self.tweets.get_tweet_by_id(viewer_id, tweet_id).await?)
    }

    pub async fn get_tweets(&self, viewer_id: Uuid, pq: &PaginationQuery) -> Result<TweetsList, AppError> {
        Ok(self.tweets.get_tweets(viewer_id, pq).await?)
    }

    pub async fn get_tweets_by_user_id(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, AppError> {
        Ok(self.tweets.get_tweets_by_user_id(viewer_id, user_id, pq).await?)
    }

    pub async fn get_reply_tweets(
        &self,
        viewer_id: Uuid,
        tweet_id: i64,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, AppError> {
        Ok(self.tweets.get_reply_tweets(viewer_id, tweet_id, pq).await?)
    }

    /// 删除推文，只有作者本人可以删除
    pub async fn delete(&self, user_id: Uuid, tweet_id: i64) -> Result<(), AppError> {
        let tweet = self.tweets.get_tweet_by_id(user_id, tweet_id).await?;
        if tweet.user_id != user_id {
            return Err(AppError::Forbidden("只能删除自己的推文".into()));
        }
        self.tweets.delete(tweet_id).await?;
        Ok(())
    }
}
