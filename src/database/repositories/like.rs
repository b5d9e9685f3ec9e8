use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::repositories::tweet::PgTweetRepository;
use crate::database::repositories::{USER_ORDER_COLUMNS, tweet_with_user_query, user_with_follow_query};
use crate::models::{TweetWithUser, TweetsList, User, UsersList};
use crate::utils::pagination::PaginationQuery;

/// 点赞存储库
#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn like(&self, user_id: Uuid, tweet_id: i64) -> Result<(), sqlx::Error>;

    async fn delete(&self, user_id: Uuid, tweet_id: i64) -> Result<(), sqlx::Error>;

    /// `user_id` 点赞过的推文
    async fn get_liked_tweets(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, sqlx::Error>;

    /// 点赞了 `tweet_id` 的用户
    async fn get_liked_users(
        &self,
        viewer_id: Uuid,
        tweet_id: i64,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error>;
}

pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn like(&self, user_id: Uuid, tweet_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO tweets_likes (user_id, tweet_id, created_at) VALUES ($1, $2, now())")
            .bind(user_id)
            .bind(tweet_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, tweet_id: i64) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM tweets_likes WHERE user_id = $1 AND tweet_id = $2")
            .bind(user_id)
            .bind(tweet_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn get_liked_tweets(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, sqlx::Error> {
        let total_count: i64 =
            sqlx::query_scalar("SELECT COUNT(tweet_id) FROM tweets_likes WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if total_count == 0 {
            return Ok(TweetsList {
                info: pq.page_info(0),
                tweets: Vec::new(),
            });
        }

        let query = tweet_with_user_query(
            "WHERE t.id IN (SELECT ll.tweet_id FROM tweets_likes ll WHERE ll.user_id = $2)",
            &PgTweetRepository::order_tail(pq, 3),
        );
        let tweets = sqlx::query_as::<_, TweetWithUser>(&query)
            .bind(viewer_id)
            .bind(user_id)
            .bind(pq.offset())
            .bind(pq.limit())
            .fetch_all(&self.pool)
            .await?;

        Ok(TweetsList {
            info: pq.page_info(total_count),
            tweets,
        })
    }

    async fn get_liked_users(
        &self,
        viewer_id: Uuid,
        tweet_id: i64,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error> {
        let total_count: i64 =
            sqlx::query_scalar("SELECT COUNT(user_id) FROM tweets_likes WHERE tweet_id = $1")
                .bind(tweet_id)
                .fetch_one(&self.pool)
                .await?;
        if total_count == 0 {
            return Ok(UsersList {
                info: pq.page_info(0),
                users: Vec::new(),
            });
        }

        let tail = format!(
            "ORDER BY {} OFFSET $3 LIMIT $4",
            pq.order_column(USER_ORDER_COLUMNS, "name, user_name")
        );
        let query = user_with_follow_query(
            "WHERE u.user_id IN (SELECT ll.user_id FROM tweets_likes ll WHERE ll.tweet_id = $2)",
            &tail,
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(viewer_id)
            .bind(tweet_id)
            .bind(pq.offset())
            .bind(pq.limit())
            .fetch_all(&self.pool)
            .await?;

        Ok(UsersList {
            info: pq.page_info(total_count),
            users,
        })
    }
}
