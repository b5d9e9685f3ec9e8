use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::repositories::{TWEET_ORDER_COLUMNS, tweet_with_user_query};
use crate::models::{Tweet, TweetWithUser, TweetsList};
use crate::utils::pagination::PaginationQuery;

/// 推文存储库
#[async_trait]
pub trait TweetRepository: Send + Sync {
    async fn create(&self, tweet: &Tweet) -> Result<Tweet, sqlx::Error>;

    /// 把 `reply_id` 关联为 `tweet_id` 的回复
    async fn create_reply(&self, tweet_id: i64, reply_id: i64) -> Result<(), sqlx::Error>;

    async fn check_tweet_exist(&self, tweet_id: i64) -> Result<bool, sqlx::Error>;

    async fn get_tweet_by_id(&self, viewer_id: Uuid, tweet_id: i64) -> Result<TweetWithUser, sqlx::Error>;

    async fn get_tweets(&self, viewer_id: Uuid, pq: &PaginationQuery) -> Result<TweetsList, sqlx::Error>;

    async fn get_tweets_by_user_id(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, sqlx::Error>;

    async fn get_reply_tweets(
        &self,
        viewer_id: Uuid,
        tweet_id: i64,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, sqlx::Error>;

    async fn delete(&self, tweet_id: i64) -> Result<(), sqlx::Error>;
}

pub struct PgTweetRepository {
    pool: PgPool,
}

impl PgTweetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn order_tail(pq: &PaginationQuery, first_param: usize) -> String {
        format!(
            "ORDER BY {} OFFSET ${} LIMIT ${}",
            pq.order_column(TWEET_ORDER_COLUMNS, "t.id DESC"),
            first_param,
            first_param + 1
        )
    }
}

#[async_trait]
impl TweetRepository for PgTweetRepository {
    async fn create(&self, tweet: &Tweet) -> Result<Tweet, sqlx::Error> {
        sqlx::query_as::<_, Tweet>(
            r#"
            INSERT INTO tweets (user_id, text, image, created_at)
            VALUES ($1, $2, $3, now())
            RETURNING *
            "#,
        )
        .bind(tweet.user_id)
        .bind(&tweet.text)
        .bind(&tweet.image)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_reply(&self, tweet_id: i64, reply_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO tweets_replys (tweet_id, reply_id) VALUES ($1, $2)")
            .bind(tweet_id)
            .bind(reply_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn check_tweet_exist(&self, tweet_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tweets WHERE id = $1)")
            .bind(tweet_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_tweet_by_id(&self, viewer_id: Uuid, tweet_id: i64) -> Result<TweetWithUser, sqlx::Error> {
        sqlx::query_as::<_, TweetWithUser>(&tweet_with_user_query("WHERE t.id = $2", ""))
            .bind(viewer_id)
            .bind(tweet_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_tweets(&self, viewer_id: Uuid, pq: &PaginationQuery) -> Result<TweetsList, sqlx::Error> {
        let total_count: i64 = sqlx::query_scalar("SELECT COUNT(id) FROM tweets")
            .fetch_one(&self.pool)
            .await?;
        if total_count == 0 {
            return Ok(TweetsList {
                info: pq.page_info(0),
                tweets: Vec::new(),
            });
        }

        let tweets = sqlx::query_as::<_, TweetWithUser>(&tweet_with_user_query("", &Self::order_tail(pq, 2)))
            .bind(viewer_id)
            .bind(pq.offset())
            .bind(pq.limit())
            .fetch_all(&self.pool)
            .await?;

        Ok(TweetsList {
            info: pq.page_info(total_count),
            tweets,
        })
    }

    async fn get_tweets_by_user_id(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, sqlx::Error> {
        let total_count: i64 = sqlx::query_scalar("SELECT COUNT(id) FROM tweets WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        if total_count == 0 {
            return Ok(TweetsList {
                info: pq.page_info(0),
                tweets: Vec::new(),
            });
        }

        let query = tweet_with_user_query("WHERE t.user_id = $2", &Self::order_tail(pq, 3));
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

    async fn get_reply_tweets(
        &self,
        viewer_id: Uuid,
        tweet_id: i64,
        pq: &PaginationQuery,
    ) -> Result<TweetsList, sqlx::Error> {
        let total_count: i64 =
            sqlx::query_scalar("SELECT COUNT(reply_id) FROM tweets_replys WHERE tweet_id = $1")
                .bind(tweet_id)
                .fetch_one(&self.pool)
                .await?;
        if total_count == 0 {
            return Ok(TweetsList {
                info: pq.page_info(0),
                tweets: Vec::new(),
            });
        }

        let query = tweet_with_user_query(
            "WHERE t.id IN (SELECT rr.reply_id FROM tweets_replys rr WHERE rr.tweet_id = $2)",
            &Self::order_tail(pq, 3),
        );
        let tweets = sqlx::query_as::<_, TweetWithUser>(&query)
            .bind(viewer_id)
            .bind(tweet_id)
            .bind(pq.offset())
            .bind(pq.limit())
            .fetch_all(&self.pool)
            .await?;

        Ok(TweetsList {
            info: pq.page_info(total_count),
            tweets,
        })
    }

    async fn delete(&self, tweet_id: i64) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(tweet_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }
}
