use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::repositories::{USER_ORDER_COLUMNS, user_with_follow_query};
use crate::models::{User, UsersList};
use crate::utils::pagination::PaginationQuery;

/// 关注关系存储库
#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), sqlx::Error>;

    async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), sqlx::Error>;

    /// 关注 `user_id` 的用户
    async fn get_followers(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error>;

    /// `user_id` 关注的用户
    async fn get_following(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error>;
}

pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list(
        &self,
        count_sql: &str,
        filter: &str,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error> {
        let total_count: i64 = sqlx::query_scalar(count_sql)
            .bind(user_id)
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
        let users = sqlx::query_as::<_, User>(&user_with_follow_query(filter, &tail))
            .bind(viewer_id)
            .bind(user_id)
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

#[async_trait]
impl FollowRepository for PgFollowRepository {
    async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO follows (follower_id, following_id, created_at) VALUES ($1, $2, now())",
        )
        .bind(follower_id)
        .bind(following_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
            .bind(follower_id)
            .bind(following_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn get_followers(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error> {
        self.list(
            "SELECT COUNT(follower_id) FROM follows WHERE following_id = $1",
            "WHERE u.user_id IN (SELECT ff.follower_id FROM follows ff WHERE ff.following_id = $2)",
            viewer_id,
            user_id,
            pq,
        )
        .await
    }

    async fn get_following(
        &self,
        viewer_id: Uuid,
        user_id: Uuid,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error> {
        self.list(
            "SELECT COUNT(following_id) FROM follows WHERE follower_id = $1",
            "WHERE u.user_id IN (SELECT ff.following_id FROM follows ff WHERE ff.follower_id = $2)",
            viewer_id,
            user_id,
            pq,
        )
        .await
    }
}
