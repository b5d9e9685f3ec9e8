use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::repositories::{USER_ORDER_COLUMNS, user_with_follow_query};
use crate::models::{User, UsersList};
use crate::utils::pagination::PaginationQuery;

/// 用户存储库
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn register(&self, user: &User) -> Result<User, sqlx::Error>;

    /// 部分更新，空字段保持原值
    async fn update(&self, user: &User) -> Result<User, sqlx::Error>;

    async fn update_role(&self, user: &User) -> Result<User, sqlx::Error>;

    /// 删除用户，返回随之级联删除的关注关系 `(follower_id, following_id)`
    async fn delete(&self, user_id: Uuid) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error>;

    /// 按 ID 查询用户，附带关注计数和 viewer 的关注状态
    async fn get_by_id(&self, viewer_id: Uuid, user_id: Uuid) -> Result<User, sqlx::Error>;

    async fn get_by_user_name(&self, viewer_id: Uuid, user_name: &str) -> Result<User, sqlx::Error>;

    async fn find_by_name(
        &self,
        viewer_id: Uuid,
        name: &str,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error>;

    async fn get_users(&self, viewer_id: Uuid, pq: &PaginationQuery) -> Result<UsersList, sqlx::Error>;

    /// 按邮箱查询，结果包含密码哈希
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
}

/// 用户存储库的 PostgreSQL 实现
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn order_tail(pq: &PaginationQuery, first_param: usize) -> String {
        format!(
            "ORDER BY {} OFFSET ${} LIMIT ${}",
            pq.order_column(USER_ORDER_COLUMNS, "name, user_name"),
            first_param,
            first_param + 1
        )
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn register(&self, user: &User) -> Result<User, sqlx::Error> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_name, name, email, password, role, about, avatar, header,
                               phone_number, country, gender, birthday, created_at, updated_at, login_date)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'user'), $6, $7, $8, $9, $10, $11, $12, now(), now(), now())
            RETURNING *
            "#,
        )
        .bind(&user.user_name)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.role)
        .bind(&user.about)
        .bind(&user.avatar)
        .bind(&user.header)
        .bind(&user.phone_number)
        .bind(&user.country)
        .bind(&user.gender)
        .bind(user.birthday)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Registered user: {}", created.user_id);
        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET user_name = COALESCE(NULLIF($1, ''), user_name),
                name = COALESCE(NULLIF($2, ''), name),
                email = COALESCE(NULLIF($3, ''), email),
                about = COALESCE(NULLIF($4, ''), about),
                avatar = COALESCE(NULLIF($5, ''), avatar),
                header = COALESCE(NULLIF($6, ''), header),
                phone_number = COALESCE(NULLIF($7, ''), phone_number),
                country = COALESCE(NULLIF($8, ''), country),
                gender = COALESCE(NULLIF($9, ''), gender),
                birthday = COALESCE($10, birthday),
                updated_at = now()
            WHERE user_id = $11
            RETURNING *
            "#,
        )
        .bind(&user.user_name)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.about)
        .bind(&user.avatar)
        .bind(&user.header)
        .bind(&user.phone_number)
        .bind(&user.country)
        .bind(&user.gender)
        .bind(user.birthday)
        .bind(user.user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_role(&self, user: &User) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = COALESCE(NULLIF($1, ''), role),
                updated_at = now()
            WHERE user_id = $2
            RETURNING *
            "#,
        )
        .bind(&user.role)
        .bind(user.user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete(&self, user_id: Uuid) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let edges = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT follower_id, following_id FROM follows WHERE follower_id = $1 OR following_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        tx.commit().await?;
        Ok(edges)
    }

    async fn get_by_id(&self, viewer_id: Uuid, user_id: Uuid) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&user_with_follow_query("WHERE u.user_id = $2", ""))
            .bind(viewer_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_by_user_name(&self, viewer_id: Uuid, user_name: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&user_with_follow_query("WHERE u.user_name = $2", ""))
            .bind(viewer_id)
            .bind(user_name)
            .fetch_one(&self.pool)
            .await
    }

    async fn find_by_name(
        &self,
        viewer_id: Uuid,
        name: &str,
        pq: &PaginationQuery,
    ) -> Result<UsersList, sqlx::Error> {
        let total_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(user_id) FROM users WHERE user_name ILIKE '%' || $1 || '%' OR name ILIKE '%' || $1 || '%'",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        if total_count == 0 {
            return Ok(UsersList {
                info: pq.page_info(0),
                users: Vec::new(),
            });
        }

        let query = user_with_follow_query(
            "WHERE u.user_name ILIKE '%' || $2 || '%' OR u.name ILIKE '%' || $2 || '%'",
            &Self::order_tail(pq, 3),
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(viewer_id)
            .bind(name)
            .bind(pq.offset())
            .bind(pq.limit())
            .fetch_all(&self.pool)
            .await?;

        Ok(UsersList {
            info: pq.page_info(total_count),
            users,
        })
    }

    async fn get_users(&self, viewer_id: Uuid, pq: &PaginationQuery) -> Result<UsersList, sqlx::Error> {
        let total_count: i64 = sqlx::query_scalar("SELECT COUNT(user_id) FROM users")
            .fetch_one(&self.pool)
            .await?;

        if total_count == 0 {
            return Ok(UsersList {
                info: pq.page_info(0),
                users: Vec::new(),
            });
        }

        let query = user_with_follow_query("", &Self::order_tail(pq, 2));
        let users = sqlx::query_as::<_, User>(&query)
            .bind(viewer_id)
            .bind(pq.offset())
            .bind(pq.limit())
            .fetch_all(&self.pool)
            .await?;

        Ok(UsersList {
            info: pq.page_info(total_count),
            users,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, user_name, name, email, password, role, about, avatar, header,
                   phone_number, country, gender, birthday, created_at, updated_at, login_date
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }
}
