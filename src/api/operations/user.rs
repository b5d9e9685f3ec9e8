// 用户业务逻辑
// 注册、登录、资料修改以及资料缓存的读取与失效

use std::sync::Arc;

use futures_util::future::join_all;
use uuid::Uuid;

use crate::cache::ProfileCache;
use crate::config::Config;
use crate::database::UserRepository;
use crate::error::AppError;
use crate::infrastructure::auth::generate_token;
use crate::models::{User, UserWithToken, UsersList};
use crate::utils::pagination::PaginationQuery;

pub struct UserOperations {
    users: Arc<dyn UserRepository>,
    profile: Arc<ProfileCache>,
    config: Arc<Config>,
}

impl UserOperations {
    pub fn new(users: Arc<dyn UserRepository>, profile: Arc<ProfileCache>, config: Arc<Config>) -> Self {
        Self {
            users,
            profile,
            config,
        }
    }

    /// 注册新用户，邮箱已存在时拒绝
    pub async fn register(&self, mut user: User) -> Result<UserWithToken, AppError> {
        let email = user.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::bad_request("邮箱已被注册"));
        }

        user.prepare_create()?;
        let mut created = self.users.register(&user).await?;
        created.sanitize_password();

        let token = generate_token(&created, &self.config)?;
        tracing::info!("用户 {} 注册成功", created.user_id);
        Ok(UserWithToken {
            user: created,
            token,
        })
    }

    /// 邮箱密码登录
    pub async fn login(&self, email: &str, password: &str) -> Result<UserWithToken, AppError> {
        let email = email.trim().to_lowercase();
        let mut found = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !found.compare_passwords(password.trim())? {
            tracing::debug!("Password mismatch for {}", found.user_id);
            return Err(AppError::Unauthorized);
        }
        found.sanitize_password();

        let token = generate_token(&found, &self.config)?;
        Ok(UserWithToken { user: found, token })
    }

    /// 更新资料并删除资料缓存
    pub async fn update(&self, mut user: User) -> Result<User, AppError> {
        user.prepare_update()?;

        let mut updated = self.users.update(&user).await?;
        self.profile.invalidate(updated.user_id).await;

        updated.sanitize_password();
        Ok(updated)
    }

    /// 更新角色并删除资料缓存
    pub async fn update_role(&self, mut user: User) -> Result<User, AppError> {
        user.prepare_update()?;
        if user.role.as_deref().is_none_or(str::is_empty) {
            return Err(AppError::bad_request("角色不能为空"));
        }

        let mut updated = self.users.update_role(&user).await?;
        self.profile.invalidate(updated.user_id).await;

        updated.sanitize_password();
        Ok(updated)
    }

    /// 删除用户，同时让资料缓存和级联删除的关注关系所涉及的计数失效
    pub async fn delete(&self, user_id: Uuid) -> Result<(), AppError> {
        let edges = self.users.delete(user_id).await?;
        self.profile.invalidate(user_id).await;
        join_all(
            edges
                .iter()
                .map(|(follower, following)| self.profile.invalidate_follow_edge(*follower, *following)),
        )
        .await;

        tracing::info!("用户 {} 已删除，清理 {} 条关注关系缓存", user_id, edges.len());
        Ok(())
    }

    /// 回源读取用户并写回缓存
    pub async fn get_by_id(&self, viewer_id: Uuid, user_id: Uuid) -> Result<User, AppError> {
        Ok(self.profile.populate_on_miss(viewer_id, user_id).await?.user)
    }

    /// 只从缓存读取，未命中由调用方回源
    pub async fn get_cache_by_id(&self, viewer_id: Uuid, user_id: Uuid) -> Result<User, AppError> {
        Ok(self.profile.read_from_cache(viewer_id, user_id).await?)
    }

    /// 缓存优先读取
    pub async fn get_profile(&self, viewer_id: Uuid, user_id: Uuid) -> Result<User, AppError> {
        self.profile.get(viewer_id, user_id).await
    }

    pub async fn get_by_user_name(&self, viewer_id: Uuid, user_name: &str) -> Result<User, AppError> {
        let mut user = self.users.get_by_user_name(viewer_id, user_name).await?;
        user.sanitize_password();
        Ok(user)
    }

    pub async fn find_by_name(
        &self,
        viewer_id: Uuid,
        name: &str,
        pq: &PaginationQuery,
    ) -> Result<UsersList, AppError> {
        Ok(self.users.find_by_name(viewer_id, name, pq).await?)
    }

    pub async fn get_users(&self, viewer_id: Uuid, pq: &PaginationQuery) -> Result<UsersList, AppError> {
        Ok(self.users.get_users(viewer_id, pq).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::keys::user_keys;
    use crate::testing::TestApp;

    fn new_user(email: &str) -> User {
        User {
            user_name: "carol".into(),
            name: "Carol".into(),
            email: email.into(),
            password: "hunter22".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let app = TestApp::new();
        let ops = &app.state.users;

        let registered = ops.register(new_user("Carol@Example.com")).await.unwrap();
        assert!(registered.user.password.is_empty());
        assert!(!registered.token.is_empty());

        let logged_in = ops.login("carol@example.com", "hunter22").await.unwrap();
        assert_eq!(logged_in.user.user_id, registered.user.user_id);
        assert!(logged_in.user.password.is_empty());
    }

    #[tokio::test]
    async fn register_rejects_existing_email() {
        let app = TestApp::new();
        let ops = &app.state.users;
        ops.register(new_user("carol@example.com")).await.unwrap();

        let err = ops.register(new_user(" CAROL@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email() {
        let app = TestApp::new();
        let ops = &app.state.users;
        ops.register(new_user("carol@example.com")).await.unwrap();

        assert!(matches!(
            ops.login("carol@example.com", "wrong-password").await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            ops.login("nobody@example.com", "hunter22").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn update_invalidates_cached_profile() {
        let app = TestApp::new();
        let ops = &app.state.users;
        let id = app.db.add_user("dave", "Dave");

        ops.get_by_id(id, id).await.unwrap();
        assert!(app.store.contains(&user_keys::user_key(id)));

        let updated = ops
            .update(User {
                user_id: id,
                about: Some("hello".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.about.as_deref(), Some("hello"));
        assert_eq!(updated.name, "Dave");
        assert!(!app.store.contains(&user_keys::user_key(id)));

        let fresh = ops.get_profile(id, id).await.unwrap();
        assert_eq!(fresh.about.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn update_role_invalidates_cached_profile() {
        let app = TestApp::new();
        let ops = &app.state.users;
        let id = app.db.add_user("erin", "Erin");
        ops.get_by_id(id, id).await.unwrap();

        let updated = ops
            .update_role(User {
                user_id: id,
                role: Some("Admin".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(updated.is_admin());
        assert!(ops.get_cache_by_id(id, id).await.is_err());
    }

    #[tokio::test]
    async fn delete_invalidates_and_reports_missing_rows() {
        let app = TestApp::new();
        let ops = &app.state.users;
        let id = app.db.add_user("frank", "Frank");
        ops.get_by_id(id, id).await.unwrap();

        ops.delete(id).await.unwrap();
        assert!(!app.store.contains(&user_keys::user_key(id)));
        assert!(matches!(ops.delete(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(ops.get_profile(id, id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_refreshes_counts_of_former_follow_partners() {
        let app = TestApp::new();
        let ops = &app.state.users;
        let amy = app.db.add_user("amy", "Amy");
        let ben = app.db.add_user("ben", "Ben");
        let cat = app.db.add_user("cat", "Cat");
        app.db.add_follow(amy, ben);
        app.db.add_follow(cat, amy);

        assert_eq!(ops.get_profile(ben, ben).await.unwrap().followers, Some(1));
        assert_eq!(ops.get_profile(cat, cat).await.unwrap().following, Some(1));

        ops.delete(amy).await.unwrap();

        let ben_view = ops.get_profile(ben, ben).await.unwrap();
        assert_eq!(ben_view.followers, Some(0));
        assert_eq!(ben_view, ops.get_by_id(ben, ben).await.unwrap());
        assert_eq!(ops.get_profile(cat, cat).await.unwrap().following, Some(0));
    }

    #[tokio::test]
    async fn cache_failure_does_not_fail_update() {
        let app = TestApp::new();
        let id = app.db.add_user("gina", "Gina");
        app.store.fail_deletes(true);

        let updated = app
            .state
            .users
            .update(User {
                user_id: id,
                country: Some("TW".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.country.as_deref(), Some("TW"));
    }
}
