use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{AppState, error::AppError, infrastructure::auth::validate_token, models::User};

/// 当前登录用户，由认证中间件放入请求扩展
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// 通过会话 Cookie 认证时的会话 ID；Bearer 令牌认证时为空
    pub session_id: Option<String>,
}

/// 会话 Cookie 优先，其次 `Authorization: Bearer <jwt>`
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let current = if let Some(cookie) = jar.get(&state.config.session_name) {
        let session = state.sessions.get_session_by_id(cookie.value()).await?;
        CurrentUser {
            user: load_user(&state, session.user_id).await?,
            session_id: Some(session.session_id),
        }
    } else if let Some(token) = bearer_token(request.headers()) {
        let claims = validate_token(token, &state.config)?;
        CurrentUser {
            user: load_user(&state, claims.sub).await?,
            session_id: None,
        }
    } else {
        return Err(AppError::Unauthorized);
    };

    tracing::debug!("Authenticated user {}", current.user.user_id);
    request.extensions_mut().insert(current);
    Ok(next.run(request).await)
}

/// 先读资料缓存，未命中再查数据库并写回缓存
async fn load_user(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    if let Ok(user) = state.users.get_cache_by_id(user_id, user_id).await {
        return Ok(user);
    }
    state
        .users
        .get_by_id(user_id, user_id)
        .await
        .map_err(|e| match e {
            // 会话指向的用户已被删除
            AppError::NotFound(_) => AppError::Unauthorized,
            other => other,
        })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
