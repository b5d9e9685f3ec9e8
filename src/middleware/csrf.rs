use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    error::AppError,
    infrastructure::csrf::{CSRF_HEADER, validate_token},
    middleware::CurrentUser,
};

/// 校验 Cookie 会话发起的写请求携带的 CSRF 令牌
///
/// 必须挂在认证中间件之内。Bearer 令牌认证的请求不检查。
pub async fn csrf_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(request).await);
    }

    let session_id = request
        .extensions()
        .get::<CurrentUser>()
        .and_then(|c| c.session_id.as_deref());

    if let Some(session_id) = session_id {
        let token = request
            .headers()
            .get(CSRF_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default();
        if !validate_token(token, &state.config.csrf_salt, session_id) {
            tracing::warn!("CSRF token mismatch for session {}", session_id);
            return Err(AppError::Forbidden("CSRF 令牌无效".into()));
        }
    }

    Ok(next.run(request).await)
}
