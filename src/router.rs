use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderName,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    AppState,
    api::{
        handlers::{health, tweet, user},
        operations::file::UPLOADS_PATH,
    },
    infrastructure::csrf::CSRF_HEADER,
    middleware::{RateLimiter, auth_middleware, csrf_middleware, log_errors, rate_limit},
};

/// 请求体上限（3 MiB），覆盖图片上传
pub const BODY_LIMIT: usize = 3 * 1024 * 1024;

/// 构建完整路由：`/api/v1` 下的接口和 `/uploads` 静态文件
pub fn create_router(state: AppState) -> Router {
    let rate_limiter = Arc::new(RateLimiter::new(state.store.clone(), state.config.clone()));

    // 公开路由
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/users/register", post(user::register))
        .route("/users/login", post(user::login))
        .route("/users/logout", post(user::logout));

    // 需要会话的路由；写请求还要校验 CSRF
    let protected_routes = Router::new()
        .route("/users", get(user::get_users))
        .route("/users/me", get(user::get_me))
        .route("/users/token", get(user::get_csrf_token))
        .route("/users/by", get(user::find_by_name))
        .route("/users/username/{user_name}", get(user::get_user_by_user_name))
        .route(
            "/users/{user_id}",
            get(user::get_user_by_id)
                .patch(user::update)
                .delete(user::delete),
        )
        .route("/users/{user_id}/role", patch(user::update_role))
        .route("/users/{user_id}/avatar", post(user::upload_avatar))
        .route("/users/{user_id}/header", post(user::upload_header))
        .route("/users/{user_id}/followers", get(user::get_followers))
        .route(
            "/users/{user_id}/following",
            get(user::get_following).post(user::follow),
        )
        .route(
            "/users/{user_id}/following/{following_id}",
            delete(user::delete_following),
        )
        .route("/users/{user_id}/tweets", get(user::get_tweets_by_user_id))
        .route("/users/{user_id}/liked_tweets", get(user::get_liked_tweets))
        .route("/users/{user_id}/liked", post(user::like))
        .route(
            "/users/{user_id}/liked/{tweet_id}",
            delete(user::delete_liked),
        )
        .route("/tweets", get(tweet::get_tweets).post(tweet::create))
        .route(
            "/tweets/{tweet_id}",
            get(tweet::get_tweet_by_id).delete(tweet::delete),
        )
        .route("/tweets/{tweet_id}/reply", post(tweet::create_reply))
        .route("/tweets/{tweet_id}/replys", get(tweet::get_reply_tweets))
        .route("/tweets/{tweet_id}/liking_users", get(tweet::get_liked_users))
        // 后加的层先执行：先认证，再校验 CSRF
        .layer(from_fn_with_state(state.clone(), csrf_middleware))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(CSRF_HEADER)]);

    Router::new()
        .nest(
            "/api/v1",
            Router::new().merge(public_routes).merge(protected_routes),
        )
        .nest_service(UPLOADS_PATH, ServeDir::new(&state.config.upload_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(from_fn(log_errors))
        .layer(from_fn_with_state(rate_limiter, rate_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
