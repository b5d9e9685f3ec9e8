use axum::{
    extract::{Extension, Json, Multipart, Path, Query, State},
    http::{HeaderName, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::{
    AppState,
    api::{
        handlers::{ensure_admin, ensure_owner, read_upload_form},
        schema::{
            CsrfTokenResponse, EmptyResponse, FindByNameQuery, FollowRequest, LikeRequest,
            LoginRequest, RegisterRequest, UpdateRoleRequest, UpdateUserRequest,
        },
    },
    error::AppError,
    infrastructure::csrf::{CSRF_HEADER, make_token},
    middleware::CurrentUser,
    models::User,
    utils::{
        pagination::{PaginationParams, PaginationQuery},
        success_to_api_response,
    },
};

/// 创建会话并写入会话 Cookie
async fn start_session(state: &AppState, jar: CookieJar, user_id: Uuid) -> Result<CookieJar, AppError> {
    let session_id = state.sessions.create_session(user_id).await?;
    let cookie = Cookie::build((state.config.session_name.clone(), session_id))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax);
    Ok(jar.add(cookie))
}

/// 注册新用户
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.users.register(User::from(req)).await?;
    let jar = start_session(&state, jar, created.user.user_id).await?;

    Ok((StatusCode::CREATED, jar, success_to_api_response(created)))
}

/// 邮箱密码登录
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let logged_in = state.users.login(&req.email, &req.password).await?;
    let jar = start_session(&state, jar, logged_in.user.user_id).await?;

    Ok((jar, success_to_api_response(logged_in)))
}

/// 注销当前会话
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    let session_id = jar
        .get(&state.config.session_name)
        .map(|c| c.value().to_owned())
        .ok_or(AppError::Unauthorized)?;

    state.sessions.delete_by_id(&session_id).await?;
    let jar = jar.remove(Cookie::build((state.config.session_name.clone(), "")).path("/"));

    Ok((jar, success_to_api_response(EmptyResponse::default())))
}

pub async fn get_me(Extension(current): Extension<CurrentUser>) -> impl IntoResponse {
    success_to_api_response(current.user)
}

/// 返回当前会话的 CSRF 令牌（响应头和响应体各一份）
pub async fn get_csrf_token(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = current
        .session_id
        .ok_or_else(|| AppError::bad_request("令牌认证的请求不需要 CSRF 令牌"))?;
    let token = make_token(&state.config.csrf_salt, &session_id);

    Ok((
        [(HeaderName::from_static(CSRF_HEADER), token.clone())],
        success_to_api_response(CsrfTokenResponse { token }),
    ))
}

pub async fn get_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let pq = PaginationQuery::from_params(&params)?;
    let users = state.users.get_users(current.user.user_id, &pq).await?;
    Ok(success_to_api_response(users))
}

pub async fn find_by_name(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<FindByNameQuery>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let pq = PaginationQuery::from_params(&params)?;
    let users = state
        .users
        .find_by_name(current.user.user_id, query.name.trim(), &pq)
        .await?;
    Ok(success_to_api_response(users))
}

/// 查看用户资料，缓存优先
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.get_profile(current.user.user_id, user_id).await?;
    Ok(success_to_api_response(user))
}

pub async fn get_user_by_user_name(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .get_by_user_name(current.user.user_id, &user_name)
        .await?;
    Ok(success_to_api_response(user))
}

pub async fn get_followers(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let pq = PaginationQuery::from_params(&params)?;
    let users = state
        .follows
        .get_followers(current.user.user_id, user_id, &pq)
        .await?;
    Ok(success_to_api_response(users))
}

pub async fn get_following(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let pq = PaginationQuery::from_params(&params)?;
    let users = state
        .follows
        .get_following(current.user.user_id, user_id, &pq)
        .await?;
    Ok(success_to_api_response(users))
}

pub async fn get_tweets_by_user_id(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let pq = PaginationQuery::from_params(&params)?;
    let tweets = state
        .tweets
        .get_tweets_by_user_id(current.user.user_id, user_id, &pq)
        .await?;
    Ok(success_to_api_response(tweets))
}

pub async fn get_liked_tweets(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let pq = PaginationQuery::from_params(&params)?;
    let tweets = state
        .likes
        .get_liked_tweets(current.user.user_id, user_id, &pq)
        .await?;
    Ok(success_to_api_response(tweets))
}

/// 头像或背景图
#[derive(Clone, Copy)]
enum ProfileImage {
    Avatar,
    Header,
}

async fn upload_profile_image(
    state: AppState,
    current: CurrentUser,
    user_id: Uuid,
    multipart: Multipart,
    kind: ProfileImage,
) -> Result<User, AppError> {
    ensure_owner(&current, user_id)?;

    let upload = read_upload_form(multipart)
        .await?
        .file
        .ok_or_else(|| AppError::bad_request("缺少上传文件"))?;
    let url = state.files.put_image(&upload.file_name, &upload.bytes).await?;

    let old = match kind {
        ProfileImage::Avatar => current.user.avatar.clone(),
        ProfileImage::Header => current.user.header.clone(),
    };
    if let Some(old) = old {
        state.files.remove_object(&old).await;
    }

    let mut patch = User {
        user_id,
        ..Default::default()
    };
    match kind {
        ProfileImage::Avatar => patch.avatar = Some(url),
        ProfileImage::Header => patch.header = Some(url),
    }
    state.users.update(patch).await
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let user = upload_profile_image(state, current, user_id, multipart, ProfileImage::Avatar).await?;
    Ok(success_to_api_response(user))
}

pub async fn upload_header(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let user = upload_profile_image(state, current, user_id, multipart, ProfileImage::Header).await?;
    Ok(success_to_api_response(user))
}

pub async fn follow(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<FollowRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&current, user_id)?;
    state.follows.follow(user_id, req.following_id).await?;
    Ok((StatusCode::CREATED, success_to_api_response(EmptyResponse::default())))
}

pub async fn delete_following(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((user_id, following_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&current, user_id)?;
    state.follows.delete(user_id, following_id).await?;
    Ok(success_to_api_response(EmptyResponse::default()))
}

pub async fn like(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<LikeRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&current, user_id)?;
    state.likes.like(user_id, req.tweet_id).await?;
    Ok((StatusCode::CREATED, success_to_api_response(EmptyResponse::default())))
}

pub async fn delete_liked(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((user_id, tweet_id)): Path<(Uuid, i64)>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&current, user_id)?;
    state.likes.delete(user_id, tweet_id).await?;
    Ok(success_to_api_response(EmptyResponse::default()))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_owner(&current, user_id)?;
    let updated = state.users.update(req.into_user(user_id)).await?;
    Ok(success_to_api_response(updated))
}

pub async fn update_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_admin(&current)?;
    let updated = state
        .users
        .update_role(User {
            user_id,
            role: Some(req.role),
            ..Default::default()
        })
        .await?;
    Ok(success_to_api_response(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ensure_admin(&current)?;
    state.users.delete(user_id).await?;
    Ok(success_to_api_response(EmptyResponse::default()))
}
