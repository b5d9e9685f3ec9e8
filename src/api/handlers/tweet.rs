use axum::{
    extract::{Extension, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    api::{
        handlers::{UploadForm, read_upload_form},
        schema::{EmptyResponse, TweetsFilter},
    },
    error::AppError,
    middleware::CurrentUser,
    models::Tweet,
    utils::{
        pagination::{PaginationParams, PaginationQuery},
        success_to_api_response,
    },
};

/// 把表单转成推文：先校验文本，通过后才保存图片
async fn tweet_from_form(state: &AppState, form: UploadForm) -> Result<Tweet, AppError> {
    let mut tweet = Tweet {
        text: form.text.unwrap_or_default(),
        ..Default::default()
    };
    tweet.validate()?;

    if let Some(upload) = form.file {
        tweet.image = Some(state.files.put_image(&upload.file_name, &upload.bytes).await?);
    }
    Ok(tweet)
}

/// 推文写入失败时删除已保存的图片
async fn discard_image<T>(state: &AppState, image: Option<String>, result: Result<T, AppError>) -> Result<T, AppError> {
    if result.is_err() {
        if let Some(url) = image {
            state.files.remove_object(&url).await;
        }
    }
    result
}

/// 发布推文（multipart：`text` 和可选的 `image`）
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(multipart).await?;
    let tweet = tweet_from_form(&state, form).await?;
    let image = tweet.image.clone();

    let result = state.tweets.create(current.user.user_id, tweet).await;
    let created = discard_image(&state, image, result).await?;

    Ok((StatusCode::CREATED, success_to_api_response(created)))
}

pub async fn create_reply(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(tweet_id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(multipart).await?;
    let tweet = tweet_from_form(&state, form).await?;
    let image = tweet.image.clone();

    let result = state
        .tweets
        .create_reply(current.user.user_id, tweet_id, tweet)
        .await;
    let reply = discard_image(&state, image, result).await?;

    Ok((StatusCode::CREATED, success_to_api_response(reply)))
}

/// 推文列表，带 `userID` 时只返回该用户的推文
pub async fn get_tweets(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(filter): Query<TweetsFilter>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let pq = PaginationQuery::from_params(&params)?;
    let viewer_id = current.user.user_id;

    let tweets = match filter.user_id {
        Some(user_id) => state.tweets.get_tweets_by_user_id(viewer_id, user_id, &pq).await?,
        None => state.tweets.get_tweets(viewer_id, &pq).await?,
    };
    Ok(success_to_api_response(tweets))
}

pub async fn get_tweet_by_id(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(tweet_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let tweet = state
        .tweets
        .get_tweet_by_id(current.user.user_id, tweet_id)
        .await?;
    Ok(success_to_api_response(tweet))
}

pub async fn get_reply_tweets(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(tweet_id): Path<i64>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let pq = PaginationQuery::from_params(&params)?;
    let replies = state
        .tweets
        .get_reply_tweets(current.user.user_id, tweet_id, &pq)
        .await?;
    Ok(success_to_api_response(replies))
}

pub async fn get_liked_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(tweet_id): Path<i64>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let pq = PaginationQuery::from_params(&params)?;
    let users = state
        .likes
        .get_liked_users(current.user.user_id, tweet_id, &pq)
        .await?;
    Ok(success_to_api_response(users))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(tweet_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.tweets.delete(current.user.user_id, tweet_id).await?;
    Ok(success_to_api_response(EmptyResponse::default()))
}
