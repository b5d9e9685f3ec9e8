use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::check_len;
use crate::utils::pagination::PageInfo;

/// 推文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct Tweet {
    pub id: i64,
    pub user_id: Uuid,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[sqlx(default)]
    pub likes: i64,
    #[sqlx(default)]
    pub replys: i64,
    pub created_at: DateTime<Utc>,
}

impl Tweet {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.text.trim().is_empty() {
            return Err(AppError::bad_request("推文内容不能为空"));
        }
        check_len("text", Some(&self.text), 260)?;
        check_len("image", self.image.as_deref(), 512)
    }
}

/// 带作者信息的推文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TweetWithUser {
    pub id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_name: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub likes: i64,
    pub replys: i64,
    pub already_liked: bool,
}

/// 推文分页列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetsList {
    #[serde(flatten)]
    pub info: PageInfo,
    pub tweets: Vec<TweetWithUser>,
}
