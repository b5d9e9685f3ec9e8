use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

// 注册请求
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user_name: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub about: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
}

impl From<RegisterRequest> for User {
    fn from(req: RegisterRequest) -> Self {
        User {
            user_name: req.user_name,
            name: req.name,
            email: req.email,
            password: req.password,
            about: req.about,
            phone_number: req.phone_number,
            country: req.country,
            gender: req.gender,
            birthday: req.birthday,
            ..Default::default()
        }
    }
}

// 登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// 资料更新请求，未提供的字段保持不变
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub user_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub about: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
}

impl UpdateUserRequest {
    pub fn into_user(self, user_id: Uuid) -> User {
        User {
            user_id,
            user_name: self.user_name.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            about: self.about,
            phone_number: self.phone_number,
            country: self.country,
            gender: self.gender,
            birthday: self.birthday,
            ..Default::default()
        }
    }
}

// 角色更新请求
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

// 关注请求
#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    #[serde(alias = "user_id")]
    pub following_id: Uuid,
}

// 点赞请求
#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub tweet_id: i64,
}

// 按名字搜索
#[derive(Debug, Deserialize)]
pub struct FindByNameQuery {
    pub name: String,
}

// CSRF 令牌响应
#[derive(Debug, Serialize)]
pub struct CsrfTokenResponse {
    pub token: String,
}
