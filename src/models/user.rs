use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;
use crate::utils::pagination::PageInfo;
use crate::utils::{hash_password, verify_password};

/// 用户
///
/// `followers`、`following`、`is_following` 由查询按观察者计算，
/// 不是 `users` 表中的列。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct User {
    pub user_id: Uuid,
    pub user_name: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    #[sqlx(default)]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[sqlx(default)]
    pub followers: Option<i64>,
    #[sqlx(default)]
    pub following: Option<i64>,
    #[sqlx(default)]
    pub is_following: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub login_date: DateTime<Utc>,
}

impl User {
    pub fn hash_password(&mut self) -> Result<(), AppError> {
        self.password = hash_password(&self.password)?;
        Ok(())
    }

    pub fn compare_passwords(&self, password: &str) -> Result<bool, AppError> {
        if self.password.is_empty() {
            return Ok(false);
        }
        Ok(verify_password(password, &self.password)?)
    }

    pub fn sanitize_password(&mut self) {
        self.password.clear();
    }

    /// 清空关系字段，它们单独缓存
    pub fn sanitize_follow(&mut self) {
        self.followers = None;
        self.following = None;
        self.is_following = None;
    }

    /// 注册前的规范化与校验，会把密码替换为哈希
    pub fn prepare_create(&mut self) -> Result<(), AppError> {
        self.email = self.email.trim().to_lowercase();
        self.password = self.password.trim().to_string();
        self.normalize_optional_fields();

        if self.user_name.trim().is_empty() || self.name.trim().is_empty() {
            return Err(AppError::bad_request("用户名和昵称不能为空"));
        }
        if self.email.is_empty() || !self.email.contains('@') {
            return Err(AppError::bad_request("邮箱格式无效"));
        }
        if self.password.chars().count() < 6 {
            return Err(AppError::bad_request("密码长度至少为 6 位"));
        }
        self.validate_lengths()?;

        self.hash_password()
    }

    /// 更新前的规范化与校验
    pub fn prepare_update(&mut self) -> Result<(), AppError> {
        self.email = self.email.trim().to_lowercase();
        self.normalize_optional_fields();

        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(AppError::bad_request("邮箱格式无效"));
        }
        self.validate_lengths()
    }

    fn normalize_optional_fields(&mut self) {
        if let Some(phone) = self.phone_number.as_mut() {
            *phone = phone.trim().to_string();
        }
        if let Some(role) = self.role.as_mut() {
            *role = role.trim().to_lowercase();
        }
    }

    fn validate_lengths(&self) -> Result<(), AppError> {
        check_len("user_name", Some(&self.user_name), 32)?;
        check_len("name", Some(&self.name), 32)?;
        check_len("email", Some(&self.email), 64)?;
        check_len("role", self.role.as_deref(), 10)?;
        check_len("about", self.about.as_deref(), 160)?;
        check_len("avatar", self.avatar.as_deref(), 512)?;
        check_len("header", self.header.as_deref(), 512)?;
        check_len("phone_number", self.phone_number.as_deref(), 20)?;
        check_len("country", self.country.as_deref(), 20)?;
        check_len("gender", self.gender.as_deref(), 10)
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

pub(crate) fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
    match value {
        Some(v) if v.chars().count() > max => Err(AppError::bad_request(format!(
            "{field} 长度不能超过 {max}"
        ))),
        _ => Ok(()),
    }
}

/// 用户及其令牌
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithToken {
    pub user: User,
    pub token: String,
}

/// 用户分页列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersList {
    #[serde(flatten)]
    pub info: PageInfo,
    pub users: Vec<User>,
}
