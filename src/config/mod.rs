use std::env;
use std::time::Duration;

use thiserror::Error;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable `{0}`")]
    Missing(&'static str),
    #[error("invalid value for `{name}`: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub session_name: String,
    pub session_expire_secs: u64,
    pub cookie_secure: bool,
    pub csrf_salt: String,
    pub cache_ttl_secs: u64,
    pub upload_dir: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let jwt_expiration = parse_or("JWT_EXPIRATION", 24u64, |v| {
            v.trim_end_matches('h').parse().ok()
        })?;

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: parse_or("SERVER_PORT", 3000, |v| v.parse().ok())?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10, |v| v.parse().ok())?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration * 3600,
            session_name: env::var("SESSION_NAME").unwrap_or_else(|_| "session-id".into()),
            session_expire_secs: parse_or("SESSION_EXPIRE", 86400, |v| v.parse().ok())?,
            cookie_secure: parse_or("COOKIE_SECURE", false, |v| v.parse().ok())?,
            csrf_salt: required("CSRF_SALT")?,
            cache_ttl_secs: parse_or("CACHE_TTL_SECS", 3600, |v| v.parse().ok())?,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
            rate_limit_window_secs: parse_or("RATE_LIMIT_WINDOW", 60, |v| v.parse().ok())?,
            rate_limit_requests: parse_or("RATE_LIMIT_REQUESTS", 100, |v| v.parse().ok())?,
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

/// 读取可选变量；未设置时使用默认值，设置了但无法解析时报错
fn parse_or<T>(
    name: &'static str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => parse(value.trim()).ok_or(ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/test".into(),
            redis_url: "redis://127.0.0.1/".into(),
            server_host: "127.0.0.1".into(),
            server_port: 0,
            db_max_connections: 1,
            jwt_secret: "test-secret".into(),
            jwt_expiration_secs: 3600,
            session_name: "session-id".into(),
            session_expire_secs: 600,
            cookie_secure: false,
            csrf_salt: "test-salt".into(),
            cache_ttl_secs: 3600,
            upload_dir: std::env::temp_dir().to_string_lossy().into_owned(),
            rate_limit_window_secs: 60,
            rate_limit_requests: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_to_default_when_unset() {
        let value = parse_or("TWITTER_BACKEND_UNSET_VARIABLE", 42u64, |v| v.parse().ok());
        assert_eq!(value.unwrap(), 42);
    }

    #[test]
    fn missing_required_variable_is_reported_by_name() {
        let err = required("TWITTER_BACKEND_UNSET_REQUIRED").unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing environment variable `TWITTER_BACKEND_UNSET_REQUIRED`"
        );
    }

    #[test]
    fn durations_follow_configured_seconds() {
        let config = Config::for_tests();
        assert_eq!(config.jwt_expiration(), Duration::from_secs(3600));
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
    }
}
