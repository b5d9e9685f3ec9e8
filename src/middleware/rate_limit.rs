use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    cache::{KeyValueStore, keys::rate_limit_key},
    config::Config,
    utils::{error_codes, error_to_api_response},
};

/// 按客户端 IP 的固定窗口限流
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    config: Arc<Config>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, config: Arc<Config>) -> Self {
        Self { store, config }
    }

    pub async fn check_rate_limit(self: Arc<Self>, req: Request<Body>, next: Next) -> Response {
        let ip = client_ip(&req);
        let window = self.config.rate_limit_window().as_secs();

        let count = match self.store.incr_window(&rate_limit_key(&ip), window).await {
            Ok(count) => count,
            Err(e) => {
                // 限流存储不可用时放行
                tracing::warn!("Rate limiter unavailable, letting request through: {}", e);
                return next.run(req).await;
            }
        };

        if count > u64::from(self.config.rate_limit_requests) {
            tracing::info!("Rate limit exceeded for {}", ip);
            return (
                StatusCode::TOO_MANY_REQUESTS,
                error_to_api_response::<()>(
                    error_codes::RATE_LIMIT,
                    format!("请求过于频繁，请在{}秒后重试", window),
                ),
            )
                .into_response();
        }

        next.run(req).await
    }
}

/// 依次取 `x-real-ip`、`x-forwarded-for` 的第一个地址、连接地址
fn client_ip(req: &Request<Body>) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    limiter.check_rate_limit(req, next).await
}
