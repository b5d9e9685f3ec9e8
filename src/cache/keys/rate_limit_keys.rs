/// 速率限制计数键前缀
const RATE_LIMIT_PREFIX: &str = "rate_limit:";

/// 按客户端 IP 生成速率限制键
pub fn rate_limit_key(ip: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, ip)
}
