use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// CSRF 令牌所在的请求/响应头
pub const CSRF_HEADER: &str = "x-csrf-token";

/// 由会话 ID 派生 CSRF 令牌：hex(sha256(salt + sid))
pub fn make_token(salt: &str, session_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(session_id.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// 常量时间比较令牌
pub fn validate_token(token: &str, salt: &str, session_id: &str) -> bool {
    let expected = make_token(salt, session_id);
    !token.is_empty() && bool::from(expected.as_bytes().ct_eq(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_bound_to_session() {
        let token = make_token("salt", "sid-1");
        assert_eq!(token.len(), 64);
        assert!(validate_token(&token, "salt", "sid-1"));
        assert!(!validate_token(&token, "salt", "sid-2"));
        assert!(!validate_token("", "salt", "sid-1"));
    }

    #[test]
    fn rejects_prefix_and_single_byte_changes() {
        let token = make_token("salt", "sid-1");
        assert!(!validate_token(&token[..63], "salt", "sid-1"));
        assert!(!validate_token(&format!("{token}0"), "salt", "sid-1"));

        let mut flipped = token.clone().into_bytes();
        flipped[10] = if flipped[10] == b'a' { b'b' } else { b'a' };
        let flipped = String::from_utf8(flipped).unwrap();
        assert!(!validate_token(&flipped, "salt", "sid-1"));
    }
}
