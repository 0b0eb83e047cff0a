use crate::helpers::time::now_millis;

/// An auth token and the instant (epoch millis) it stops being valid.
///
/// Never mutated: a renewal produces a new `Token` that replaces the cached one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    auth_token: String,
    expires_at_millis: i64,
}

impl Token {
    pub fn new(auth_token: String, expires_at_millis: i64) -> Self {
        Self { auth_token, expires_at_millis }
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn expires_at_millis(&self) -> i64 {
        self.expires_at_millis
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at_millis <= now_millis()
    }
}
