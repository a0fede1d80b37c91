//! Authentication-related models

use serde::{Deserialize, Serialize};

/// Login request: username-or-email based
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

impl LoginRequest {
    /// 登录标识：用户名优先，其次邮箱
    pub fn identifier(&self) -> Option<&str> {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: super::user::UserResponse,
}

/// Token refresh request (body fallback for cookie-less clients)
#[derive(Debug, Default, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_prefers_username() {
        let req = LoginRequest {
            username: Some("alice".to_string()),
            email: Some("a@x.com".to_string()),
            password: "pw".to_string(),
        };
        assert_eq!(req.identifier(), Some("alice"));
    }

    #[test]
    fn test_identifier_falls_back_to_email() {
        let req = LoginRequest {
            username: None,
            email: Some(" a@x.com ".to_string()),
            password: "pw".to_string(),
        };
        assert_eq!(req.identifier(), Some("a@x.com"));
    }

    #[test]
    fn test_identifier_missing() {
        let req = LoginRequest {
            username: Some("   ".to_string()),
            email: None,
            password: "pw".to_string(),
        };
        assert_eq!(req.identifier(), None);
    }
}
