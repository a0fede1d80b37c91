//! 请求认证门（JWT 认证中间件）
//!
//! 从 Cookie 或 Authorization 头取访问令牌，验证后加载账户并把身份
//! 显式放进请求扩展，下游 handler 通过提取器取用。只读，不改账户状态。

use crate::{
    auth::cookies::{extract_cookie, ACCESS_COOKIE_NAME},
    error::AppError,
    middleware::AppState,
    repository::UserRepository,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

/// 认证上下文（附加到请求扩展）
///
/// 凭证与会话字段在加载时即被投影掉，这里只有可公开的身份。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 CurrentUser
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// 提取访问令牌：accessToken Cookie 优先，其次 Bearer 头
pub fn extract_access_token(headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(token) = extract_cookie(headers, ACCESS_COOKIE_NAME) {
        return Ok(token);
    }

    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .ok_or(AppError::Unauthorized)
}

/// 认证中间件 - 必须认证
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_access_token(req.headers())?;

    // 验证令牌（签名、过期、kind）
    let claims = state.jwt_service.validate_access_token(&token)?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

    // 账户可能在令牌签发后被删除
    let user = UserRepository::new(state.db.clone())
        .find_by_id(&user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let current_user = CurrentUser {
        id: user.id,
        username: user.username,
        email: user.email,
        full_name: user.full_name,
        avatar_url: user.avatar_url,
    };

    // 附加到请求扩展
    req.extensions_mut().insert(current_user);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn test_extract_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer test_token_123".parse().unwrap());

        let token = extract_access_token(&headers).unwrap();
        assert_eq!(token, "test_token_123");
    }

    #[test]
    fn test_cookie_takes_precedence_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "accessToken=cookie_token".parse().unwrap());
        headers.insert("authorization", "Bearer header_token".parse().unwrap());

        let token = extract_access_token(&headers).unwrap();
        assert_eq!(token, "cookie_token");
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert!(extract_access_token(&headers).is_err());
    }

    #[test]
    fn test_extract_token_invalid_format() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "InvalidFormat".parse().unwrap());

        assert!(extract_access_token(&headers).is_err());
    }
}
