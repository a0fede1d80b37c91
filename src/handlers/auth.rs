//! 认证相关的 HTTP 处理器
//!
//! 令牌同时通过 Set-Cookie 与 JSON 响应体下发；刷新令牌从 Cookie
//! 或请求体读取，兼容移动端等无 Cookie 客户端。

use crate::{
    auth::cookies::{
        append_set_cookie_headers, build_access_cookie, build_refresh_cookie, clear_cookie,
        ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME,
    },
    auth::middleware::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::auth::*,
};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let response = state.session_service.login(req).await?;

    let secure = state.config.security.cookie_secure;
    let cookies = vec![
        build_access_cookie(
            &response.access_token,
            state.config.security.access_token_exp_secs,
            secure,
        ),
        build_refresh_cookie(
            &response.refresh_token,
            state.config.security.refresh_token_exp_secs,
            secure,
        ),
    ];

    let mut response = Json(response).into_response();
    append_set_cookie_headers(&mut response, &cookies)?;
    Ok(response)
}

/// 刷新令牌
///
/// Cookie 优先，其次 JSON 请求体；两者都没有则 401。
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<RefreshTokenRequest>>,
) -> Result<Response, AppError> {
    let presented = crate::auth::cookies::extract_cookie(&headers, REFRESH_COOKIE_NAME)
        .or_else(|| body.and_then(|Json(req)| req.refresh_token));

    let token_pair = state.session_service.refresh(presented).await?;

    let secure = state.config.security.cookie_secure;
    let cookies = vec![
        build_access_cookie(
            &token_pair.access_token,
            state.config.security.access_token_exp_secs,
            secure,
        ),
        build_refresh_cookie(
            &token_pair.refresh_token,
            state.config.security.refresh_token_exp_secs,
            secure,
        ),
    ];

    let mut response = Json(token_pair).into_response();
    append_set_cookie_headers(&mut response, &cookies)?;
    Ok(response)
}

/// 登出：清除存储的刷新令牌和两个 Cookie
pub async fn logout(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
) -> Result<Response, AppError> {
    state.session_service.logout(current_user.id).await?;

    let secure = state.config.security.cookie_secure;
    let cookies = vec![
        clear_cookie(ACCESS_COOKIE_NAME, secure),
        clear_cookie(REFRESH_COOKIE_NAME, secure),
    ];

    let mut response = Json(json!({"message": "Logged out successfully"})).into_response();
    append_set_cookie_headers(&mut response, &cookies)?;
    Ok(response)
}

/// 获取当前用户信息（来自访问令牌验证后加载的身份）
pub async fn get_current_user(current_user: CurrentUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(json!({
        "id": current_user.id,
        "username": current_user.username,
        "email": current_user.email,
        "full_name": current_user.full_name,
        "avatar_url": current_user.avatar_url,
    })))
}
