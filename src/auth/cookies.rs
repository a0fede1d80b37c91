//! 认证 Cookie 的构造与解析
//! 令牌同时下发为 HttpOnly Cookie 和 JSON 响应体，兼容无 Cookie 客户端

use crate::error::AppError;
use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue, Response};

pub const ACCESS_COOKIE_NAME: &str = "accessToken";
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// 构造认证 Cookie 字符串
fn build_cookie(name: &str, value: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn build_access_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    build_cookie(ACCESS_COOKIE_NAME, token, max_age_secs, secure)
}

pub fn build_refresh_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    build_cookie(REFRESH_COOKIE_NAME, token, max_age_secs, secure)
}

/// 清除 Cookie（Max-Age=0）
pub fn clear_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", 0, secure)
}

/// 将一组 Set-Cookie 附加到响应头
pub fn append_set_cookie_headers<B>(
    response: &mut Response<B>,
    cookies: &[String],
) -> Result<(), AppError> {
    for cookie in cookies {
        let value = HeaderValue::from_str(cookie)
            .map_err(|e| AppError::Internal(format!("Invalid cookie header: {}", e)))?;
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(())
}

/// 从请求的 Cookie 头中提取指定名称的值
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;

    raw.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        if k == name && !v.is_empty() {
            Some(v.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn test_build_cookie_flags() {
        let cookie = build_access_cookie("tok123", 900, true);
        assert!(cookie.starts_with("accessToken=tok123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=900"));

        let insecure = build_refresh_cookie("tok456", 3600, false);
        assert!(!insecure.contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_cookie(ACCESS_COOKIE_NAME, true);
        assert!(cookie.starts_with("accessToken=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            "accessToken=abc.def.ghi; refreshToken=jkl.mno.pqr".parse().unwrap(),
        );

        assert_eq!(
            extract_cookie(&headers, ACCESS_COOKIE_NAME).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(
            extract_cookie(&headers, REFRESH_COOKIE_NAME).as_deref(),
            Some("jkl.mno.pqr")
        );
        assert!(extract_cookie(&headers, "sessionId").is_none());
    }

    #[test]
    fn test_extract_cookie_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "accessToken=".parse().unwrap());

        assert!(extract_cookie(&headers, ACCESS_COOKIE_NAME).is_none());
    }
}
