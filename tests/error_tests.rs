//! 错误处理单元测试
//!
//! 测试应用错误类型的各种行为

use axum::http::StatusCode;
use vidstream::error::AppError;

// ==================== 错误状态码测试 ====================

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::TokenReused.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::BadCredential.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        AppError::Conflict("username taken".to_string()).status_code(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        AppError::BadRequest("invalid".to_string()).status_code(),
        StatusCode::BAD_REQUEST
    );
}

#[test]
fn test_database_error_status_code() {
    let db_error = sqlx::Error::RowNotFound;
    let app_error = AppError::Database(db_error);
    assert_eq!(app_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_config_error_status_code() {
    let app_error = AppError::Config("Invalid config".to_string());
    assert_eq!(app_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_upstream_and_internal_status_codes() {
    assert_eq!(
        AppError::Upstream("object storage".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Internal("Something went wrong".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

// ==================== 用户消息测试 ====================

#[test]
fn test_user_messages_no_sensitive_info() {
    // 数据库错误不应该暴露技术细节
    let db_error = AppError::Database(sqlx::Error::RowNotFound);
    let message = db_error.user_message();
    assert_eq!(message, "Database error occurred");
    assert!(!message.to_lowercase().contains("sqlx"));
    assert!(!message.to_lowercase().contains("row"));

    // 配置错误
    let config_error = AppError::Config("Missing token secret".to_string());
    let message = config_error.user_message();
    assert_eq!(message, "Configuration error");
    assert!(!message.contains("secret"));

    // 上游故障不暴露端点
    let upstream = AppError::Upstream("s3 PUT https://bucket.internal failed".to_string());
    assert!(!upstream.user_message().contains("internal"));
}

#[test]
fn test_auth_failures_share_one_message() {
    // 令牌无效与令牌已轮换对客户端不可区分
    assert_eq!(AppError::Unauthorized.user_message(), "Authentication failed");
    assert_eq!(AppError::TokenReused.user_message(), "Authentication failed");

    // 密码错误有独立但同样笼统的措辞
    assert_eq!(AppError::BadCredential.user_message(), "Invalid credentials");
}

#[test]
fn test_client_error_messages_pass_through() {
    assert_eq!(
        AppError::BadRequest("Password must be at least 8 characters".to_string()).user_message(),
        "Password must be at least 8 characters"
    );
    assert_eq!(
        AppError::Conflict("Username or email already in use".to_string()).user_message(),
        "Username or email already in use"
    );
    assert_eq!(AppError::NotFound.user_message(), "Resource not found");
}

// ==================== 转换测试 ====================

#[test]
fn test_from_sqlx_error() {
    let app_error: AppError = sqlx::Error::RowNotFound.into();
    assert!(matches!(app_error, AppError::Database(_)));
}

#[test]
fn test_from_string_is_config() {
    let app_error: AppError = "missing key".to_string().into();
    assert!(matches!(app_error, AppError::Config(_)));
}

#[test]
fn test_from_validation_errors_is_bad_request() {
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3))]
        name: String,
    }

    let probe = Probe { name: "ab".to_string() };
    let err = probe.validate().unwrap_err();
    let app_error: AppError = err.into();
    assert_eq!(app_error.status_code(), StatusCode::BAD_REQUEST);
}
