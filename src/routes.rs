//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::HeaderValue,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::{handlers, middleware::AppState};

/// 请求体上限（图片上传走 multipart）
const BODY_LIMIT_BYTES: usize = 8 * 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查与指标）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics_export));

    // 认证路由（无需访问令牌）
    // refresh-token 靠刷新令牌自证，不经过认证门
    let auth_routes = Router::new()
        .route("/api/v1/users/register", post(handlers::user::register))
        .route("/api/v1/users/login", post(handlers::auth::login))
        .route("/api/v1/users/refresh-token", post(handlers::auth::refresh_token));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        .route("/api/v1/users/logout", post(handlers::auth::logout))
        .route("/api/v1/users/current-user", get(handlers::auth::get_current_user))
        .route("/api/v1/users/change-password", post(handlers::user::change_password))
        .route("/api/v1/users/update-details", patch(handlers::user::update_profile))
        .route("/api/v1/users/update-avatar", patch(handlers::user::update_avatar))
        .route("/api/v1/users/update-cover", patch(handlers::user::update_cover))
        .route("/api/v1/users/c/{username}", get(handlers::user::get_channel_profile))
        .route("/api/v1/users/watch-history", get(handlers::user::get_watch_history))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::middleware::require_auth,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .layer(cors_layer(&state))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

/// CORS：配置了来源则携带凭证放行该来源，否则不放行跨域
fn cors_layer(state: &AppState) -> CorsLayer {
    match state
        .config
        .server
        .cors_origin
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request()),
        None => CorsLayer::new(),
    }
}
