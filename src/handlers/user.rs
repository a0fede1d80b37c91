//! 用户管理的 HTTP 处理器
//! 注册（multipart）、资料与头像更新、频道主页、观看历史

use crate::{
    auth::middleware::CurrentUser,
    auth::password::PasswordHasher,
    error::AppError,
    middleware::AppState,
    models::user::*,
    models::video::WatchHistoryEntry,
    repository::UserRepository,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// 注册表单的 multipart 解析结果
struct RegisterForm {
    username: Option<String>,
    email: Option<String>,
    full_name: Option<String>,
    password: Option<String>,
    avatar: Option<(Vec<u8>, String)>,
    cover_image: Option<(Vec<u8>, String)>,
}

/// 解析 multipart 注册表单
async fn parse_register_form(mut multipart: Multipart) -> Result<RegisterForm, AppError> {
    let mut form = RegisterForm {
        username: None,
        email: None,
        full_name: None,
        password: None,
        avatar: None,
        cover_image: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "username" => form.username = Some(read_text(field).await?),
            "email" => form.email = Some(read_text(field).await?),
            "fullName" => form.full_name = Some(read_text(field).await?),
            "password" => form.password = Some(read_text(field).await?),
            "avatar" => form.avatar = Some(read_image(field).await?),
            "coverImage" => form.cover_image = Some(read_image(field).await?),
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid field value: {}", e)))
}

async fn read_image(
    field: axum::extract::multipart::Field<'_>,
) -> Result<(Vec<u8>, String), AppError> {
    let content_type = field
        .content_type()
        .ok_or_else(|| AppError::BadRequest("Image content type is required".to_string()))?
        .to_string();

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Image file is empty".to_string()));
    }

    Ok((bytes.to_vec(), content_type))
}

/// 注册用户
///
/// 哈希在任何写库之前同步完成，每个明文只哈希一次。
pub async fn register(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = parse_register_form(multipart).await?;

    let req = RegisterRequest {
        username: form
            .username
            .ok_or_else(|| AppError::BadRequest("All fields are required".to_string()))?,
        email: form
            .email
            .ok_or_else(|| AppError::BadRequest("All fields are required".to_string()))?,
        full_name: form
            .full_name
            .ok_or_else(|| AppError::BadRequest("All fields are required".to_string()))?,
        password: form
            .password
            .ok_or_else(|| AppError::BadRequest("All fields are required".to_string()))?,
    };
    req.validate()?;

    if req.password.len() < state.config.security.password_min_length {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            state.config.security.password_min_length
        )));
    }

    let repo = UserRepository::new(state.db.clone());

    // 先查重：冲突的注册不应先把图片写进对象存储变成孤儿。
    // 并发窗口内的最终裁决仍是数据库唯一约束。
    if repo
        .find_by_username_or_email(&req.username)
        .await?
        .is_some()
        || repo.find_by_username_or_email(&req.email).await?.is_some()
    {
        return Err(AppError::Conflict("Username or email already exists".to_string()));
    }

    // 头像必填，封面可选
    let (avatar_bytes, avatar_type) = form
        .avatar
        .ok_or_else(|| AppError::BadRequest("Avatar is required".to_string()))?;

    let avatar_url = state
        .storage
        .upload_image(&avatar_bytes, &avatar_type, "avatars")
        .await?;

    let cover_image_url = match form.cover_image {
        Some((bytes, content_type)) => Some(
            state
                .storage
                .upload_image(&bytes, &content_type, "covers")
                .await?,
        ),
        None => None,
    };

    let hasher = PasswordHasher::new();
    let password_hash = hasher.hash(&req.password)?;

    let user = repo
        .create(&req, &password_hash, &avatar_url, cover_image_url.as_deref())
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": UserResponse::from(user)
        })),
    ))
}

/// 修改密码
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .session_service
        .change_password(current_user.id, req)
        .await?;

    Ok(Json(json!({
        "message": "Password changed successfully"
    })))
}

/// 更新资料（邮箱与昵称）
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .update_profile(current_user.id, &req)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": UserResponse::from(user)
    })))
}

/// 更新头像
pub async fn update_avatar(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (bytes, content_type) = single_image_field(multipart, "avatar").await?;

    let avatar_url = state
        .storage
        .upload_image(&bytes, &content_type, "avatars")
        .await?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .update_avatar_url(current_user.id, &avatar_url)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(json!({
        "message": "Avatar updated successfully",
        "user": UserResponse::from(user)
    })))
}

/// 更新封面
pub async fn update_cover(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (bytes, content_type) = single_image_field(multipart, "coverImage").await?;

    let cover_url = state
        .storage
        .upload_image(&bytes, &content_type, "covers")
        .await?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .update_cover_image_url(current_user.id, &cover_url)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(json!({
        "message": "Cover image updated successfully",
        "user": UserResponse::from(user)
    })))
}

/// 从 multipart 中取出指定名称的单个图片字段
async fn single_image_field(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<(Vec<u8>, String), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(field_name) {
            return read_image(field).await;
        }
    }

    Err(AppError::BadRequest(format!("{} file is required", field_name)))
}

/// 频道主页：公开资料 + 订阅数
pub async fn get_channel_profile(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if username.trim().is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }

    let repo = UserRepository::new(state.db.clone());
    let profile = repo
        .channel_profile(&username, current_user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(profile))
}

/// 观看历史
pub async fn get_watch_history(
    State(state): State<Arc<AppState>>,
    current_user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let repo = UserRepository::new(state.db.clone());
    let entries: Vec<WatchHistoryEntry> = repo
        .watch_history(current_user.id)
        .await?
        .into_iter()
        .map(WatchHistoryEntry::from)
        .collect();

    let count = entries.len();
    Ok(Json(json!({
        "watch_history": entries,
        "count": count
    })))
}
