//! User repository (数据库访问层)

use crate::{
    error::AppError,
    models::user::*,
    models::video::WatchHistoryRow,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres 唯一约束冲突
const UNIQUE_VIOLATION: &str = "23505";

pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 根据用户名或邮箱查找用户（大小写不敏感）
    pub async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, AppError> {
        let normalized = identifier.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE username = $1 OR email = $1",
        )
        .bind(&normalized)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 根据 ID 查找用户
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 创建用户
    ///
    /// 用户名/邮箱唯一性由数据库约束保证，冲突原子地映射为 Conflict。
    pub async fn create(
        &self,
        req: &RegisterRequest,
        password_hash: &str,
        avatar_url: &str,
        cover_image_url: Option<&str>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, full_name, password_hash, avatar_url, cover_image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(req.username.trim().to_lowercase())
        .bind(req.email.trim().to_lowercase())
        .bind(req.full_name.trim())
        .bind(password_hash)
        .bind(avatar_url)
        .bind(cover_image_url)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                    return AppError::Conflict("Username or email already exists".to_string());
                }
            }
            AppError::Database(e)
        })?;

        Ok(user)
    }

    /// 更新资料（邮箱与昵称）
    pub async fn update_profile(
        &self,
        id: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                email = $2,
                full_name = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(req.email.trim().to_lowercase())
        .bind(req.full_name.trim())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                    return AppError::Conflict("Email already exists".to_string());
                }
            }
            AppError::Database(e)
        })?;

        Ok(user)
    }

    /// 更新密码哈希
    ///
    /// 哈希由调用方在写库前完成，这里只落盘。
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                password_hash = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 更新头像 URL
    pub async fn update_avatar_url(&self, id: Uuid, avatar_url: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET avatar_url = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(avatar_url)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 更新封面 URL
    pub async fn update_cover_image_url(
        &self,
        id: Uuid,
        cover_image_url: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET cover_image_url = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(cover_image_url)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 删除用户
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 频道主页：公开字段 + 订阅聚合
    ///
    /// 源系统用文档库的 $lookup 聚合实现，这里等价为一条带子查询的 SQL。
    pub async fn channel_profile(
        &self,
        username: &str,
        viewer_id: Uuid,
    ) -> Result<Option<ChannelProfile>, AppError> {
        let profile = sqlx::query_as::<_, ChannelProfile>(
            r#"
            SELECT
                u.id,
                u.username,
                u.full_name,
                u.avatar_url,
                u.cover_image_url,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id) AS subscriber_count,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id) AS subscribed_to_count,
                EXISTS(
                    SELECT 1 FROM subscriptions s
                    WHERE s.channel_id = u.id AND s.subscriber_id = $2
                ) AS is_subscribed
            FROM users u
            WHERE u.username = $1
            "#,
        )
        .bind(username.trim().to_lowercase())
        .bind(viewer_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    /// 观看历史，按观看时间倒序
    pub async fn watch_history(&self, user_id: Uuid) -> Result<Vec<WatchHistoryRow>, AppError> {
        let rows = sqlx::query_as::<_, WatchHistoryRow>(
            r#"
            SELECT
                v.id AS video_id,
                v.title,
                v.thumbnail_url,
                v.duration_secs,
                wh.watched_at,
                o.id AS owner_id,
                o.username AS owner_username,
                o.full_name AS owner_full_name,
                o.avatar_url AS owner_avatar_url
            FROM watch_history wh
            JOIN videos v ON v.id = wh.video_id
            JOIN users o ON o.id = v.owner_id
            WHERE wh.user_id = $1
            ORDER BY wh.watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
