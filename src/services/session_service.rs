//! 会话服务：登录、登出、令牌刷新、改密
//!
//! 每账户会话的状态机：Anonymous → Authenticated →（logout）Anonymous，
//! 或（refresh）Authenticated′。所有会话状态都在数据库里，进程内无共享可变状态。

use crate::{
    auth::jwt::{JwtService, TokenPair},
    auth::password::PasswordHasher,
    config::AppConfig,
    error::AppError,
    models::auth::*,
    models::user::*,
    repository::{SessionStore, UserRepository},
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub struct SessionService {
    db: PgPool,
    jwt_service: Arc<JwtService>,
    config: Arc<AppConfig>,
}

impl SessionService {
    pub fn new(db: PgPool, jwt_service: Arc<JwtService>, config: Arc<AppConfig>) -> Self {
        Self {
            db,
            jwt_service,
            config,
        }
    }

    /// 用户登录
    ///
    /// 登录同样是轮换点：无条件覆盖任何既有刷新令牌。
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let identifier = req
            .identifier()
            .ok_or_else(|| AppError::BadRequest("Email or username is required".to_string()))?;

        let user_repo = UserRepository::new(self.db.clone());

        // 获取用户：未知账户与密码错误保持可区分（404 vs 401），不再细分
        let user: User = user_repo
            .find_by_username_or_email(identifier)
            .await?
            .ok_or(AppError::NotFound)?;

        // 验证密码
        let hasher = PasswordHasher::new();
        if !hasher.verify(&req.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login failed: password mismatch");
            return Err(AppError::BadCredential);
        }

        // 生成令牌对并持久化刷新令牌摘要
        let token_pair = self
            .jwt_service
            .issue_token_pair(&user.id, &user.username, &user.email)?;

        let session_store = SessionStore::new(self.db.clone());
        session_store
            .store(user.id, &SessionStore::digest(&token_pair.refresh_token))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            access_token: token_pair.access_token,
            refresh_token: token_pair.refresh_token,
            expires_in: token_pair.expires_in,
            user: UserResponse::from(user),
        })
    }

    /// 登出：无条件清除存储的刷新令牌，幂等
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AppError> {
        let session_store = SessionStore::new(self.db.clone());
        session_store.clear(user_id).await?;

        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// 刷新令牌：验证、比较并轮换
    pub async fn refresh(&self, presented: Option<String>) -> Result<TokenPair, AppError> {
        let presented = presented.ok_or(AppError::Unauthorized)?;

        // 签名与过期检查（kind = refresh）
        let claims = self.jwt_service.validate_refresh_token(&presented)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

        // 账户可能在令牌签发后被删除
        let user_repo = UserRepository::new(self.db.clone());
        let user: User = user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // 先签发，再原子地 compare-and-swap；CAS 落败则不产出任何可用凭证
        let new_pair = self
            .jwt_service
            .issue_token_pair(&user.id, &user.username, &user.email)?;

        let session_store = SessionStore::new(self.db.clone());
        let rotated = session_store
            .rotate(
                user.id,
                &SessionStore::digest(&presented),
                &SessionStore::digest(&new_pair.refresh_token),
            )
            .await?;

        if !rotated {
            // 已被轮换或撤销的令牌被重放（两个客户端竞争同一刷新令牌）
            tracing::warn!(user_id = %user.id, "Stale refresh token presented");
            return Err(AppError::TokenReused);
        }

        tracing::debug!(user_id = %user.id, "Refresh token rotated");
        Ok(new_pair)
    }

    /// 修改密码：校验旧密码后重新哈希一次，落盘前哈希必定已完成
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        if req.new_password.len() < self.config.security.password_min_length {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                self.config.security.password_min_length
            )));
        }

        let user_repo = UserRepository::new(self.db.clone());
        let user: User = user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let hasher = PasswordHasher::new();
        if !hasher.verify(&req.old_password, &user.password_hash)? {
            return Err(AppError::BadRequest("Old password is incorrect".to_string()));
        }

        let new_hash = hasher.hash(&req.new_password)?;
        user_repo.update_password(user_id, &new_hash).await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}
