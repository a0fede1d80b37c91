//! Session store (刷新令牌的持久化)
//!
//! 每个账户最多持有一个有效刷新令牌，存储的是其 SHA-256 摘要而非原文，
//! 数据库泄露不会直接产出可用令牌。

use crate::error::AppError;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

pub struct SessionStore {
    db: PgPool,
}

impl SessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 计算令牌摘要（十六进制）
    pub fn digest(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// 无条件写入刷新令牌摘要（登录时的轮换点，覆盖任何旧值）
    pub async fn store(&self, user_id: Uuid, token_digest: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET refresh_token_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(token_digest)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 清除刷新令牌（登出）
    ///
    /// 幂等：对已为空的字段再次清除不是错误。
    pub async fn clear(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET refresh_token_hash = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// 比较并轮换：仅当存储值仍等于 expected 时替换为 new
    ///
    /// 单条条件 UPDATE 即单文档原子操作，两个并发刷新最多一个成功，
    /// 这是整个系统唯一、也是最关键的防重放检查。
    pub async fn rotate(
        &self,
        user_id: Uuid,
        expected_digest: &str,
        new_digest: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $3, updated_at = NOW()
            WHERE id = $1 AND refresh_token_hash = $2
            "#,
        )
        .bind(user_id)
        .bind(expected_digest)
        .bind(new_digest)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let d1 = SessionStore::digest("some.refresh.token");
        let d2 = SessionStore::digest("some.refresh.token");
        assert_eq!(d1, d2);
        // SHA-256 十六进制长度固定
        assert_eq!(d1.len(), 64);
    }

    #[test]
    fn test_digest_differs_per_token() {
        assert_ne!(SessionStore::digest("token-a"), SessionStore::digest("token-b"));
    }

    #[test]
    fn test_digest_is_not_the_token() {
        let token = "some.refresh.token";
        assert_ne!(SessionStore::digest(token), token);
    }
}
