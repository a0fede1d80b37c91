//! 媒体对象存储
//!
//! 头像/封面上传的窄接口，后端为 S3 兼容存储（AWS S3、MinIO）。
//! 仅上传并返回可公开访问的 URL，删除与重试不在边界内。

use crate::{config::StorageConfig, error::AppError};
use s3::bucket::Bucket;
use secrecy::ExposeSecret;
use s3::creds::Credentials;
use s3::Region;
use uuid::Uuid;

/// 媒体存储客户端
pub struct MediaStorage {
    config: StorageConfig,
}

impl MediaStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// 上传图片，返回公开 URL
    pub async fn upload_image(
        &self,
        bytes: &[u8],
        content_type: &str,
        prefix: &str,
    ) -> Result<String, AppError> {
        let ext = extension_for(content_type).ok_or_else(|| {
            AppError::BadRequest(format!("Unsupported image type: {}", content_type))
        })?;

        let key = format!("{}/{}.{}", prefix, Uuid::new_v4(), ext);

        let credentials = match (&self.config.access_key, &self.config.secret_key) {
            (Some(access_key), Some(secret_key)) => Credentials::new(
                Some(access_key.expose_secret().as_str()),
                Some(secret_key.expose_secret().as_str()),
                None,
                None,
                None,
            ),
            // 回退到 AWS 环境变量 / profile
            _ => Credentials::default(),
        }
        .map_err(|e| AppError::Upstream(format!("Failed to construct storage credentials: {}", e)))?;

        let region_str = self
            .config
            .region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string());

        let region = if let Some(ref endpoint) = self.config.endpoint {
            // 自定义端点（如 MinIO）
            Region::Custom {
                region: region_str.clone(),
                endpoint: endpoint.clone(),
            }
        } else {
            region_str.parse().unwrap_or(Region::UsEast1)
        };

        let bucket = Bucket::new(&self.config.bucket, region, credentials)
            .map_err(|e| AppError::Upstream(format!("Failed to create storage client: {}", e)))?;

        bucket
            .put_object_with_content_type(&key, bytes, content_type)
            .await
            .map_err(|e| {
                tracing::error!(key = %key, "Media upload failed: {}", e);
                AppError::Upstream(format!("Media upload failed: {}", e))
            })?;

        let url = self.public_url(&key, &region_str);

        tracing::debug!(key = %key, url = %url, "Media uploaded");
        Ok(url)
    }

    /// 对象的公开访问 URL
    fn public_url(&self, key: &str, region: &str) -> String {
        if let Some(ref base) = self.config.public_base_url {
            return format!("{}/{}", base.trim_end_matches('/'), key);
        }

        if let Some(ref endpoint) = self.config.endpoint {
            return format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.config.bucket, key);
        }

        format!("https://{}.s3.{}.amazonaws.com/{}", self.config.bucket, region, key)
    }
}

/// 根据 Content-Type 选择文件扩展名
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
