//! Video projections used by the watch-history query
//! Videos are owned elsewhere; only read-side summaries live here

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// 观看历史联查的扁平行（watch_history → videos → users）
#[derive(Debug, sqlx::FromRow)]
pub struct WatchHistoryRow {
    pub video_id: Uuid,
    pub title: String,
    pub thumbnail_url: String,
    pub duration_secs: i32,
    pub watched_at: DateTime<Utc>,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub owner_full_name: String,
    pub owner_avatar_url: String,
}

/// Video owner (public fields only)
#[derive(Debug, Serialize)]
pub struct VideoOwner {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar_url: String,
}

/// Video summary
#[derive(Debug, Serialize)]
pub struct VideoSummary {
    pub id: Uuid,
    pub title: String,
    pub thumbnail_url: String,
    pub duration_secs: i32,
    pub owner: VideoOwner,
}

/// Watch history entry, newest first
#[derive(Debug, Serialize)]
pub struct WatchHistoryEntry {
    pub video: VideoSummary,
    pub watched_at: DateTime<Utc>,
}

impl From<WatchHistoryRow> for WatchHistoryEntry {
    fn from(row: WatchHistoryRow) -> Self {
        Self {
            video: VideoSummary {
                id: row.video_id,
                title: row.title,
                thumbnail_url: row.thumbnail_url,
                duration_secs: row.duration_secs,
                owner: VideoOwner {
                    id: row.owner_id,
                    username: row.owner_username,
                    full_name: row.owner_full_name,
                    avatar_url: row.owner_avatar_url,
                },
            },
            watched_at: row.watched_at,
        }
    }
}
