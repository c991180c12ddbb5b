use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::quality::QualityUrls;

/// An episode-range archive link covering `[from_episode, to_episode)`.
/// The range is validated (`from < to`) before a record is ever stored.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EpisodeZip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub movie_name: String,
    pub short_code: String,
    pub from_episode: i32,
    pub to_episode: i32,
    #[serde(flatten)]
    pub qualities: QualityUrls,
    #[serde(default)]
    pub views: i64,
    pub ads_enabled: bool,
    pub created_at: i64,
}

impl EpisodeZip {
    pub fn new(
        movie_name: String,
        short_code: String,
        from_episode: i32,
        to_episode: i32,
        qualities: QualityUrls,
        ads_enabled: bool,
    ) -> Self {
        Self {
            id: None,
            movie_name,
            short_code,
            from_episode,
            to_episode,
            qualities,
            views: 0,
            ads_enabled,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
