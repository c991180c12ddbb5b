use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::quality::QualityUrls;

/// A per-episode series link. `episodes` is an ordered list supplied by
/// the caller and replaced wholesale on edit; episode N is
/// `start_from_episode + N` and individual episodes are not addressable
/// by their own short code.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EpisodeSeries {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub series_name: String,
    pub short_code: String,
    pub start_from_episode: i32,
    pub episodes: Vec<QualityUrls>,
    #[serde(default)]
    pub views: i64,
    pub ads_enabled: bool,
    pub created_at: i64,
}

impl EpisodeSeries {
    pub fn new(
        series_name: String,
        short_code: String,
        start_from_episode: i32,
        episodes: Vec<QualityUrls>,
        ads_enabled: bool,
    ) -> Self {
        Self {
            id: None,
            series_name,
            short_code,
            start_from_episode,
            episodes,
            views: 0,
            ads_enabled,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
