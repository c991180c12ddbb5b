use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A single-file link: one short code, one destination URL.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MovieLink {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub movie_name: String,
    pub original_link: String,
    pub short_code: String,
    #[serde(default)]
    pub views: i64,
    pub ads_enabled: bool,
    pub created_at: i64,
}

impl MovieLink {
    pub fn new(movie_name: String, original_link: String, short_code: String, ads_enabled: bool) -> Self {
        Self {
            id: None,
            movie_name,
            original_link,
            short_code,
            views: 0,
            ads_enabled,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
