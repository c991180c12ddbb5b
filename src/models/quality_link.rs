use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::quality::QualityUrls;

/// A multi-quality link: one short code, up to three tiered destination
/// URLs. Edits may clear every tier; an all-null record renders as
/// unavailable rather than erroring.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QualityLink {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub movie_name: String,
    pub short_code: String,
    #[serde(flatten)]
    pub qualities: QualityUrls,
    #[serde(default)]
    pub views: i64,
    pub ads_enabled: bool,
    pub created_at: i64,
}

impl QualityLink {
    pub fn new(movie_name: String, short_code: String, qualities: QualityUrls, ads_enabled: bool) -> Self {
        Self {
            id: None,
            movie_name,
            short_code,
            qualities,
            views: 0,
            ads_enabled,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
