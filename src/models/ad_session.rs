use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::link_kind::LinkKind;

/// How long a cleared ad gate keeps letting the same visitor through.
pub const AD_SESSION_TTL_MS: i64 = 5 * 60 * 1000;

/// One row per (visitor, code, kind): the visitor cleared the ad gate
/// for that code and skips the countdown until `expires_at`. Repeat
/// views update the existing row, never insert a second one. An expired
/// row is inert; lookups must treat it as absent whether or not the
/// purge sweep has removed it yet.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdViewSession {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub visitor_hash: String,
    pub short_code: String,
    pub link_type: LinkKind,
    pub viewed_at: i64,
    pub expires_at: i64,
}

impl AdViewSession {
    pub fn new(visitor_hash: String, short_code: String, link_type: LinkKind) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: None,
            visitor_hash,
            short_code,
            link_type,
            viewed_at: now,
            expires_at: now + AD_SESSION_TTL_MS,
        }
    }

    pub fn is_active(&self, now: i64) -> bool {
        now < self.expires_at
    }
}
