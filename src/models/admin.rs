use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Single-row admin credentials. `admin_password` is a bcrypt hash.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminSettings {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub admin_id: String,
    pub admin_password: String,
    pub updated_at: i64,
}

impl AdminSettings {
    pub fn new(admin_id: String, admin_password: String) -> Self {
        Self {
            id: None,
            admin_id,
            admin_password,
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
