use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::link_kind::LinkKind;

/// Bearer credential for the programmatic creation endpoints. The scope
/// (`token_type`) names the single record kind this token may create.
/// An inactive token authorizes nothing, exactly like a missing one.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiToken {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub token_name: String,
    pub token_value: String,
    pub token_type: LinkKind,
    pub is_active: bool,
    pub created_at: i64,
    pub last_used: Option<i64>,
}

impl ApiToken {
    pub fn new(token_name: String, token_type: LinkKind) -> Self {
        Self {
            id: None,
            token_name,
            token_value: Uuid::new_v4().simple().to_string(),
            token_type,
            is_active: true,
            created_at: chrono::Utc::now().timestamp_millis(),
            last_used: None,
        }
    }
}

// For API responses after issuance - the secret is never echoed back
#[derive(Serialize)]
pub struct ApiTokenResponse {
    pub id: String,
    pub token_name: String,
    pub token_type: LinkKind,
    pub is_active: bool,
    pub created_at: i64,
    pub last_used: Option<i64>,
}

impl From<ApiToken> for ApiTokenResponse {
    fn from(token: ApiToken) -> Self {
        Self {
            id: token.id.map(|id| id.to_hex()).unwrap_or_default(),
            token_name: token.token_name,
            token_type: token.token_type,
            is_active: token.is_active,
            created_at: token.created_at,
            last_used: token.last_used,
        }
    }
}
