use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::admin::AdminSettings;
use crate::models::api_token::ApiToken;
use crate::models::link_kind::LinkKind;
use crate::models::link_record::LinkRecord;
use crate::models::quality::QualityUrls;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStorage;
pub use mongo::MongoStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),
}

/// Three-state field patch for a quality-tier URL: `None` leaves the
/// tier untouched, `Some(None)` clears it to null, `Some(Some(url))`
/// replaces it. Clearing every tier is legal; the record then renders
/// as unavailable.
pub type UrlPatch = Option<Option<String>>;

/// Partial update for a link record. The variant fixes which kind the
/// patch applies to; `None` fields are left untouched. The zip range
/// travels as a pair so an edit can never change one bound without the
/// other, and the series episode list is only ever replaced wholesale.
#[derive(Debug, Clone)]
pub enum LinkPatch {
    Single {
        movie_name: Option<String>,
        original_link: Option<String>,
        ads_enabled: Option<bool>,
    },
    Quality {
        movie_name: Option<String>,
        quality_480p: UrlPatch,
        quality_720p: UrlPatch,
        quality_1080p: UrlPatch,
        ads_enabled: Option<bool>,
    },
    Series {
        series_name: Option<String>,
        start_from_episode: Option<i32>,
        episodes: Option<Vec<QualityUrls>>,
        ads_enabled: Option<bool>,
    },
    Zip {
        movie_name: Option<String>,
        range: Option<(i32, i32)>,
        quality_480p: UrlPatch,
        quality_720p: UrlPatch,
        quality_1080p: UrlPatch,
        ads_enabled: Option<bool>,
    },
}

impl LinkPatch {
    pub fn kind(&self) -> LinkKind {
        match self {
            LinkPatch::Single { .. } => LinkKind::Single,
            LinkPatch::Quality { .. } => LinkKind::Quality,
            LinkPatch::Series { .. } => LinkKind::Series,
            LinkPatch::Zip { .. } => LinkKind::Zip,
        }
    }
}

/// Uniform CRUD facade over the four link collections, the ad-view
/// session table, API tokens and admin credentials. The engine only
/// ever sees this trait; `MongoStorage` backs production and
/// `MemoryStorage` backs tests.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn ping(&self) -> Result<(), StorageError>;

    /// Inserts a new link record. A short-code collision (lost
    /// allocation race) surfaces as `StorageError::Duplicate`.
    async fn insert_link(&self, record: LinkRecord) -> Result<LinkRecord, StorageError>;
    async fn find_link(&self, kind: LinkKind, short_code: &str)
        -> Result<Option<LinkRecord>, StorageError>;
    async fn list_links(&self, kind: LinkKind) -> Result<Vec<LinkRecord>, StorageError>;
    async fn update_link(&self, id: ObjectId, patch: LinkPatch) -> Result<LinkRecord, StorageError>;
    async fn delete_link(&self, kind: LinkKind, id: ObjectId) -> Result<(), StorageError>;
    /// Adds exactly one view. Implementations must use an atomic
    /// increment, not read-modify-write.
    async fn increment_views(&self, kind: LinkKind, short_code: &str) -> Result<(), StorageError>;

    /// True iff a session row exists for the key and has not expired.
    /// Expiry is checked here, independent of the purge sweep.
    async fn has_active_session(
        &self,
        visitor_hash: &str,
        short_code: &str,
        kind: LinkKind,
    ) -> Result<bool, StorageError>;
    /// Upserts the session row for the key, restarting its TTL.
    async fn record_ad_view(
        &self,
        visitor_hash: &str,
        short_code: &str,
        kind: LinkKind,
    ) -> Result<(), StorageError>;
    /// Removes expired rows. Idempotent; safe on any schedule or never.
    async fn purge_expired_sessions(&self) -> Result<u64, StorageError>;

    async fn insert_token(&self, token: ApiToken) -> Result<ApiToken, StorageError>;
    async fn list_tokens(&self) -> Result<Vec<ApiToken>, StorageError>;
    /// Looks a token up by value regardless of `is_active`; the token
    /// gate owns the inactive-equals-missing rule.
    async fn find_token(&self, token_value: &str) -> Result<Option<ApiToken>, StorageError>;
    async fn set_token_active(&self, id: ObjectId, is_active: bool)
        -> Result<ApiToken, StorageError>;
    async fn delete_token(&self, id: ObjectId) -> Result<(), StorageError>;
    async fn touch_token_last_used(&self, token_value: &str) -> Result<(), StorageError>;

    async fn get_admin_settings(&self) -> Result<Option<AdminSettings>, StorageError>;
    async fn insert_admin_settings(&self, settings: AdminSettings)
        -> Result<AdminSettings, StorageError>;
    async fn update_admin_credentials(
        &self,
        admin_id: &str,
        password_hash: &str,
    ) -> Result<AdminSettings, StorageError>;
}
