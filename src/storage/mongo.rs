use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::Database;
use mongodb::bson::{Document, doc, oid::ObjectId, to_bson};
use mongodb::error::{ErrorKind, WriteFailure};

use crate::models::ad_session::{AD_SESSION_TTL_MS, AdViewSession};
use crate::models::admin::AdminSettings;
use crate::models::api_token::ApiToken;
use crate::models::episode_series::EpisodeSeries;
use crate::models::episode_zip::EpisodeZip;
use crate::models::link_kind::LinkKind;
use crate::models::link_record::LinkRecord;
use crate::models::movie_link::MovieLink;
use crate::models::quality_link::QualityLink;
use crate::storage::{LinkPatch, Storage, StorageError};

pub const COLL_MOVIE_LINKS: &str = "movie_links";
pub const COLL_QUALITY_LINKS: &str = "quality_movie_links";
pub const COLL_EPISODE_SERIES: &str = "quality_episodes";
pub const COLL_EPISODE_ZIPS: &str = "quality_zips";
pub const COLL_AD_SESSIONS: &str = "ad_view_sessions";
pub const COLL_API_TOKENS: &str = "api_tokens";
pub const COLL_ADMIN_SETTINGS: &str = "admin_settings";

pub fn collection_name(kind: LinkKind) -> &'static str {
    match kind {
        LinkKind::Single => COLL_MOVIE_LINKS,
        LinkKind::Quality => COLL_QUALITY_LINKS,
        LinkKind::Series => COLL_EPISODE_SERIES,
        LinkKind::Zip => COLL_EPISODE_ZIPS,
    }
}

fn map_write_err(err: mongodb::error::Error) -> StorageError {
    if is_duplicate_key(&err) {
        StorageError::Duplicate(err.to_string())
    } else {
        StorageError::Database(err)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => write_err.code == 11000,
        _ => false,
    }
}

pub struct MongoStorage {
    db: Database,
}

impl MongoStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn sessions(&self) -> mongodb::Collection<AdViewSession> {
        self.db.collection(COLL_AD_SESSIONS)
    }

    fn tokens(&self) -> mongodb::Collection<ApiToken> {
        self.db.collection(COLL_API_TOKENS)
    }

    fn admin(&self) -> mongodb::Collection<AdminSettings> {
        self.db.collection(COLL_ADMIN_SETTINGS)
    }
}

#[async_trait]
impl Storage for MongoStorage {
    async fn ping(&self) -> Result<(), StorageError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn insert_link(&self, record: LinkRecord) -> Result<LinkRecord, StorageError> {
        match record {
            LinkRecord::Single(mut link) => {
                let result = self
                    .db
                    .collection::<MovieLink>(COLL_MOVIE_LINKS)
                    .insert_one(&link)
                    .await
                    .map_err(map_write_err)?;
                link.id = result.inserted_id.as_object_id();
                Ok(LinkRecord::Single(link))
            }
            LinkRecord::Quality(mut link) => {
                let result = self
                    .db
                    .collection::<QualityLink>(COLL_QUALITY_LINKS)
                    .insert_one(&link)
                    .await
                    .map_err(map_write_err)?;
                link.id = result.inserted_id.as_object_id();
                Ok(LinkRecord::Quality(link))
            }
            LinkRecord::Series(mut link) => {
                let result = self
                    .db
                    .collection::<EpisodeSeries>(COLL_EPISODE_SERIES)
                    .insert_one(&link)
                    .await
                    .map_err(map_write_err)?;
                link.id = result.inserted_id.as_object_id();
                Ok(LinkRecord::Series(link))
            }
            LinkRecord::Zip(mut link) => {
                let result = self
                    .db
                    .collection::<EpisodeZip>(COLL_EPISODE_ZIPS)
                    .insert_one(&link)
                    .await
                    .map_err(map_write_err)?;
                link.id = result.inserted_id.as_object_id();
                Ok(LinkRecord::Zip(link))
            }
        }
    }

    async fn find_link(
        &self,
        kind: LinkKind,
        short_code: &str,
    ) -> Result<Option<LinkRecord>, StorageError> {
        let filter = doc! { "short_code": short_code };
        let record = match kind {
            LinkKind::Single => self
                .db
                .collection::<MovieLink>(COLL_MOVIE_LINKS)
                .find_one(filter)
                .await?
                .map(LinkRecord::Single),
            LinkKind::Quality => self
                .db
                .collection::<QualityLink>(COLL_QUALITY_LINKS)
                .find_one(filter)
                .await?
                .map(LinkRecord::Quality),
            LinkKind::Series => self
                .db
                .collection::<EpisodeSeries>(COLL_EPISODE_SERIES)
                .find_one(filter)
                .await?
                .map(LinkRecord::Series),
            LinkKind::Zip => self
                .db
                .collection::<EpisodeZip>(COLL_EPISODE_ZIPS)
                .find_one(filter)
                .await?
                .map(LinkRecord::Zip),
        };
        Ok(record)
    }

    async fn list_links(&self, kind: LinkKind) -> Result<Vec<LinkRecord>, StorageError> {
        let records = match kind {
            LinkKind::Single => self
                .db
                .collection::<MovieLink>(COLL_MOVIE_LINKS)
                .find(doc! {})
                .await?
                .try_collect::<Vec<_>>()
                .await?
                .into_iter()
                .map(LinkRecord::Single)
                .collect(),
            LinkKind::Quality => self
                .db
                .collection::<QualityLink>(COLL_QUALITY_LINKS)
                .find(doc! {})
                .await?
                .try_collect::<Vec<_>>()
                .await?
                .into_iter()
                .map(LinkRecord::Quality)
                .collect(),
            LinkKind::Series => self
                .db
                .collection::<EpisodeSeries>(COLL_EPISODE_SERIES)
                .find(doc! {})
                .await?
                .try_collect::<Vec<_>>()
                .await?
                .into_iter()
                .map(LinkRecord::Series)
                .collect(),
            LinkKind::Zip => self
                .db
                .collection::<EpisodeZip>(COLL_EPISODE_ZIPS)
                .find(doc! {})
                .await?
                .try_collect::<Vec<_>>()
                .await?
                .into_iter()
                .map(LinkRecord::Zip)
                .collect(),
        };
        Ok(records)
    }

    async fn update_link(&self, id: ObjectId, patch: LinkPatch) -> Result<LinkRecord, StorageError> {
        let kind = patch.kind();
        let mut set = Document::new();
        match patch {
            LinkPatch::Single {
                movie_name,
                original_link,
                ads_enabled,
            } => {
                if let Some(name) = movie_name {
                    set.insert("movie_name", name);
                }
                if let Some(link) = original_link {
                    set.insert("original_link", link);
                }
                if let Some(ads) = ads_enabled {
                    set.insert("ads_enabled", ads);
                }
            }
            LinkPatch::Quality {
                movie_name,
                quality_480p,
                quality_720p,
                quality_1080p,
                ads_enabled,
            } => {
                if let Some(name) = movie_name {
                    set.insert("movie_name", name);
                }
                // Cleared tiers become explicit nulls so they stick.
                if let Some(url) = quality_480p {
                    set.insert("quality_480p", url);
                }
                if let Some(url) = quality_720p {
                    set.insert("quality_720p", url);
                }
                if let Some(url) = quality_1080p {
                    set.insert("quality_1080p", url);
                }
                if let Some(ads) = ads_enabled {
                    set.insert("ads_enabled", ads);
                }
            }
            LinkPatch::Series {
                series_name,
                start_from_episode,
                episodes,
                ads_enabled,
            } => {
                if let Some(name) = series_name {
                    set.insert("series_name", name);
                }
                if let Some(start) = start_from_episode {
                    set.insert("start_from_episode", start);
                }
                if let Some(eps) = episodes {
                    set.insert("episodes", to_bson(&eps)?);
                }
                if let Some(ads) = ads_enabled {
                    set.insert("ads_enabled", ads);
                }
            }
            LinkPatch::Zip {
                movie_name,
                range,
                quality_480p,
                quality_720p,
                quality_1080p,
                ads_enabled,
            } => {
                if let Some(name) = movie_name {
                    set.insert("movie_name", name);
                }
                if let Some((from, to)) = range {
                    set.insert("from_episode", from);
                    set.insert("to_episode", to);
                }
                if let Some(url) = quality_480p {
                    set.insert("quality_480p", url);
                }
                if let Some(url) = quality_720p {
                    set.insert("quality_720p", url);
                }
                if let Some(url) = quality_1080p {
                    set.insert("quality_1080p", url);
                }
                if let Some(ads) = ads_enabled {
                    set.insert("ads_enabled", ads);
                }
            }
        }

        let filter = doc! { "_id": id };
        if !set.is_empty() {
            let result = self
                .db
                .collection::<Document>(collection_name(kind))
                .update_one(filter.clone(), doc! { "$set": set })
                .await?;
            if result.matched_count == 0 {
                return Err(StorageError::NotFound);
            }
        }

        let updated = match kind {
            LinkKind::Single => self
                .db
                .collection::<MovieLink>(COLL_MOVIE_LINKS)
                .find_one(filter)
                .await?
                .map(LinkRecord::Single),
            LinkKind::Quality => self
                .db
                .collection::<QualityLink>(COLL_QUALITY_LINKS)
                .find_one(filter)
                .await?
                .map(LinkRecord::Quality),
            LinkKind::Series => self
                .db
                .collection::<EpisodeSeries>(COLL_EPISODE_SERIES)
                .find_one(filter)
                .await?
                .map(LinkRecord::Series),
            LinkKind::Zip => self
                .db
                .collection::<EpisodeZip>(COLL_EPISODE_ZIPS)
                .find_one(filter)
                .await?
                .map(LinkRecord::Zip),
        };
        updated.ok_or(StorageError::NotFound)
    }

    async fn delete_link(&self, kind: LinkKind, id: ObjectId) -> Result<(), StorageError> {
        let result = self
            .db
            .collection::<Document>(collection_name(kind))
            .delete_one(doc! { "_id": id })
            .await?;
        if result.deleted_count == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn increment_views(&self, kind: LinkKind, short_code: &str) -> Result<(), StorageError> {
        // Single atomic $inc; concurrent resolves never lose an update.
        self.db
            .collection::<Document>(collection_name(kind))
            .update_one(
                doc! { "short_code": short_code },
                doc! { "$inc": { "views": 1 } },
            )
            .await?;
        Ok(())
    }

    async fn has_active_session(
        &self,
        visitor_hash: &str,
        short_code: &str,
        kind: LinkKind,
    ) -> Result<bool, StorageError> {
        let now = chrono::Utc::now().timestamp_millis();
        // Expiry is part of the filter: an expired row that the sweep
        // has not removed yet reads as absent.
        let session = self
            .sessions()
            .find_one(doc! {
                "visitor_hash": visitor_hash,
                "short_code": short_code,
                "link_type": kind.as_str(),
                "expires_at": { "$gt": now },
            })
            .await?;
        Ok(session.is_some())
    }

    async fn record_ad_view(
        &self,
        visitor_hash: &str,
        short_code: &str,
        kind: LinkKind,
    ) -> Result<(), StorageError> {
        let now = chrono::Utc::now().timestamp_millis();
        let filter = doc! {
            "visitor_hash": visitor_hash,
            "short_code": short_code,
            "link_type": kind.as_str(),
        };
        let update = doc! { "$set": {
            "viewed_at": now,
            "expires_at": now + AD_SESSION_TTL_MS,
        } };
        let attempt = self
            .sessions()
            .update_one(filter.clone(), update.clone())
            .upsert(true)
            .await;
        match attempt.map_err(map_write_err) {
            Ok(_) => Ok(()),
            Err(StorageError::Duplicate(_)) => {
                // Two upserts raced on the unique composite key and both
                // chose the insert path; the row exists now, so the
                // second attempt lands as a plain update.
                self.sessions().update_one(filter, update).await?;
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    async fn purge_expired_sessions(&self) -> Result<u64, StorageError> {
        let now = chrono::Utc::now().timestamp_millis();
        let result = self
            .sessions()
            .delete_many(doc! { "expires_at": { "$lte": now } })
            .await?;
        Ok(result.deleted_count)
    }

    async fn insert_token(&self, mut token: ApiToken) -> Result<ApiToken, StorageError> {
        let result = self
            .tokens()
            .insert_one(&token)
            .await
            .map_err(map_write_err)?;
        token.id = result.inserted_id.as_object_id();
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, StorageError> {
        let tokens = self
            .tokens()
            .find(doc! {})
            .await?
            .try_collect::<Vec<_>>()
            .await?;
        Ok(tokens)
    }

    async fn find_token(&self, token_value: &str) -> Result<Option<ApiToken>, StorageError> {
        let token = self
            .tokens()
            .find_one(doc! { "token_value": token_value })
            .await?;
        Ok(token)
    }

    async fn set_token_active(
        &self,
        id: ObjectId,
        is_active: bool,
    ) -> Result<ApiToken, StorageError> {
        let result = self
            .tokens()
            .update_one(doc! { "_id": id }, doc! { "$set": { "is_active": is_active } })
            .await?;
        if result.matched_count == 0 {
            return Err(StorageError::NotFound);
        }
        self.tokens()
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(StorageError::NotFound)
    }

    async fn delete_token(&self, id: ObjectId) -> Result<(), StorageError> {
        let result = self.tokens().delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn touch_token_last_used(&self, token_value: &str) -> Result<(), StorageError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.tokens()
            .update_one(
                doc! { "token_value": token_value },
                doc! { "$set": { "last_used": now } },
            )
            .await?;
        Ok(())
    }

    async fn get_admin_settings(&self) -> Result<Option<AdminSettings>, StorageError> {
        let settings = self.admin().find_one(doc! {}).await?;
        Ok(settings)
    }

    async fn insert_admin_settings(
        &self,
        mut settings: AdminSettings,
    ) -> Result<AdminSettings, StorageError> {
        let result = self.admin().insert_one(&settings).await.map_err(map_write_err)?;
        settings.id = result.inserted_id.as_object_id();
        Ok(settings)
    }

    async fn update_admin_credentials(
        &self,
        admin_id: &str,
        password_hash: &str,
    ) -> Result<AdminSettings, StorageError> {
        let now = chrono::Utc::now().timestamp_millis();
        let result = self
            .admin()
            .update_one(
                doc! {},
                doc! { "$set": {
                    "admin_id": admin_id,
                    "admin_password": password_hash,
                    "updated_at": now,
                } },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(StorageError::NotFound);
        }
        self.admin()
            .find_one(doc! {})
            .await?
            .ok_or(StorageError::NotFound)
    }
}
