use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::models::ad_session::AdViewSession;
use crate::models::admin::AdminSettings;
use crate::models::api_token::ApiToken;
use crate::models::link_kind::LinkKind;
use crate::models::link_record::LinkRecord;
use crate::storage::{LinkPatch, Storage, StorageError};

type SessionKey = (String, String, LinkKind);

/// In-memory storage used by the test suites. Mutations run under the
/// table lock, so the view counter is serialized rather than atomic;
/// the observable contract matches `MongoStorage`.
#[derive(Default)]
pub struct MemoryStorage {
    links: RwLock<HashMap<LinkKind, HashMap<String, LinkRecord>>>,
    sessions: RwLock<HashMap<SessionKey, AdViewSession>>,
    tokens: RwLock<Vec<ApiToken>>,
    admin: RwLock<Option<AdminSettings>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn put_session(&self, session: AdViewSession) {
        let key = (
            session.visitor_hash.clone(),
            session.short_code.clone(),
            session.link_type,
        );
        self.sessions.write().await.insert(key, session);
    }

    #[cfg(test)]
    pub(crate) async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn apply_patch(record: &mut LinkRecord, patch: LinkPatch) {
    match (record, patch) {
        (
            LinkRecord::Single(link),
            LinkPatch::Single {
                movie_name,
                original_link,
                ads_enabled,
            },
        ) => {
            if let Some(name) = movie_name {
                link.movie_name = name;
            }
            if let Some(url) = original_link {
                link.original_link = url;
            }
            if let Some(ads) = ads_enabled {
                link.ads_enabled = ads;
            }
        }
        (
            LinkRecord::Quality(link),
            LinkPatch::Quality {
                movie_name,
                quality_480p,
                quality_720p,
                quality_1080p,
                ads_enabled,
            },
        ) => {
            if let Some(name) = movie_name {
                link.movie_name = name;
            }
            if let Some(url) = quality_480p {
                link.qualities.quality_480p = url;
            }
            if let Some(url) = quality_720p {
                link.qualities.quality_720p = url;
            }
            if let Some(url) = quality_1080p {
                link.qualities.quality_1080p = url;
            }
            if let Some(ads) = ads_enabled {
                link.ads_enabled = ads;
            }
        }
        (
            LinkRecord::Series(link),
            LinkPatch::Series {
                series_name,
                start_from_episode,
                episodes,
                ads_enabled,
            },
        ) => {
            if let Some(name) = series_name {
                link.series_name = name;
            }
            if let Some(start) = start_from_episode {
                link.start_from_episode = start;
            }
            if let Some(eps) = episodes {
                link.episodes = eps;
            }
            if let Some(ads) = ads_enabled {
                link.ads_enabled = ads;
            }
        }
        (
            LinkRecord::Zip(link),
            LinkPatch::Zip {
                movie_name,
                range,
                quality_480p,
                quality_720p,
                quality_1080p,
                ads_enabled,
            },
        ) => {
            if let Some(name) = movie_name {
                link.movie_name = name;
            }
            if let Some((from, to)) = range {
                link.from_episode = from;
                link.to_episode = to;
            }
            if let Some(url) = quality_480p {
                link.qualities.quality_480p = url;
            }
            if let Some(url) = quality_720p {
                link.qualities.quality_720p = url;
            }
            if let Some(url) = quality_1080p {
                link.qualities.quality_1080p = url;
            }
            if let Some(ads) = ads_enabled {
                link.ads_enabled = ads;
            }
        }
        // update_link looks the record up by the patch's own kind, so
        // the pairs above are exhaustive in practice.
        _ => unreachable!("patch kind mismatch"),
    }
}

fn set_record_id(record: &mut LinkRecord, id: ObjectId) {
    match record {
        LinkRecord::Single(l) => l.id = Some(id),
        LinkRecord::Quality(l) => l.id = Some(id),
        LinkRecord::Series(l) => l.id = Some(id),
        LinkRecord::Zip(l) => l.id = Some(id),
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn insert_link(&self, mut record: LinkRecord) -> Result<LinkRecord, StorageError> {
        let mut links = self.links.write().await;
        // The shared namespace invariant: no code may exist under any
        // kind, mirroring the per-collection unique indexes plus the
        // allocator's cross-kind probe.
        let code = record.short_code().to_string();
        for table in links.values() {
            if table.contains_key(&code) {
                return Err(StorageError::Duplicate(code));
            }
        }
        if record.id().is_none() {
            set_record_id(&mut record, ObjectId::new());
        }
        links
            .entry(record.kind())
            .or_default()
            .insert(code, record.clone());
        Ok(record)
    }

    async fn find_link(
        &self,
        kind: LinkKind,
        short_code: &str,
    ) -> Result<Option<LinkRecord>, StorageError> {
        let links = self.links.read().await;
        Ok(links
            .get(&kind)
            .and_then(|table| table.get(short_code))
            .cloned())
    }

    async fn list_links(&self, kind: LinkKind) -> Result<Vec<LinkRecord>, StorageError> {
        let links = self.links.read().await;
        Ok(links
            .get(&kind)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn update_link(&self, id: ObjectId, patch: LinkPatch) -> Result<LinkRecord, StorageError> {
        let mut links = self.links.write().await;
        let table = links.entry(patch.kind()).or_default();
        let record = table
            .values_mut()
            .find(|record| record.id() == Some(id))
            .ok_or(StorageError::NotFound)?;
        apply_patch(record, patch);
        Ok(record.clone())
    }

    async fn delete_link(&self, kind: LinkKind, id: ObjectId) -> Result<(), StorageError> {
        let mut links = self.links.write().await;
        let table = links.entry(kind).or_default();
        let code = table
            .iter()
            .find(|(_, record)| record.id() == Some(id))
            .map(|(code, _)| code.clone())
            .ok_or(StorageError::NotFound)?;
        table.remove(&code);
        Ok(())
    }

    async fn increment_views(&self, kind: LinkKind, short_code: &str) -> Result<(), StorageError> {
        let mut links = self.links.write().await;
        if let Some(record) = links.entry(kind).or_default().get_mut(short_code) {
            match record {
                LinkRecord::Single(l) => l.views += 1,
                LinkRecord::Quality(l) => l.views += 1,
                LinkRecord::Series(l) => l.views += 1,
                LinkRecord::Zip(l) => l.views += 1,
            }
        }
        Ok(())
    }

    async fn has_active_session(
        &self,
        visitor_hash: &str,
        short_code: &str,
        kind: LinkKind,
    ) -> Result<bool, StorageError> {
        let now = chrono::Utc::now().timestamp_millis();
        let key = (visitor_hash.to_string(), short_code.to_string(), kind);
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&key)
            .map(|session| session.is_active(now))
            .unwrap_or(false))
    }

    async fn record_ad_view(
        &self,
        visitor_hash: &str,
        short_code: &str,
        kind: LinkKind,
    ) -> Result<(), StorageError> {
        let session = AdViewSession::new(visitor_hash.to_string(), short_code.to_string(), kind);
        let key = (visitor_hash.to_string(), short_code.to_string(), kind);
        // HashMap insert is the upsert: at most one row per key.
        self.sessions.write().await.insert(key, session);
        Ok(())
    }

    async fn purge_expired_sessions(&self) -> Result<u64, StorageError> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.is_active(now));
        Ok((before - sessions.len()) as u64)
    }

    async fn insert_token(&self, mut token: ApiToken) -> Result<ApiToken, StorageError> {
        let mut tokens = self.tokens.write().await;
        if tokens.iter().any(|t| t.token_value == token.token_value) {
            return Err(StorageError::Duplicate(token.token_name));
        }
        if token.id.is_none() {
            token.id = Some(ObjectId::new());
        }
        tokens.push(token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, StorageError> {
        Ok(self.tokens.read().await.clone())
    }

    async fn find_token(&self, token_value: &str) -> Result<Option<ApiToken>, StorageError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.iter().find(|t| t.token_value == token_value).cloned())
    }

    async fn set_token_active(
        &self,
        id: ObjectId,
        is_active: bool,
    ) -> Result<ApiToken, StorageError> {
        let mut tokens = self.tokens.write().await;
        let token = tokens
            .iter_mut()
            .find(|t| t.id == Some(id))
            .ok_or(StorageError::NotFound)?;
        token.is_active = is_active;
        Ok(token.clone())
    }

    async fn delete_token(&self, id: ObjectId) -> Result<(), StorageError> {
        let mut tokens = self.tokens.write().await;
        let index = tokens
            .iter()
            .position(|t| t.id == Some(id))
            .ok_or(StorageError::NotFound)?;
        tokens.remove(index);
        Ok(())
    }

    async fn touch_token_last_used(&self, token_value: &str) -> Result<(), StorageError> {
        let mut tokens = self.tokens.write().await;
        if let Some(token) = tokens.iter_mut().find(|t| t.token_value == token_value) {
            token.last_used = Some(chrono::Utc::now().timestamp_millis());
        }
        Ok(())
    }

    async fn get_admin_settings(&self) -> Result<Option<AdminSettings>, StorageError> {
        Ok(self.admin.read().await.clone())
    }

    async fn insert_admin_settings(
        &self,
        mut settings: AdminSettings,
    ) -> Result<AdminSettings, StorageError> {
        if settings.id.is_none() {
            settings.id = Some(ObjectId::new());
        }
        *self.admin.write().await = Some(settings.clone());
        Ok(settings)
    }

    async fn update_admin_credentials(
        &self,
        admin_id: &str,
        password_hash: &str,
    ) -> Result<AdminSettings, StorageError> {
        let mut admin = self.admin.write().await;
        let settings = admin.as_mut().ok_or(StorageError::NotFound)?;
        settings.admin_id = admin_id.to_string();
        settings.admin_password = password_hash.to_string();
        settings.updated_at = chrono::Utc::now().timestamp_millis();
        Ok(settings.clone())
    }
}
