use nanoid::nanoid;

use crate::errors::ApiError;
use crate::models::link_kind::LinkKind;
use crate::models::link_record::LinkRecord;
use crate::storage::{Storage, StorageError};

/// Short codes are 6 characters of lowercase base36, one namespace
/// shared by all four record kinds.
pub const CODE_LENGTH: usize = 6;

const CODE_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const MAX_ATTEMPTS: usize = 10;

/// True if any record kind already owns this code.
pub async fn code_in_use(storage: &dyn Storage, code: &str) -> Result<bool, StorageError> {
    for kind in LinkKind::ALL {
        if storage.find_link(kind, code).await?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Generates a short code no kind currently owns. Gives up after
/// `MAX_ATTEMPTS` collisions; the caller surfaces that as a retryable
/// server error, never as a possibly-colliding code.
pub async fn allocate_short_code(storage: &dyn Storage) -> Result<String, ApiError> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = nanoid!(CODE_LENGTH, &CODE_ALPHABET);
        if !code_in_use(storage, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(ApiError::AllocationExhausted)
}

/// Allocates a code and inserts the record built from it. The probe and
/// the insert are not atomic, so a concurrent request can steal the
/// code in between; the store's unique index rejects the second insert
/// and we retry exactly once with a fresh allocation.
pub async fn insert_with_fresh_code<F>(
    storage: &dyn Storage,
    build: F,
) -> Result<LinkRecord, ApiError>
where
    F: Fn(String) -> LinkRecord,
{
    let code = allocate_short_code(storage).await?;
    match storage.insert_link(build(code)).await {
        Ok(record) => Ok(record),
        Err(StorageError::Duplicate(_)) => {
            let code = allocate_short_code(storage).await?;
            match storage.insert_link(build(code)).await {
                Ok(record) => Ok(record),
                Err(StorageError::Duplicate(_)) => Err(ApiError::AllocationExhausted),
                Err(err) => Err(err.into()),
            }
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use mongodb::bson::oid::ObjectId;

    use super::*;
    use crate::models::admin::AdminSettings;
    use crate::models::api_token::ApiToken;
    use crate::models::movie_link::MovieLink;
    use crate::storage::{LinkPatch, MemoryStorage};

    fn single(code: &str) -> LinkRecord {
        LinkRecord::Single(MovieLink::new(
            "Movie".into(),
            "https://example.com/file".into(),
            code.into(),
            true,
        ))
    }

    #[tokio::test]
    async fn allocates_codes_from_the_base36_alphabet() {
        let storage = MemoryStorage::new();
        let code = allocate_short_code(&storage).await.unwrap();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn probe_covers_every_kind() {
        let storage = MemoryStorage::new();
        storage.insert_link(single("aaa111")).await.unwrap();
        assert!(code_in_use(&storage, "aaa111").await.unwrap());

        let zip = LinkRecord::Zip(crate::models::episode_zip::EpisodeZip::new(
            "Season".into(),
            "bbb222".into(),
            1,
            5,
            Default::default(),
            true,
        ));
        storage.insert_link(zip).await.unwrap();
        assert!(code_in_use(&storage, "bbb222").await.unwrap());
        assert!(!code_in_use(&storage, "ccc333").await.unwrap());
    }

    /// Storage where every candidate collides and, separately, where
    /// the first insert loses the check-then-insert race.
    struct ContendedStorage {
        every_code_taken: bool,
        failed_inserts: AtomicUsize,
        inner: MemoryStorage,
    }

    impl ContendedStorage {
        fn full() -> Self {
            Self {
                every_code_taken: true,
                failed_inserts: AtomicUsize::new(0),
                inner: MemoryStorage::new(),
            }
        }

        fn racing(losses: usize) -> Self {
            Self {
                every_code_taken: false,
                failed_inserts: AtomicUsize::new(losses),
                inner: MemoryStorage::new(),
            }
        }
    }

    #[async_trait]
    impl Storage for ContendedStorage {
        async fn ping(&self) -> Result<(), StorageError> {
            self.inner.ping().await
        }

        async fn find_link(
            &self,
            kind: LinkKind,
            short_code: &str,
        ) -> Result<Option<LinkRecord>, StorageError> {
            if self.every_code_taken {
                return Ok(Some(single(short_code)));
            }
            self.inner.find_link(kind, short_code).await
        }

        async fn insert_link(&self, record: LinkRecord) -> Result<LinkRecord, StorageError> {
            let remaining = self.failed_inserts.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failed_inserts.store(remaining - 1, Ordering::SeqCst);
                return Err(StorageError::Duplicate(record.short_code().to_string()));
            }
            self.inner.insert_link(record).await
        }

        async fn list_links(&self, kind: LinkKind) -> Result<Vec<LinkRecord>, StorageError> {
            self.inner.list_links(kind).await
        }

        async fn update_link(
            &self,
            id: ObjectId,
            patch: LinkPatch,
        ) -> Result<LinkRecord, StorageError> {
            self.inner.update_link(id, patch).await
        }

        async fn delete_link(&self, kind: LinkKind, id: ObjectId) -> Result<(), StorageError> {
            self.inner.delete_link(kind, id).await
        }

        async fn increment_views(
            &self,
            kind: LinkKind,
            short_code: &str,
        ) -> Result<(), StorageError> {
            self.inner.increment_views(kind, short_code).await
        }

        async fn has_active_session(
            &self,
            visitor_hash: &str,
            short_code: &str,
            kind: LinkKind,
        ) -> Result<bool, StorageError> {
            self.inner
                .has_active_session(visitor_hash, short_code, kind)
                .await
        }

        async fn record_ad_view(
            &self,
            visitor_hash: &str,
            short_code: &str,
            kind: LinkKind,
        ) -> Result<(), StorageError> {
            self.inner
                .record_ad_view(visitor_hash, short_code, kind)
                .await
        }

        async fn purge_expired_sessions(&self) -> Result<u64, StorageError> {
            self.inner.purge_expired_sessions().await
        }

        async fn insert_token(&self, token: ApiToken) -> Result<ApiToken, StorageError> {
            self.inner.insert_token(token).await
        }

        async fn list_tokens(&self) -> Result<Vec<ApiToken>, StorageError> {
            self.inner.list_tokens().await
        }

        async fn find_token(&self, token_value: &str) -> Result<Option<ApiToken>, StorageError> {
            self.inner.find_token(token_value).await
        }

        async fn set_token_active(
            &self,
            id: ObjectId,
            is_active: bool,
        ) -> Result<ApiToken, StorageError> {
            self.inner.set_token_active(id, is_active).await
        }

        async fn delete_token(&self, id: ObjectId) -> Result<(), StorageError> {
            self.inner.delete_token(id).await
        }

        async fn touch_token_last_used(&self, token_value: &str) -> Result<(), StorageError> {
            self.inner.touch_token_last_used(token_value).await
        }

        async fn get_admin_settings(&self) -> Result<Option<AdminSettings>, StorageError> {
            self.inner.get_admin_settings().await
        }

        async fn insert_admin_settings(
            &self,
            settings: AdminSettings,
        ) -> Result<AdminSettings, StorageError> {
            self.inner.insert_admin_settings(settings).await
        }

        async fn update_admin_credentials(
            &self,
            admin_id: &str,
            password_hash: &str,
        ) -> Result<AdminSettings, StorageError> {
            self.inner
                .update_admin_credentials(admin_id, password_hash)
                .await
        }
    }

    #[tokio::test]
    async fn exhausted_namespace_reports_allocation_exhausted() {
        let storage = ContendedStorage::full();
        let err = allocate_short_code(&storage).await.unwrap_err();
        assert!(matches!(err, ApiError::AllocationExhausted));
    }

    #[tokio::test]
    async fn lost_insert_race_is_retried_once() {
        let storage = ContendedStorage::racing(1);
        let record = insert_with_fresh_code(&storage, |code| single(&code))
            .await
            .unwrap();
        assert_eq!(record.short_code().len(), CODE_LENGTH);
        assert!(
            code_in_use(&storage, record.short_code()).await.unwrap(),
            "record should be persisted after the retry"
        );
    }

    #[tokio::test]
    async fn repeated_insert_races_give_up() {
        let storage = ContendedStorage::racing(2);
        let err = insert_with_fresh_code(&storage, |code| single(&code))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AllocationExhausted));
    }
}
