use serde::Serialize;

use crate::errors::ApiError;
use crate::models::link_kind::LinkKind;
use crate::models::link_record::LinkRecord;
use crate::models::quality::QualityUrls;
use crate::storage::{Storage, StorageError};

/// What the web layer renders: either an immediate redirect or the
/// timed gate, decided by `ads_enabled` and `skip_timer`.
#[derive(Debug, Serialize)]
pub struct Resolution {
    pub kind: LinkKind,
    pub name: String,
    pub ads_enabled: bool,
    pub skip_timer: bool,
    #[serde(flatten)]
    pub target: ResolutionTarget,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResolutionTarget {
    Single {
        original_link: String,
    },
    Quality {
        #[serde(flatten)]
        qualities: QualityUrls,
    },
    Series {
        start_from_episode: i32,
        episodes: Vec<QualityUrls>,
    },
    Zip {
        from_episode: i32,
        to_episode: i32,
        #[serde(flatten)]
        qualities: QualityUrls,
    },
}

impl Resolution {
    fn from_record(record: LinkRecord, skip_timer: bool) -> Self {
        let kind = record.kind();
        let name = record.display_name().to_string();
        let ads_enabled = record.ads_enabled();
        let target = match record {
            LinkRecord::Single(link) => ResolutionTarget::Single {
                original_link: link.original_link,
            },
            LinkRecord::Quality(link) => ResolutionTarget::Quality {
                qualities: link.qualities,
            },
            LinkRecord::Series(link) => ResolutionTarget::Series {
                start_from_episode: link.start_from_episode,
                episodes: link.episodes,
            },
            LinkRecord::Zip(link) => ResolutionTarget::Zip {
                from_episode: link.from_episode,
                to_episode: link.to_episode,
                qualities: link.qualities,
            },
        };
        Self {
            kind,
            name,
            ads_enabled,
            skip_timer,
            target,
        }
    }
}

/// Probes the four kinds in fixed order. Global code uniqueness means
/// at most one probe can hit.
pub async fn find_by_code(
    storage: &dyn Storage,
    short_code: &str,
) -> Result<Option<LinkRecord>, StorageError> {
    for kind in LinkKind::ALL {
        if let Some(record) = storage.find_link(kind, short_code).await? {
            return Ok(Some(record));
        }
    }
    Ok(None)
}

/// Resolves a code for one visitor: finds the owning record, decides
/// whether the ad gate can be skipped, and counts the view. Exactly one
/// view is counted per call, gate or no gate.
pub async fn resolve(
    storage: &dyn Storage,
    visitor_hash: &str,
    short_code: &str,
) -> Result<Resolution, ApiError> {
    let record = find_by_code(storage, short_code)
        .await?
        .ok_or(ApiError::NotFound)?;

    // Records with ads disabled skip unconditionally; the session cache
    // is not consulted or written for them.
    let skip_timer = if !record.ads_enabled() {
        true
    } else {
        storage
            .has_active_session(visitor_hash, short_code, record.kind())
            .await?
    };

    storage.increment_views(record.kind(), short_code).await?;

    Ok(Resolution::from_record(record, skip_timer))
}

/// Called when a visitor finishes the countdown: seeds (or refreshes)
/// the skip-timer session for this (visitor, code, kind).
pub async fn record_ad_cleared(
    storage: &dyn Storage,
    visitor_hash: &str,
    short_code: &str,
    kind: LinkKind,
) -> Result<(), ApiError> {
    storage
        .record_ad_view(visitor_hash, short_code, kind)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ad_session::{AD_SESSION_TTL_MS, AdViewSession};
    use crate::models::episode_series::EpisodeSeries;
    use crate::models::episode_zip::EpisodeZip;
    use crate::models::movie_link::MovieLink;
    use crate::models::quality_link::QualityLink;
    use crate::storage::MemoryStorage;

    const VISITOR: &str = "visitor-hash";

    async fn seeded() -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage
            .insert_link(LinkRecord::Single(MovieLink::new(
                "Single Movie".into(),
                "https://example.com/movie".into(),
                "sgl111".into(),
                true,
            )))
            .await
            .unwrap();
        storage
            .insert_link(LinkRecord::Quality(QualityLink::new(
                "Quality Movie".into(),
                "qlt222".into(),
                QualityUrls {
                    quality_480p: None,
                    quality_720p: Some("https://example.com/720".into()),
                    quality_1080p: None,
                },
                true,
            )))
            .await
            .unwrap();
        storage
            .insert_link(LinkRecord::Series(EpisodeSeries::new(
                "Series".into(),
                "srs333".into(),
                4,
                vec![QualityUrls::default(), QualityUrls::default()],
                true,
            )))
            .await
            .unwrap();
        storage
            .insert_link(LinkRecord::Zip(EpisodeZip::new(
                "Season Pack".into(),
                "zip444".into(),
                1,
                13,
                QualityUrls::default(),
                true,
            )))
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn resolves_each_kind_to_its_payload() {
        let storage = seeded().await;

        let single = resolve(&storage, VISITOR, "sgl111").await.unwrap();
        assert_eq!(single.kind, LinkKind::Single);
        assert_eq!(single.name, "Single Movie");
        assert!(matches!(
            single.target,
            ResolutionTarget::Single { ref original_link } if original_link == "https://example.com/movie"
        ));

        let quality = resolve(&storage, VISITOR, "qlt222").await.unwrap();
        assert_eq!(quality.kind, LinkKind::Quality);
        assert!(matches!(
            quality.target,
            ResolutionTarget::Quality { ref qualities }
                if qualities.quality_720p.as_deref() == Some("https://example.com/720")
        ));

        let series = resolve(&storage, VISITOR, "srs333").await.unwrap();
        assert!(matches!(
            series.target,
            ResolutionTarget::Series { start_from_episode: 4, ref episodes } if episodes.len() == 2
        ));

        let zip = resolve(&storage, VISITOR, "zip444").await.unwrap();
        assert!(matches!(
            zip.target,
            ResolutionTarget::Zip { from_episode: 1, to_episode: 13, .. }
        ));
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let storage = seeded().await;
        let err = resolve(&storage, VISITOR, "nope00").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn deleted_record_stops_resolving() {
        let storage = seeded().await;
        let record = storage
            .find_link(LinkKind::Single, "sgl111")
            .await
            .unwrap()
            .unwrap();
        storage
            .delete_link(LinkKind::Single, record.id().unwrap())
            .await
            .unwrap();

        let err = resolve(&storage, VISITOR, "sgl111").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn skip_timer_follows_the_session_window() {
        let storage = seeded().await;

        let first = resolve(&storage, VISITOR, "sgl111").await.unwrap();
        assert!(!first.skip_timer);

        record_ad_cleared(&storage, VISITOR, "sgl111", LinkKind::Single)
            .await
            .unwrap();

        let second = resolve(&storage, VISITOR, "sgl111").await.unwrap();
        assert!(second.skip_timer);

        // Another visitor still waits.
        let other = resolve(&storage, "other-visitor", "sgl111").await.unwrap();
        assert!(!other.skip_timer);
    }

    #[tokio::test]
    async fn expired_session_no_longer_skips() {
        let storage = seeded().await;
        let mut session =
            AdViewSession::new(VISITOR.into(), "sgl111".into(), LinkKind::Single);
        session.viewed_at -= AD_SESSION_TTL_MS + 1;
        session.expires_at -= AD_SESSION_TTL_MS + 1;
        storage.put_session(session).await;

        let resolution = resolve(&storage, VISITOR, "sgl111").await.unwrap();
        assert!(!resolution.skip_timer);
    }

    #[tokio::test]
    async fn ads_disabled_skips_without_touching_sessions() {
        let storage = MemoryStorage::new();
        storage
            .insert_link(LinkRecord::Single(MovieLink::new(
                "No Ads".into(),
                "https://example.com/direct".into(),
                "noads1".into(),
                false,
            )))
            .await
            .unwrap();

        let resolution = resolve(&storage, VISITOR, "noads1").await.unwrap();
        assert!(resolution.skip_timer);
        assert_eq!(storage.session_count().await, 0);

        // The view still counts exactly once.
        let record = storage
            .find_link(LinkKind::Single, "noads1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.views(), 1);
    }

    #[tokio::test]
    async fn each_resolve_counts_one_view() {
        let storage = seeded().await;
        resolve(&storage, VISITOR, "sgl111").await.unwrap();
        resolve(&storage, VISITOR, "sgl111").await.unwrap();
        resolve(&storage, "someone-else", "sgl111").await.unwrap();

        let record = storage
            .find_link(LinkKind::Single, "sgl111")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.views(), 3);
    }

    #[tokio::test]
    async fn all_null_quality_record_resolves_as_unavailable_not_error() {
        let storage = seeded().await;
        let record = storage
            .find_link(LinkKind::Quality, "qlt222")
            .await
            .unwrap()
            .unwrap();
        storage
            .update_link(
                record.id().unwrap(),
                crate::storage::LinkPatch::Quality {
                    movie_name: None,
                    quality_480p: Some(None),
                    quality_720p: Some(None),
                    quality_1080p: Some(None),
                    ads_enabled: None,
                },
            )
            .await
            .unwrap();

        let resolution = resolve(&storage, VISITOR, "qlt222").await.unwrap();
        assert!(matches!(
            resolution.target,
            ResolutionTarget::Quality { ref qualities } if qualities.is_empty()
        ));
    }
}
