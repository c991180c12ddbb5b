use mongodb::bson::oid::ObjectId;

use crate::models::episode_series::EpisodeSeries;
use crate::models::episode_zip::EpisodeZip;
use crate::models::link_kind::LinkKind;
use crate::models::movie_link::MovieLink;
use crate::models::quality_link::QualityLink;

/// The four record kinds as one tagged union, so storage dispatch and
/// the resolver's probe loop are exhaustive matches instead of four
/// parallel code paths.
#[derive(Debug, Clone)]
pub enum LinkRecord {
    Single(MovieLink),
    Quality(QualityLink),
    Series(EpisodeSeries),
    Zip(EpisodeZip),
}

impl LinkRecord {
    pub fn kind(&self) -> LinkKind {
        match self {
            LinkRecord::Single(_) => LinkKind::Single,
            LinkRecord::Quality(_) => LinkKind::Quality,
            LinkRecord::Series(_) => LinkKind::Series,
            LinkRecord::Zip(_) => LinkKind::Zip,
        }
    }

    pub fn id(&self) -> Option<ObjectId> {
        match self {
            LinkRecord::Single(l) => l.id,
            LinkRecord::Quality(l) => l.id,
            LinkRecord::Series(l) => l.id,
            LinkRecord::Zip(l) => l.id,
        }
    }

    pub fn short_code(&self) -> &str {
        match self {
            LinkRecord::Single(l) => &l.short_code,
            LinkRecord::Quality(l) => &l.short_code,
            LinkRecord::Series(l) => &l.short_code,
            LinkRecord::Zip(l) => &l.short_code,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            LinkRecord::Single(l) => &l.movie_name,
            LinkRecord::Quality(l) => &l.movie_name,
            LinkRecord::Series(l) => &l.series_name,
            LinkRecord::Zip(l) => &l.movie_name,
        }
    }

    pub fn ads_enabled(&self) -> bool {
        match self {
            LinkRecord::Single(l) => l.ads_enabled,
            LinkRecord::Quality(l) => l.ads_enabled,
            LinkRecord::Series(l) => l.ads_enabled,
            LinkRecord::Zip(l) => l.ads_enabled,
        }
    }

    pub fn views(&self) -> i64 {
        match self {
            LinkRecord::Single(l) => l.views,
            LinkRecord::Quality(l) => l.views,
            LinkRecord::Series(l) => l.views,
            LinkRecord::Zip(l) => l.views,
        }
    }
}
