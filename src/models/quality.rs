use serde::{Deserialize, Serialize};

/// Up to three destination URLs keyed by quality tier. All three may be
/// null at once: that is a valid "unavailable" state, not an error.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct QualityUrls {
    pub quality_480p: Option<String>,
    pub quality_720p: Option<String>,
    pub quality_1080p: Option<String>,
}

impl QualityUrls {
    pub fn is_empty(&self) -> bool {
        self.quality_480p.is_none() && self.quality_720p.is_none() && self.quality_1080p.is_none()
    }
}
