/// License and caption predicates applied to chaptered candidates
use crate::error::Result;
use crate::search::{CaptionProvider, MetadataProvider};
use std::sync::Arc;
use tracing::{debug, warn};

/// License value the Data API reports for Creative Commons videos
pub const CREATIVE_COMMONS_LICENSE: &str = "creativeCommon";

/// Positive selection toggles. An unset flag accepts any status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterFlags {
    pub require_creative_commons: bool,
    pub require_caption: bool,
}

/// Checks license and caption status against external services
#[derive(Clone)]
pub struct VideoFilter {
    metadata: Arc<dyn MetadataProvider>,
    captions: Arc<dyn CaptionProvider>,
}

impl VideoFilter {
    pub fn new(metadata: Arc<dyn MetadataProvider>, captions: Arc<dyn CaptionProvider>) -> Self {
        Self { metadata, captions }
    }

    /// True iff the upstream license equals `creativeCommon`.
    ///
    /// Lookup errors are returned to the caller rather than read as "not CC".
    pub async fn is_creative_commons(&self, video_id: &str) -> Result<bool> {
        let license = self.metadata.get_license_status(video_id).await?;
        debug!("License for {}: {}", video_id, license);
        Ok(license == CREATIVE_COMMONS_LICENSE)
    }

    /// True iff `language` is among the manual or automatic captions.
    ///
    /// Any lookup failure counts as no caption.
    pub async fn has_caption(&self, video_id: &str, language: &str) -> bool {
        match self.captions.get_caption_languages(video_id).await {
            Ok(languages) => languages.contains(language),
            Err(e) => {
                warn!("Caption lookup failed for {}, treating as no caption: {}", video_id, e);
                false
            }
        }
    }

    /// Apply both flags. Each check only runs when its flag is set.
    pub async fn accepts(&self, video_id: &str, language: &str, flags: FilterFlags) -> Result<bool> {
        let license_check = if flags.require_creative_commons {
            self.is_creative_commons(video_id).await?
        } else {
            false
        };

        let caption_check = if flags.require_caption {
            self.has_caption(video_id, language).await
        } else {
            false
        };

        Ok(flags.require_creative_commons == license_check && flags.require_caption == caption_check)
    }
}
