/// Chapter marker detection for video descriptions
///
/// YouTube turns timestamp lines in a description into chapters. This module
/// finds those timestamps in free text without interpreting them as durations.

pub mod extractor;

// Re-export main types
pub use extractor::{ChapterExtractor, DEFAULT_MIN_CHAPTERS};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `M:SS` or `H:MM:SS` shaped token taken verbatim from a description line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterTimestamp(String);

impl ChapterTimestamp {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    /// Number of colon separated fields (2 for `M:SS`, 3 for `H:MM:SS`)
    pub fn field_count(&self) -> usize {
        self.0.split(':').count()
    }
}

impl fmt::Display for ChapterTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for ChapterTimestamp {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<ChapterTimestamp> for String {
    fn from(value: ChapterTimestamp) -> Self {
        value.0
    }
}

/// Timestamps in description line order. Duplicates are kept.
pub type ChapterList = Vec<ChapterTimestamp>;
