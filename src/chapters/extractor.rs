/// Description line scanner for chapter timestamps
use super::{ChapterList, ChapterTimestamp};
use tracing::debug;

/// Fewer matches than this are treated as incidental numbers, not chapters
pub const DEFAULT_MIN_CHAPTERS: usize = 3;

/// Extracts chapter timestamps from a video description.
///
/// Each line is checked twice: as written (`0:00 Intro`) and with its
/// space separated tokens reversed (`Intro 0:00`). Both checks may match the
/// same line, in which case the timestamp is recorded twice.
#[derive(Debug, Clone)]
pub struct ChapterExtractor {
    min_chapters: usize,
}

impl ChapterExtractor {
    pub fn new() -> Self {
        Self::with_min_chapters(DEFAULT_MIN_CHAPTERS)
    }

    /// Create an extractor with a custom chapter floor
    pub fn with_min_chapters(min_chapters: usize) -> Self {
        Self { min_chapters }
    }

    pub fn min_chapters(&self) -> usize {
        self.min_chapters
    }

    /// Extract timestamps in line order.
    ///
    /// Returns an empty list when fewer than `min_chapters` timestamps are
    /// found. Never fails: any string is valid input.
    pub fn extract(&self, description: &str) -> ChapterList {
        let mut chapters = ChapterList::new();

        for line in description.split('\n') {
            let line = line.trim();
            let reversed = line.split(' ').rev().collect::<Vec<_>>().join(" ");

            for orientation in [line, reversed.as_str()] {
                if let Some(timestamp) = match_timestamp(orientation) {
                    chapters.push(timestamp);
                }
            }
        }

        if chapters.len() < self.min_chapters {
            if !chapters.is_empty() {
                debug!(
                    "Discarding {} timestamp(s), below floor of {}",
                    chapters.len(),
                    self.min_chapters
                );
            }
            return ChapterList::new();
        }

        chapters
    }
}

impl Default for ChapterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Match `<num>:<num>[ ...]` or `<num>:<num>:<num>[ ...]` at the start of a line
fn match_timestamp(line: &str) -> Option<ChapterTimestamp> {
    let fields: Vec<&str> = line.split(':').collect();

    match fields.as_slice() {
        [minutes, rest] if is_numeric(minutes) => {
            let seconds = first_token(rest);
            is_numeric(seconds).then(|| ChapterTimestamp::new(format!("{}:{}", minutes, seconds)))
        }
        [hours, minutes, rest] if is_numeric(hours) && is_numeric(minutes) => {
            let seconds = first_token(rest);
            is_numeric(seconds)
                .then(|| ChapterTimestamp::new(format!("{}:{}:{}", hours, minutes, seconds)))
        }
        _ => None,
    }
}

fn first_token(text: &str) -> &str {
    text.split(' ').next().unwrap_or_default()
}

/// Non-empty and ASCII digits only: no signs, decimals or inner whitespace.
/// Non-ASCII digits such as `١:٣٠` are rejected even though Unicode counts them as numeric.
fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
