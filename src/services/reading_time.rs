//! Read-time estimates derived from article text.
//!
//! The estimate is a line-count heuristic: every line is assumed to hold a
//! fixed number of words, read at a fixed speed, rounded up to whole minutes.

use super::catalog::Page;

const WORDS_PER_LINE: u64 = 12;
const WORDS_PER_MINUTE: u64 = 500;

/// Minutes to read `content`. Empty content reads in zero minutes.
#[must_use]
pub fn reading_time(content: &str) -> u32 {
    if content.is_empty() {
        return 0;
    }
    let lines = content.split('\n').count() as u64;
    let minutes = (lines * WORDS_PER_LINE).div_ceil(WORDS_PER_MINUTE);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Minutes to read every page, measured as one body joined by newlines.
#[must_use]
pub fn total_reading_time(pages: &[Page]) -> u32 {
    if pages.is_empty() {
        return 0;
    }
    let joined = pages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    reading_time(&joined)
}

/// Mean of per-article read times, rounded to the nearest minute.
#[must_use]
pub fn average_reading_time(times: &[u32]) -> u32 {
    if times.is_empty() {
        return 0;
    }
    let total: u64 = times.iter().map(|&t| u64::from(t)).sum();
    let count = times.len() as u64;
    // Round half up.
    let rounded = (total * 2 + count) / (count * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "reading_time_test.rs"]
mod tests;
