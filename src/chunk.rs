//! Deterministic payload partitioning for resumable uploads.
//!
//! A payload of `total` bytes is split into `ceil(total / chunk_size)`
//! contiguous half-open ranges. Every range except possibly the last has
//! exactly `chunk_size` bytes; together they cover `[0, total)` with no gaps
//! and no overlaps.

use std::fmt;

use uuid::Uuid;

pub const MEBIBYTE: u64 = 1024 * 1024;

/// Chunk size for resumable uploads, per the platform's recommendation.
pub const DEFAULT_CHUNK_SIZE: u64 = 5 * MEBIBYTE;

/// Payloads up to this size are uploaded in a single request.
pub const DEFAULT_DIRECT_LIMIT: u64 = 10 * MEBIBYTE;

/// A half-open `[start, end)` byte range over a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Wire form of the range: `bytes start-end/total` with an inclusive end.
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end - 1, total)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Split `total` bytes into ranges of `chunk_size`, last range possibly
/// shorter. `total == 0` yields no ranges.
pub fn partition(total: u64, chunk_size: u64) -> Vec<ByteRange> {
    assert!(chunk_size > 0, "chunk size must be non-zero");

    let mut ranges = Vec::with_capacity(total.div_ceil(chunk_size) as usize);
    let mut start = 0;
    while start < total {
        let end = (start + chunk_size).min(total);
        ranges.push(ByteRange { start, end });
        start = end;
    }
    ranges
}

/// Opaque token correlating the chunks of one resumable upload attempt.
///
/// Unique per attempt: two concurrent uploads of the same object name must
/// never share a session, so the id is random rather than timestamp-derived.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_covers_payload_exactly() {
        for (total, chunk_size) in [(1, 4), (4, 4), (5, 4), (8, 4), (9, 4), (1000, 7)] {
            let ranges = partition(total, chunk_size);
            assert_eq!(ranges.len() as u64, total.div_ceil(chunk_size));
            assert_eq!(ranges.first().unwrap().start, 0);
            assert_eq!(ranges.last().unwrap().end, total);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start, "gap or overlap in {pair:?}");
                assert!(pair[0].start < pair[1].start);
            }
            for range in &ranges[..ranges.len() - 1] {
                assert_eq!(range.len(), chunk_size);
            }
            assert!(ranges.last().unwrap().len() <= chunk_size);
        }
    }

    #[test]
    fn exact_multiple_has_no_empty_trailing_range() {
        let ranges = partition(10 * MEBIBYTE, DEFAULT_CHUNK_SIZE);
        assert_eq!(ranges.len(), 2);
        assert!(ranges.iter().all(|r| !r.is_empty()));
    }

    #[test]
    fn zero_length_payload_yields_no_ranges() {
        assert!(partition(0, DEFAULT_CHUNK_SIZE).is_empty());
    }

    #[test]
    fn twelve_mebibyte_scenario() {
        let total = 12 * MEBIBYTE;
        let ranges = partition(total, DEFAULT_CHUNK_SIZE);
        assert_eq!(
            ranges,
            vec![
                ByteRange { start: 0, end: 5 * MEBIBYTE },
                ByteRange { start: 5 * MEBIBYTE, end: 10 * MEBIBYTE },
                ByteRange { start: 10 * MEBIBYTE, end: 12 * MEBIBYTE },
            ]
        );
        assert_eq!(ranges[0].content_range(total), "bytes 0-5242879/12582912");
        assert_eq!(ranges[1].content_range(total), "bytes 5242880-10485759/12582912");
        assert_eq!(ranges[2].content_range(total), "bytes 10485760-12582911/12582912");
    }

    #[test]
    fn session_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }
}
