//! Entry range filtering.
//!
//! Entries are numbered `1..=n` in file order. A range selects an inclusive
//! window of those ordinals:
//!
//! ```text
//! "4-9"    -> start=4, end=9
//! "3"      -> start=3, end=END
//! "25-INF" -> start=25, end=END
//! "INF"    -> start=1, end=END
//! ```
//!
//! Parsing never fails: anything that cannot be read falls back to the
//! corresponding default component.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

#[allow(clippy::expect_used)]
static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)([^0-9]+)?([0-9]+)?").expect("entry range regex is valid")
});

/// Inclusive, 1-based window of entry ordinals to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRange {
    start: usize,
    end: Option<usize>,
}

impl Default for EntryRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl EntryRange {
    /// Range covering every entry.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: 1,
            end: None,
        }
    }

    /// Parses `"N"`, `"N-M"` or `"N-INF"`; garbage yields the unbounded range.
    /// An end before the start is dropped, leaving `N-INF`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let Some(caps) = RANGE_PATTERN.captures(text.trim()) else {
            return Self::unbounded();
        };

        let start = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .filter(|start| *start >= 1)
            .unwrap_or(1);
        let end = caps.get(3).and_then(|m| m.as_str().parse::<usize>().ok());

        if let Some(end) = end
            && end < start
        {
            warn!(
                range = text,
                start,
                end,
                "entry range ends before it starts; ignoring the end and processing through the last entry"
            );
            return Self { start, end: None };
        }

        Self { start, end }
    }

    /// First ordinal to process.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last ordinal to process, `None` when open-ended.
    #[must_use]
    pub fn end(&self) -> Option<usize> {
        self.end
    }

    /// Returns true if `start <= ordinal <= end`.
    #[must_use]
    pub fn admits(&self, ordinal: usize) -> bool {
        ordinal >= self.start && !self.is_past_end(ordinal)
    }

    /// Returns true once `ordinal` lies beyond the end of the range.
    ///
    /// Ordinals only grow, so callers stop iterating at the first `true`.
    #[must_use]
    pub fn is_past_end(&self, ordinal: usize) -> bool {
        self.end.is_some_and(|end| ordinal > end)
    }

    /// Number of ordinals of `1..=total` inside the range.
    #[must_use]
    pub fn count_within(&self, total: usize) -> usize {
        let last = self.end.map_or(total, |end| end.min(total));
        (last + 1).saturating_sub(self.start)
    }
}

impl fmt::Display for EntryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{end}", self.start),
            None => write!(f, "{}-END", self.start),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_and_end() {
        let range = EntryRange::parse("4-9");
        assert_eq!(range.start(), 4);
        assert_eq!(range.end(), Some(9));
    }

    #[test]
    fn test_parse_start_only_is_open_ended() {
        let range = EntryRange::parse("3");
        assert_eq!(range.start(), 3);
        assert_eq!(range.end(), None);
    }

    #[test]
    fn test_parse_inf_end_is_open_ended() {
        let range = EntryRange::parse("25-INF");
        assert_eq!(range.start(), 25);
        assert_eq!(range.end(), None);

        let range = EntryRange::parse("25-");
        assert_eq!(range, EntryRange::parse("25"));
    }

    #[test]
    fn test_parse_garbage_is_unbounded() {
        for text in ["", "INF", "abc", "-", "  "] {
            assert_eq!(EntryRange::parse(text), EntryRange::unbounded(), "{text:?}");
        }
    }

    #[test]
    fn test_parse_overflowing_end_falls_back_to_open_end() {
        let range = EntryRange::parse("2-99999999999999999999999999");
        assert_eq!(range.start(), 2);
        assert_eq!(range.end(), None);
    }

    #[test]
    fn test_parse_zero_start_clamps_to_one() {
        let range = EntryRange::parse("0-5");
        assert_eq!(range.start(), 1);
        assert_eq!(range.end(), Some(5));
    }

    #[test]
    fn test_parse_inverted_range_keeps_start_and_drops_end() {
        let range = EntryRange::parse("9-4");
        assert_eq!(range.start(), 9);
        assert_eq!(range.end(), None);
        assert!(!range.admits(8));
        assert!(range.admits(9));
        assert!(range.admits(40));
    }

    #[test]
    fn test_admits_is_inclusive() {
        let range = EntryRange::parse("4-9");
        assert!(!range.admits(3));
        assert!(range.admits(4));
        assert!(range.admits(9));
        assert!(!range.admits(10));
    }

    #[test]
    fn test_is_past_end() {
        let range = EntryRange::parse("4-9");
        assert!(!range.is_past_end(9));
        assert!(range.is_past_end(10));
        assert!(!EntryRange::unbounded().is_past_end(usize::MAX));
    }

    #[test]
    fn test_count_within() {
        assert_eq!(EntryRange::parse("4-9").count_within(12), 6);
        assert_eq!(EntryRange::parse("4-9").count_within(7), 4);
        assert_eq!(EntryRange::parse("20").count_within(12), 0);
        assert_eq!(EntryRange::unbounded().count_within(12), 12);
    }

    #[test]
    fn test_display() {
        assert_eq!(EntryRange::parse("4-9").to_string(), "4-9");
        assert_eq!(EntryRange::parse("3").to_string(), "3-END");
    }
}
