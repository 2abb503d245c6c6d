//! Source spans (byte offsets into a source unit)
//!
//! Spans locate diagnostics and serve as stable keys for symbol bindings:
//! two distinct identifier occurrences always have distinct spans.

use serde::{Deserialize, Serialize};

/// A half-open byte range `start..end` into source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty span at offset zero (placeholder for synthesized nodes)
    pub fn empty() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no text
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Whether `other` lies entirely within this span
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let a = Span::new(4, 10);
        let b = Span::new(8, 20);
        assert_eq!(a.merge(b), Span::new(4, 20));
        assert_eq!(b.merge(a), Span::new(4, 20));
    }

    #[test]
    fn test_contains() {
        let outer = Span::new(0, 30);
        assert!(outer.contains(Span::new(5, 10)));
        assert!(outer.contains(outer));
        assert!(!outer.contains(Span::new(25, 31)));
    }

    #[test]
    fn test_len() {
        assert_eq!(Span::new(3, 8).len(), 5);
        assert!(Span::new(3, 3).is_empty());
    }
}
