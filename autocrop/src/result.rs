//! Search outcome and statistics.

use crate::rect::CropRect;

/// How a crop search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The best rectangle for the requested strategy.
    Found(CropRect),
    /// No canvas pixel is covered, there is nothing to crop to.
    NoCoverage,
    /// The caller cancelled the search before it finished.
    Cancelled,
}

impl SearchOutcome {
    /// The rectangle, if one was found.
    pub fn rect(&self) -> Option<CropRect> {
        match self {
            SearchOutcome::Found(rect) => Some(*rect),
            SearchOutcome::NoCoverage | SearchOutcome::Cancelled => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    /// Area of the found rectangle, zero otherwise.
    pub fn area(&self) -> u64 {
        self.rect().map_or(0, |rect| rect.area())
    }
}

impl std::fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchOutcome::Found(rect) => write!(f, "found {}", rect),
            SearchOutcome::NoCoverage => write!(f, "no covered pixels"),
            SearchOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Work done by one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Candidates popped from the queue and tested.
    pub candidates_processed: usize,
    /// Candidates pushed onto the queue, the seed included.
    pub candidates_queued: usize,
    /// Pixels whose coverage was computed from the footprints.
    pub pixels_evaluated: u64,
    /// The candidate budget ran out and the bounding box was swept.
    pub swept: bool,
}

/// Result of [`CropFinder::run`](crate::CropFinder::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_exposes_rect() {
        let outcome = SearchOutcome::Found(CropRect::new(40, 0, 60, 50));
        assert!(outcome.is_found());
        assert_eq!(outcome.rect(), Some(CropRect::new(40, 0, 60, 50)));
        assert_eq!(outcome.area(), 1000);
    }

    #[test]
    fn test_no_coverage_and_cancelled_are_distinct() {
        assert_ne!(SearchOutcome::NoCoverage, SearchOutcome::Cancelled);
        for outcome in [SearchOutcome::NoCoverage, SearchOutcome::Cancelled] {
            assert!(!outcome.is_found());
            assert_eq!(outcome.rect(), None);
            assert_eq!(outcome.area(), 0);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(SearchOutcome::Cancelled.to_string(), "cancelled");
        assert!(SearchOutcome::Found(CropRect::new(0, 0, 2, 3))
            .to_string()
            .contains("2x3"));
    }
}
