//! Per-segment wildcard matching

use super::types::Segment;

/// Outcome of comparing one required segment against one held segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentMatch {
    /// Whether the two segments are compatible
    pub matched: bool,
    /// Number of sides that are `*` (0..=2)
    pub wildcards: u8,
    /// Number of sides that declared no sub-role (0..=2)
    pub absences: u8,
}

impl SegmentMatch {
    /// Specificity penalty contributed by this segment
    pub fn penalty(&self) -> u8 {
        self.wildcards + self.absences
    }
}

/// Compares a required segment with a held segment
///
/// Segments match when they are equal, or when one side is `*` and the other
/// carries a value. With `relaxed_absence` (used for the role segment only) a
/// `*` also matches a side that declared no sub-role.
pub fn match_segment(required: Segment<'_>, held: Segment<'_>, relaxed_absence: bool) -> SegmentMatch {
    let wildcard_stands_in = |wild: Segment<'_>, other: Segment<'_>| {
        wild.is_wildcard() && (relaxed_absence || !other.is_absent())
    };

    let matched = required == held
        || wildcard_stands_in(required, held)
        || wildcard_stands_in(held, required);

    SegmentMatch {
        matched,
        wildcards: u8::from(required.is_wildcard()) + u8::from(held.is_wildcard()),
        absences: u8::from(required.is_absent()) + u8::from(held.is_absent()),
    }
}
