//! Weighted best-match resolution
//!
//! Enumerates every `(required, held)` pair, keeps the pairs whose three
//! segments all match and returns the most specific one.

use super::matcher::match_segment;
use super::types::RoleTriple;

/// Weight of an exact three-segment match
pub const MAX_WEIGHT: u8 = 9;

/// A satisfying `(required, held)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate<'a> {
    /// The required role string
    pub required: &'a str,
    /// The held role string that satisfied it
    pub held: &'a str,
    /// Specificity score, higher is more specific
    pub weight: u8,
}

/// Matches a single required role against a single held role
///
/// Returns `None` unless the resource, role and operation segments all match.
pub fn match_pair<'a>(required: &'a str, held: &'a str) -> Option<MatchCandidate<'a>> {
    score(&RoleTriple::parse(required), &RoleTriple::parse(held)).map(|weight| MatchCandidate {
        required,
        held,
        weight,
    })
}

fn score(required: &RoleTriple<'_>, held: &RoleTriple<'_>) -> Option<u8> {
    let segments = [
        match_segment(required.resource, held.resource, false),
        match_segment(required.role, held.role, true),
        match_segment(required.operation, held.operation, false),
    ];

    if !segments.iter().all(|s| s.matched) {
        return None;
    }

    let penalty: u8 = segments.iter().map(|s| s.penalty()).sum();
    Some(MAX_WEIGHT.saturating_sub(penalty))
}

/// Finds the most specific satisfying pair
///
/// Pairs are enumerated with `required` as the outer loop and `held` as the
/// inner loop, both in the given order. On equal weight the earliest pair
/// wins. Returns `None` when no pair matches, which callers treat as a
/// denial.
///
/// # Examples
///
/// ```
/// use rolegate_authz::role::find_best_match;
///
/// // A lone `*` is not a universal grant: its operation segment is empty.
/// assert!(find_best_match(&["account:read"], &["*"]).is_none());
///
/// let best = find_best_match(&["account:read"], &["*:*:*"]).unwrap();
/// assert_eq!(best.required, "account:read");
/// ```
pub fn find_best_match<'a, R, H>(required: &'a [R], held: &'a [H]) -> Option<MatchCandidate<'a>>
where
    R: AsRef<str>,
    H: AsRef<str>,
{
    let held_triples: Vec<(&'a str, RoleTriple<'a>)> = held
        .iter()
        .map(|h| (h.as_ref(), RoleTriple::parse(h.as_ref())))
        .collect();

    let mut best: Option<MatchCandidate<'a>> = None;

    for required in required.iter().map(|r| r.as_ref()) {
        let required_triple = RoleTriple::parse(required);

        for &(held, held_triple) in &held_triples {
            let Some(weight) = score(&required_triple, &held_triple) else {
                continue;
            };

            if best.map_or(true, |b| weight > b.weight) {
                best = Some(MatchCandidate {
                    required,
                    held,
                    weight,
                });
            }
        }
    }

    best
}
