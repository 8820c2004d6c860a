//! Role taxonomy, segment matching and best-match resolution
//!
//! Role strings follow a `resource:role:operation` naming scheme. The role
//! sub-segment is optional: `account:read` declares no sub-role, while
//! `account:admin:read` narrows the operation to the `admin` role.
//!
//! # Examples
//!
//! ```
//! use rolegate_authz::role::find_best_match;
//!
//! let required = ["account:admin:read", "account:read"];
//! let held = ["*:*:*"];
//!
//! let best = find_best_match(&required, &held).unwrap();
//! assert_eq!(best.required, "account:admin:read");
//! assert_eq!(best.weight, 6);
//! ```

mod types;
mod matcher;
mod resolver;


pub use types::{RoleTriple, Segment, SEPARATOR, WILDCARD};
pub use matcher::{match_segment, SegmentMatch};
pub use resolver::{find_best_match, match_pair, MatchCandidate, MAX_WEIGHT};
