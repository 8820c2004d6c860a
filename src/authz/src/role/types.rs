//! Role string parsing
//!
//! Splits a colon-delimited role string into its resource, role and
//! operation segments without allocating.

use std::fmt;

/// Segment separator inside a role string
pub const SEPARATOR: char = ':';

/// Token matching any concrete value of a segment
pub const WILDCARD: &str = "*";

/// One segment of a parsed role string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment<'a> {
    /// The `*` token
    Wildcard,
    /// No role sub-segment was declared
    ///
    /// Only ever produced for the role segment. It cannot collide with a
    /// real token because it is not a string value.
    Absent,
    /// A literal token, possibly empty
    Value(&'a str),
}

impl<'a> Segment<'a> {
    fn from_token(token: &'a str) -> Self {
        if token == WILDCARD {
            Self::Wildcard
        } else {
            Self::Value(token)
        }
    }

    /// Returns whether this segment is the `*` token
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    /// Returns whether this segment is the "no sub-role" marker
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str(WILDCARD),
            Self::Absent => Ok(()),
            Self::Value(value) => f.write_str(value),
        }
    }
}

/// A role string split into `{resource, role, operation}`
///
/// Parsing is total: every input, including the empty string, yields a
/// triple.
///
/// - `account` → resource `account`, no role, operation `""`
/// - `account:read` → resource `account`, no role, operation `read`
/// - `account:admin:read` → resource `account`, role `admin`, operation `read`
/// - `account:admin:read:all` → operation `read:all`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleTriple<'a> {
    pub resource: Segment<'a>,
    pub role: Segment<'a>,
    pub operation: Segment<'a>,
}

impl<'a> RoleTriple<'a> {
    /// Parses a role string
    pub fn parse(role: &'a str) -> Self {
        let (resource, rest) = role.split_once(SEPARATOR).unwrap_or((role, ""));

        // Three or more tokens carry a role sub-segment; the operation is
        // everything after it.
        let (role, operation) = match rest.split_once(SEPARATOR) {
            Some((role, operation)) => (Segment::from_token(role), operation),
            None => (Segment::Absent, rest),
        };

        Self {
            resource: Segment::from_token(resource),
            role,
            operation: Segment::from_token(operation),
        }
    }

    /// Returns whether every segment is the `*` token
    pub fn is_unconditional(&self) -> bool {
        self.resource.is_wildcard() && self.role.is_wildcard() && self.operation.is_wildcard()
    }
}

impl fmt::Display for RoleTriple<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            Segment::Absent => write!(f, "{}{SEPARATOR}{}", self.resource, self.operation),
            role => write!(
                f,
                "{}{SEPARATOR}{role}{SEPARATOR}{}",
                self.resource, self.operation
            ),
        }
    }
}
