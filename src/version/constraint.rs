use std::fmt;

use crate::error::ParseError;
use crate::version::range::{UnionVersionRange, VersionRange};
use crate::version::version::Version;

/// Either a *soft* constraint (a preferred version, no bounds) or a *hard*
/// constraint (one or more ranges), per §3 "VersionConstraint".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    Soft(Version),
    Hard(UnionVersionRange),
}

impl VersionConstraint {
    /// Parses a constraint: `[1.0,2.0)` / `[1.0,1.2],[1.5,2.0)` (hard, one or
    /// more comma-joined ranges) or a bare `1.0` (soft).
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseError::InvalidVersionConstraint {
                input: raw.to_string(),
                reason: "constraint is empty".to_string(),
            });
        }
        if trimmed.starts_with('[') || trimmed.starts_with('(') {
            let chunks = split_top_level_ranges(trimmed);
            if chunks.is_empty() {
                return Err(ParseError::InvalidVersionConstraint {
                    input: raw.to_string(),
                    reason: "no ranges found".to_string(),
                });
            }
            let mut members = Vec::with_capacity(chunks.len());
            for chunk in chunks {
                members.push(VersionRange::parse(&chunk).map_err(|e| {
                    ParseError::InvalidVersionConstraint {
                        input: raw.to_string(),
                        reason: format!("{e}"),
                    }
                })?);
            }
            Ok(VersionConstraint::Hard(UnionVersionRange::new(members)))
        } else {
            let v = Version::parse(trimmed).map_err(|e| ParseError::InvalidVersionConstraint {
                input: raw.to_string(),
                reason: format!("{e}"),
            })?;
            Ok(VersionConstraint::Soft(v))
        }
    }

    pub fn is_hard(&self) -> bool {
        matches!(self, VersionConstraint::Hard(_))
    }

    pub fn get_range(&self) -> Option<&UnionVersionRange> {
        match self {
            VersionConstraint::Hard(r) => Some(r),
            VersionConstraint::Soft(_) => None,
        }
    }

    pub fn get_version(&self) -> Option<&Version> {
        match self {
            VersionConstraint::Soft(v) => Some(v),
            VersionConstraint::Hard(_) => None,
        }
    }

    /// A soft constraint has no bounds by definition, so it accepts every
    /// version (§4.A: "true ... iff v equals the preferred version OR the
    /// constraint has no bounds at all" — always the latter, for a soft
    /// constraint). A hard constraint defers to its range union.
    pub fn contains_version(&self, v: &Version) -> bool {
        match self {
            VersionConstraint::Soft(_) => true,
            VersionConstraint::Hard(range) => range.contains_version(v),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Soft(v) => write!(f, "{v}"),
            VersionConstraint::Hard(r) => write!(f, "{r}"),
        }
    }
}

/// Splits `"[1.0,1.2],[1.5,2.0)"` into `["[1.0,1.2]", "[1.5,2.0)"]`: a comma
/// only separates ranges when it appears outside an open bracket pair.
fn split_top_level_ranges(s: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut open = false;

    for ch in s.chars() {
        match ch {
            '[' | '(' => {
                open = true;
                current.push(ch);
            }
            ']' | ')' => {
                open = false;
                current.push(ch);
            }
            ',' if !open => {
                if !current.trim().is_empty() {
                    chunks.push(current.trim().to_string());
                }
                current.clear();
            }
            c => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn soft_constraint_accepts_any_version() {
        let c = VersionConstraint::parse("1.0").unwrap();
        assert!(!c.is_hard());
        assert_eq!(c.get_version(), Some(&v("1.0")));
        assert!(c.contains_version(&v("99.0")));
    }

    #[test]
    fn hard_constraint_is_a_union_of_ranges() {
        let c = VersionConstraint::parse("[1.0,1.2],[1.5,2.0)").unwrap();
        assert!(c.is_hard());
        assert!(c.contains_version(&v("1.1")));
        assert!(c.contains_version(&v("1.5")));
        assert!(!c.contains_version(&v("1.3")));
        assert!(!c.contains_version(&v("2.0")));
    }

    #[test]
    fn rejects_malformed_constraints() {
        assert!(VersionConstraint::parse("").is_err());
        assert!(VersionConstraint::parse("[1.0,").is_err());
    }
}
