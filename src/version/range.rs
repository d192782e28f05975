use std::fmt;

use crate::error::ParseError;
use crate::version::version::Version;

/// One endpoint of a [`VersionRange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    Inclusive(Version),
    Exclusive(Version),
    Unbounded,
}

impl Bound {
    fn satisfies_as_lower(&self, v: &Version) -> bool {
        match self {
            Bound::Unbounded => true,
            Bound::Inclusive(b) => v >= b,
            Bound::Exclusive(b) => v > b,
        }
    }

    fn satisfies_as_upper(&self, v: &Version) -> bool {
        match self {
            Bound::Unbounded => true,
            Bound::Inclusive(b) => v <= b,
            Bound::Exclusive(b) => v < b,
        }
    }

    fn version(&self) -> Option<&Version> {
        match self {
            Bound::Unbounded => None,
            Bound::Inclusive(v) | Bound::Exclusive(v) => Some(v),
        }
    }
}

/// A single `[a,b]`/`(a,b)`/`[a,b)`/`(a,b]` interval, or the `[M.N.*]`
/// shorthand, per §4.A "Range grammar".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    lower: Bound,
    upper: Bound,
}

impl VersionRange {
    pub fn new(lower: Bound, upper: Bound) -> Self {
        Self { lower, upper }
    }

    /// An exact pin: `[v,v]`, used for `[1.0]` and for expanding a bare
    /// version recommendation into an enforced range.
    pub fn exact(v: Version) -> Self {
        Self {
            lower: Bound::Inclusive(v.clone()),
            upper: Bound::Inclusive(v),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| ParseError::InvalidVersionRange {
            input: raw.to_string(),
            reason: reason.to_string(),
        };

        let mut chars = trimmed.chars();
        let open = chars.next().ok_or_else(|| invalid("empty range"))?;
        let close = trimmed
            .chars()
            .last()
            .ok_or_else(|| invalid("empty range"))?;

        let lower_inclusive = match open {
            '[' => true,
            '(' => false,
            _ => return Err(invalid("range must start with '[' or '('")),
        };
        let upper_inclusive = match close {
            ']' => true,
            ')' => false,
            _ => return Err(invalid("range must end with ']' or ')'")),
        };
        if trimmed.len() < 2 {
            return Err(invalid("range body is empty"));
        }
        let body = &trimmed[1..trimmed.len() - 1];

        // `[M.N.*]` shorthand: a single endpoint ending in `.*`.
        if let Some(prefix) = body.strip_suffix(".*") {
            if prefix.is_empty() {
                return Err(invalid("'.*' shorthand needs a version prefix"));
            }
            return Ok(Self {
                lower: Bound::Inclusive(Version::prefix_min(prefix)),
                upper: Bound::Inclusive(Version::prefix_max(prefix)),
            });
        }

        let (lower_raw, upper_raw) = match body.split_once(',') {
            Some(parts) => parts,
            None => (body, body),
        };

        let lower = parse_endpoint(lower_raw, lower_inclusive, &invalid)?;
        let upper = parse_endpoint(upper_raw, upper_inclusive, &invalid)?;
        Ok(Self { lower, upper })
    }

    pub fn contains_version(&self, v: &Version) -> bool {
        self.lower.satisfies_as_lower(v) && self.upper.satisfies_as_upper(v)
    }

    pub fn lower_bound(&self) -> &Bound {
        &self.lower
    }

    pub fn upper_bound(&self) -> &Bound {
        &self.upper
    }
}

fn parse_endpoint(
    raw: &str,
    inclusive: bool,
    invalid: &dyn Fn(&str) -> ParseError,
) -> Result<Bound, ParseError> {
    if raw.trim().is_empty() {
        return Ok(Bound::Unbounded);
    }
    let v = Version::parse(raw.trim()).map_err(|_| invalid("malformed endpoint version"))?;
    Ok(if inclusive {
        Bound::Inclusive(v)
    } else {
        Bound::Exclusive(v)
    })
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, lo) = match &self.lower {
            Bound::Inclusive(v) => ('[', v.to_string()),
            Bound::Exclusive(v) => ('(', v.to_string()),
            Bound::Unbounded => ('(', String::new()),
        };
        let (close, hi) = match &self.upper {
            Bound::Inclusive(v) => (']', v.to_string()),
            Bound::Exclusive(v) => (')', v.to_string()),
            Bound::Unbounded => (')', String::new()),
        };
        write!(f, "{open}{lo},{hi}{close}")
    }
}

/// A set union of [`VersionRange`]s. `containsVersion` is true iff any member
/// range contains the version; the union's bounds are the extrema across
/// members (§3 "VersionRange").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionVersionRange {
    members: Vec<VersionRange>,
}

impl UnionVersionRange {
    pub fn new(members: Vec<VersionRange>) -> Self {
        Self { members }
    }

    pub fn single(range: VersionRange) -> Self {
        Self {
            members: vec![range],
        }
    }

    pub fn members(&self) -> &[VersionRange] {
        &self.members
    }

    pub fn contains_version(&self, v: &Version) -> bool {
        self.members.iter().any(|r| r.contains_version(v))
    }

    /// The lowest lower bound across every member, or `None` for an empty
    /// union. Unbounded beats every finite bound.
    pub fn lower_bound(&self) -> Option<&Bound> {
        self.members.iter().map(|r| r.lower_bound()).min_by(
            |a, b| match (a.version(), b.version()) {
                (None, None) => std::cmp::Ordering::Equal,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (Some(_), None) => std::cmp::Ordering::Greater,
                (Some(x), Some(y)) => x.cmp(y),
            },
        )
    }

    /// The highest upper bound across every member, or `None` for an empty
    /// union. Unbounded beats every finite bound.
    pub fn upper_bound(&self) -> Option<&Bound> {
        self.members.iter().map(|r| r.upper_bound()).max_by(
            |a, b| match (a.version(), b.version()) {
                (None, None) => std::cmp::Ordering::Equal,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (Some(_), None) => std::cmp::Ordering::Less,
                (Some(x), Some(y)) => x.cmp(y),
            },
        )
    }
}

impl fmt::Display for UnionVersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.members.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", rendered.join(","))
    }
}
