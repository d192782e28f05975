use std::cmp::Ordering;
use std::fmt;

use crate::error::ParseError;
use crate::version::item::{self, Item};

/// A parsed version under the generic version scheme (§4.A).
///
/// `Version` is immutable once parsed. It implements a total order via
/// [`Version::compare`] / `Ord`; equality is *defined* by that order rather
/// than by structural token equality, so `"1-alpha"` and `"1.0.0-alpha"` are
/// equal even though they tokenize to different-length sequences. Because of
/// that, `Version` intentionally does not implement `Hash` — callers needing
/// a hashable key should key on the canonical string form instead.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    items: Vec<Item>,
}

impl Version {
    /// Parses a version string under the generic scheme. Never fails: any
    /// input tokenizes to at least one segment (an all-separator or empty
    /// string parses to the numeric `0`). Kept fallible to mirror the other
    /// `parse*` entry points and to leave room for stricter schemes later.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        if raw.trim().is_empty() {
            return Err(ParseError::InvalidVersion {
                input: raw.to_string(),
                reason: "version string is empty".to_string(),
            });
        }
        Ok(Self {
            raw: raw.to_string(),
            items: item::tokenize(raw),
        })
    }

    /// The smallest version sharing `prefix`'s numeric segments (range
    /// shorthand `[M.N.*]`'s lower bound), per §4.A "Special final tokens".
    pub fn prefix_min(prefix: &str) -> Self {
        let mut items = item::tokenize(prefix);
        items.push(Item::Qualifier(item::Qualifier {
            rank: item::QualifierRank::Min,
            text: "min".to_string(),
        }));
        Self {
            raw: format!("{prefix}.min"),
            items,
        }
    }

    /// The largest version sharing `prefix`'s numeric segments (range
    /// shorthand `[M.N.*]`'s upper bound).
    pub fn prefix_max(prefix: &str) -> Self {
        let mut items = item::tokenize(prefix);
        items.push(Item::Qualifier(item::Qualifier {
            rank: item::QualifierRank::Max,
            text: "max".to_string(),
        }));
        Self {
            raw: format!("{prefix}.max"),
            items,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn compare(&self, other: &Version) -> Ordering {
        item::compare_items(&self.items, &other.items)
    }

    /// True iff this version's qualifier looks like a timestamped snapshot
    /// build number (`1.0-20110329.221805-4`), per §3's `baseVersion` note.
    pub fn is_timestamped_snapshot(&self) -> bool {
        snapshot_timestamp_split(&self.raw).is_some()
    }

    /// The snapshot-normalized version: `1.0-20110329.221805-4` becomes
    /// `1.0-SNAPSHOT` (§3 `baseVersion`). Versions that aren't timestamped
    /// snapshots are their own base version.
    pub fn base_version(&self) -> String {
        match snapshot_timestamp_split(&self.raw) {
            Some(release_prefix) => format!("{release_prefix}-SNAPSHOT"),
            None => self.raw.clone(),
        }
    }
}

/// Recognizes the Maven-style timestamped snapshot suffix
/// `-yyyyMMdd.HHmmss-buildNumber` and, if present, returns the version
/// string with that suffix stripped.
fn snapshot_timestamp_split(raw: &str) -> Option<&str> {
    let dash = raw.rfind('-')?;
    let (head, build) = raw.split_at(dash);
    let build = &build[1..];
    if build.is_empty() || !build.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let dash2 = head.rfind('-')?;
    let (release_prefix, stamp_and_time) = head.split_at(dash2);
    let stamp_and_time = &stamp_and_time[1..];
    let (date, time) = stamp_and_time.split_once('.')?;
    if date.len() == 8
        && time.len() == 6
        && date.chars().all(|c| c.is_ascii_digit())
        && time.chars().all(|c| c.is_ascii_digit())
    {
        Some(release_prefix)
    } else {
        None
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}
impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}
impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn qualifier_aliases_collapse() {
        assert_eq!(v("1-alpha"), v("1.0.0-alpha"));
        assert_eq!(v("1.0"), v("1.0-ga"));
        assert_eq!(v("1.0"), v("1.0-final"));
    }

    #[test]
    fn ordering_chain() {
        assert!(v("1.0-SNAPSHOT") < v("1.0"));
        assert!(v("1.0") < v("1.0-sp1"));
        assert!(v("1.0-sp1") < v("1.0.0.1"));
    }

    #[test]
    fn padded_comparison() {
        assert!(v("1.0-alpha") < v("1.0.1-ga"));
        assert_eq!(v("1.0.1-ga"), v("1.0.1"));
    }

    #[test]
    fn unknown_qualifier_sorts_after_sp() {
        assert!(v("1.0-sp") < v("1.0-zzz"));
    }

    #[test]
    fn base_version_strips_snapshot_timestamp() {
        assert_eq!(v("1.0-20110329.221805-4").base_version(), "1.0-SNAPSHOT");
        assert_eq!(v("1.0-SNAPSHOT").base_version(), "1.0-SNAPSHOT");
        assert_eq!(v("1.0").base_version(), "1.0");
    }

    #[test]
    fn total_order_is_antisymmetric_and_transitive() {
        let versions = ["1.0-alpha", "1.0-beta", "1.0", "1.0-sp1", "2.0"];
        for i in 0..versions.len() {
            for j in 0..versions.len() {
                let (a, b) = (v(versions[i]), v(versions[j]));
                assert_eq!(a.compare(&b).reverse(), b.compare(&a));
            }
        }
    }
}
