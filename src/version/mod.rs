//! The version algebra (§4.A): a generic version scheme with a custom total
//! ordering, version ranges, and version constraints.
//!
//! This is deliberately **not** built on the `semver` crate. The scheme here
//! accepts arbitrary `.`/`-`/`_`-delimited segments, qualifier aliases
//! (`alpha`=`a`, `cr`=`rc`, ...), and interval range syntax (`[1.0,2.0)`)
//! that SemVer 2.0 has no notion of; see `DESIGN.md` for the dependency this
//! displaced.

mod constraint;
mod item;
mod range;
mod version;

pub use constraint::VersionConstraint;
pub use range::{Bound, UnionVersionRange, VersionRange};
pub use version::Version;
