//! Error types for the version algebra, collector, and transformer pipeline.
//!
//! Parse errors reject at the API boundary with no partial state (§7 "Malformed
//! input"). Everything a running collection can hit instead accumulates as a
//! [`CollectionError`] on the result, per the non-fatal error model in §7.

use std::fmt;

use thiserror::Error;

use crate::model::Artifact;

/// Errors rejected eagerly at the API boundary: the caller gave us a string
/// that cannot be parsed into a version, range, constraint, or coordinate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid version {input:?}: {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("invalid version range {input:?}: {reason}")]
    InvalidVersionRange { input: String, reason: String },

    #[error("invalid version constraint {input:?}: {reason}")]
    InvalidVersionConstraint { input: String, reason: String },

    #[error("invalid artifact coordinate {input:?}: {reason}")]
    InvalidCoordinate { input: String, reason: String },
}

/// Errors accumulated during a single collection (§7). None of these abort
/// collection by themselves; `CollectResult::exceptions` holds the full list
/// and the caller decides whether a non-empty list is fatal.
#[derive(Debug, Clone, Error)]
pub enum CollectionError {
    /// The descriptor reader failed for an artifact; the node becomes a leaf.
    #[error("failed to read descriptor for {artifact}: {cause}")]
    ArtifactDescriptor { artifact: Artifact, cause: String },

    /// No version in the repository list satisfied a range, after filtering.
    #[error("no versions of {artifact} satisfy {constraint} (repositories: {repositories:?})")]
    VersionRange {
        artifact: Artifact,
        constraint: String,
        repositories: Vec<String>,
    },

    /// A conflict group had no version acceptable to every accumulated hard
    /// constraint (§4.H "Version selector").
    #[error("no version of {conflict_id} satisfies all constraints; {} candidate path(s)", .paths.len())]
    UnsolvableVersionConflict {
        conflict_id: String,
        paths: Vec<Vec<Artifact>>,
    },

    /// Cooperative cancellation between descriptor fetches (§5 "Cancellation").
    #[error("collection was cancelled")]
    Cancelled,
}

/// Accumulates [`CollectionError`]s over the course of one collection.
///
/// This is intentionally *not* a `Result`-returning accumulator: a collection
/// keeps going after most of these, so the aggregator is threaded through the
/// collector by `&mut` reference and drained into `CollectResult` at the end.
#[derive(Debug, Default, Clone)]
pub struct ErrorAggregator {
    errors: Vec<CollectionError>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: CollectionError) {
        tracing::warn!(%error, "accumulating non-fatal collection error");
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_vec(self) -> Vec<CollectionError> {
        self.errors
    }

    pub fn as_slice(&self) -> &[CollectionError] {
        &self.errors
    }
}

impl fmt::Display for ErrorAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "no errors");
        }
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}