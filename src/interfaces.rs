//! The five boundary interfaces the core consumes but does not implement
//! (§6): descriptor reader, version range resolver, local repository
//! manager, trace context, and listener. Production wiring of these against
//! real repositories, transports, and on-disk layout is explicitly out of
//! scope (§1).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CollectionError;
use crate::model::{Artifact, Dependency};
use crate::version::VersionConstraint;

/// An opaque linked list of diagnostic context, propagated but never
/// interpreted by the core (§6.4).
#[derive(Debug, Clone, Default)]
pub struct Trace {
    data: Option<String>,
    parent: Option<Arc<Trace>>,
}

impl Trace {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            parent: Some(Arc::new(self.clone())),
        }
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn parent(&self) -> Option<&Trace> {
        self.parent.as_deref()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut frames = Vec::new();
        let mut cur = Some(self);
        while let Some(t) = cur {
            if let Some(d) = &t.data {
                frames.push(d.as_str());
            }
            cur = t.parent();
        }
        write!(f, "{}", frames.join(" <- "))
    }
}

/// Request for an artifact descriptor (§6.1).
#[derive(Debug, Clone)]
pub struct DescriptorRequest {
    pub artifact: Artifact,
    pub repositories: Vec<String>,
    pub trace: Trace,
}

/// The declared contents of an artifact descriptor, as returned by the
/// external reader: the (possibly relocated) effective artifact, its direct
/// dependencies, its dependency management, and additionally declared
/// repositories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorResult {
    pub effective_artifact: Option<Artifact>,
    pub relocations: Vec<Artifact>,
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
    pub repositories: Vec<String>,
}

/// Wraps the external component that parses descriptor files into
/// dependency declarations (§6.1). The core never reads a descriptor file
/// itself; it only consumes this trait.
#[async_trait]
pub trait ArtifactDescriptorReader: Send + Sync {
    async fn read_artifact_descriptor(
        &self,
        request: &DescriptorRequest,
    ) -> Result<DescriptorResult, CollectionError>;
}

/// Request for the set of versions satisfying a constraint (§6.2).
#[derive(Debug, Clone)]
pub struct VersionRangeRequest {
    pub group_id: String,
    pub artifact_id: String,
    pub constraint: VersionConstraint,
    pub repositories: Vec<String>,
    pub trace: Trace,
}

/// A version found by range resolution, tagged with the repository that
/// supplied it (used to break ties between candidates of equal version,
/// per §4.F step 3: "ties broken by source repository order").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionAndRepository {
    pub version: crate::version::Version,
    pub repository: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionRangeResult {
    /// Ascending order, per §6.2.
    pub versions: Vec<VersionAndRepository>,
}

/// Wraps the external metadata resolver (§6.2).
#[async_trait]
pub trait VersionRangeResolver: Send + Sync {
    async fn resolve_version_range(
        &self,
        request: &VersionRangeRequest,
    ) -> Result<VersionRangeResult, CollectionError>;
}

/// Consulted only to decide whether range resolution can short-circuit
/// offline (§6.3). The core never writes through this trait.
pub trait LocalRepositoryManager: Send + Sync {
    fn find(&self, artifact: &Artifact) -> Option<std::path::PathBuf>;
}

/// Fire-and-forget collection event observer (§6.5). Must never affect
/// control flow; the default implementation does nothing.
pub trait Listener: Send + Sync {
    fn node_added(&self, artifact: &Artifact) {
        let _ = artifact;
    }
    fn node_resolved(&self, artifact: &Artifact) {
        let _ = artifact;
    }
    fn conflict_detected(&self, versionless_id: &str, winner: &Artifact) {
        let _ = (versionless_id, winner);
    }
}

/// The default no-op listener (§10.5).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl Listener for NoopListener {}
