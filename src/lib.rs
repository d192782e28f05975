//! Core build-artifact dependency resolution: a generic version scheme,
//! a dependency collector, and a graph transformer pipeline that elects one
//! winner per conflicting coordinate, modeled on Maven-style resolution.
//!
//! This crate owns the algorithm only. Reading descriptor files, talking to
//! a transport, and on-disk repository layout are boundary interfaces
//! (`interfaces`) that a caller supplies.

pub mod cache;
pub mod collector;
pub mod error;
pub mod graph;
pub mod interfaces;
pub mod model;
pub mod policy;
pub mod transform;
pub mod version;

pub use cache::{CacheConfig, DescriptorGateway, VersionRangeGateway};
pub use collector::{CollectRequest, CollectResult, Collector, CollectorConfig, CollectorVariant};
pub use error::{CollectionError, ErrorAggregator, ParseError};
pub use graph::{CycleRecord, DependencyNode, Graph, GraphStats, NodeId};
pub use interfaces::{
    ArtifactDescriptorReader, DescriptorRequest, DescriptorResult, Listener, LocalRepositoryManager,
    NoopListener, Trace, VersionAndRepository, VersionRangeRequest, VersionRangeResolver,
    VersionRangeResult,
};
pub use model::{Artifact, Dependency, Exclusion, VersionlessId};
pub use policy::{
    ClassicDependencyManager, DependencyManager, DependencySelector, DependencyTraverser,
    DescentContext, ExclusionDependencySelector, Management, OptionalDependencySelector,
    ScopeDependencySelector, SnapshotVersionFilter, StaticDependencySelector,
    StaticDependencyTraverser, StaticVersionFilter, VersionFilter,
};
pub use transform::{
    default_pipeline, ChainedDependencyGraphTransformer, ConflictMarker, ConflictResolver,
    DependencyGraphTransformer, NoopDependencyGraphTransformer,
};
pub use version::{Bound, UnionVersionRange, Version, VersionConstraint, VersionRange};
