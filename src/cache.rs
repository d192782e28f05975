//! Session-scoped descriptor and version-range gateways (§4.C/§4.D):
//! `moka`-backed caches over the external reader/resolver, keyed by request
//! identity, with negative caching and per-key single-flight request
//! coalescing so N concurrent collectors asking for the same coordinate
//! trigger exactly one underlying fetch (§5 "Shared resource policy").

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use crate::error::CollectionError;
use crate::interfaces::{
    ArtifactDescriptorReader, DescriptorRequest, DescriptorResult, VersionRangeRequest,
    VersionRangeResolver, VersionRangeResult,
};

/// Cache sizing and lifetime for the descriptor and range gateways (§10.3).
/// Defaults favor bounded resource use over raw throughput.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub descriptor_ttl: Duration,
    pub descriptor_capacity: u64,
    pub range_ttl: Duration,
    pub range_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            descriptor_ttl: Duration::from_secs(300),
            descriptor_capacity: 10_000,
            range_ttl: Duration::from_secs(60),
            range_capacity: 10_000,
        }
    }
}

/// `(coordinate, repository list)` request identity (§4.C). Canonicalized
/// to strings since neither `Artifact` nor `Version` implements `Hash`
/// (see `version::Version`'s doc comment for why).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DescriptorKey {
    coordinate: String,
    repositories: Vec<String>,
}

impl From<&DescriptorRequest> for DescriptorKey {
    fn from(request: &DescriptorRequest) -> Self {
        Self {
            coordinate: request.artifact.to_string(),
            repositories: request.repositories.clone(),
        }
    }
}

/// Wraps an [`ArtifactDescriptorReader`] with a single-flight, negatively
/// cached lookup layer.
pub struct DescriptorGateway {
    reader: Arc<dyn ArtifactDescriptorReader>,
    cache: Cache<DescriptorKey, Arc<Result<DescriptorResult, CollectionError>>>,
}

impl DescriptorGateway {
    pub fn new(reader: Arc<dyn ArtifactDescriptorReader>, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.descriptor_capacity)
            .time_to_live(config.descriptor_ttl)
            .build();
        Self { reader, cache }
    }

    /// Reads the descriptor for `request`, serving from cache (hit or
    /// negative hit) when available. At most one underlying read is ever
    /// in flight per key: concurrent callers for the same key await the
    /// same `moka` entry-insertion future.
    pub async fn read(
        &self,
        request: DescriptorRequest,
    ) -> Result<DescriptorResult, CollectionError> {
        let key = DescriptorKey::from(&request);
        let reader = Arc::clone(&self.reader);
        let coordinate = request.artifact.to_string();

        let outcome = self
            .cache
            .get_with(key, async move {
                debug!(%coordinate, "descriptor cache miss, fetching");
                Arc::new(reader.read_artifact_descriptor(&request).await)
            })
            .await;

        if let Err(cause) = outcome.as_ref() {
            warn!(%cause, "serving cached descriptor failure");
        }
        (*outcome).clone()
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

/// `(groupId:artifactId, constraint, repository list)` request identity
/// (§4.D).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RangeKey {
    group_artifact: String,
    constraint: String,
    repositories: Vec<String>,
}

impl From<&VersionRangeRequest> for RangeKey {
    fn from(request: &VersionRangeRequest) -> Self {
        Self {
            group_artifact: format!("{}:{}", request.group_id, request.artifact_id),
            constraint: request.constraint.to_string(),
            repositories: request.repositories.clone(),
        }
    }
}

/// Wraps a [`VersionRangeResolver`] with the same single-flight, negatively
/// cached lookup semantics as [`DescriptorGateway`].
pub struct VersionRangeGateway {
    resolver: Arc<dyn VersionRangeResolver>,
    cache: Cache<RangeKey, Arc<Result<VersionRangeResult, CollectionError>>>,
}

impl VersionRangeGateway {
    pub fn new(resolver: Arc<dyn VersionRangeResolver>, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.range_capacity)
            .time_to_live(config.range_ttl)
            .build();
        Self { resolver, cache }
    }

    pub async fn resolve(
        &self,
        request: VersionRangeRequest,
    ) -> Result<VersionRangeResult, CollectionError> {
        let key = RangeKey::from(&request);
        let resolver = Arc::clone(&self.resolver);
        let group_artifact = key.group_artifact.clone();

        let outcome = self
            .cache
            .get_with(key, async move {
                debug!(%group_artifact, "version range cache miss, resolving");
                Arc::new(resolver.resolve_version_range(&request).await)
            })
            .await;

        if let Err(cause) = outcome.as_ref() {
            warn!(%cause, "serving cached version range failure");
        }
        (*outcome).clone()
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
