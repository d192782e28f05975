//! The dependency collector (§4.F): expands a `CollectRequest` into a raw
//! [`Graph`] by repeatedly resolving version constraints, fetching
//! descriptors, and applying the collection policies from [`crate::policy`].
//!
//! Per the open design question in §9, this implements the simpler
//! depth-first variant as the primary algorithm and a breadth-first variant
//! that shares the same per-edge resolution step (`resolve_edge`), rather
//! than guessing at whether the "skip-and-reconcile" optimization is
//! strictly required; see `DESIGN.md`. Reconciliation itself is not
//! implemented: a pool hit reuses the existing subtree outright, which is
//! sound but can leave a once-shallower subtree under-expanded relative to
//! the version conflict resolution eventually picks (documented as an
//! accepted simplification, not a guess at intent).

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::cache::{CacheConfig, DescriptorGateway, VersionRangeGateway};
use crate::error::{CollectionError, ErrorAggregator};
use crate::graph::{DependencyNode, Graph, GraphStats, NodeId};
use crate::interfaces::{
    ArtifactDescriptorReader, DescriptorRequest, DescriptorResult, Listener, NoopListener, Trace,
    VersionRangeRequest, VersionRangeResolver,
};
use crate::model::{Artifact, Dependency, VersionlessId};
use crate::policy::{
    ClassicDependencyManager, DependencyManager, DependencySelector, DependencyTraverser,
    DescentContext, ExclusionDependencySelector, Management, StaticDependencyTraverser,
    StaticVersionFilter, VersionFilter,
};
use crate::version::{Version, VersionConstraint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorVariant {
    DepthFirst,
    BreadthFirst,
}

/// Collector-wide tuning (§10.3). Defaults favor determinism over
/// throughput, per §9's "simpler depth-first variant first" guidance.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub variant: CollectorVariant,
    pub max_parallel_fetches: usize,
    pub cache: CacheConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            variant: CollectorVariant::DepthFirst,
            max_parallel_fetches: num_cpus::get().max(1),
            cache: CacheConfig::default(),
        }
    }
}

/// A collection request (§4.F "Input"): either a root dependency, or a root
/// artifact plus its direct dependencies.
pub struct CollectRequest {
    pub root_dependency: Option<Dependency>,
    pub root_artifact: Option<Artifact>,
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
    pub repositories: Vec<String>,
    pub trace: Trace,
}

/// A collection's output (§4.F "Output"): the raw graph, cycle records
/// (mirrored on `graph.cycles`), and every non-fatal error accumulated
/// along the way.
pub struct CollectResult {
    pub graph: Graph,
    pub exceptions: Vec<CollectionError>,
}

impl CollectResult {
    pub fn stats(&self) -> GraphStats {
        self.graph.stats(0)
    }
}

/// One pending edge's resolved policy set, threaded down the recursion.
#[derive(Clone)]
struct Policies {
    selector: Arc<dyn DependencySelector>,
    manager: Arc<dyn DependencyManager>,
    traverser: Arc<dyn DependencyTraverser>,
    filter: Arc<dyn VersionFilter>,
}

impl Policies {
    fn classic() -> Self {
        Self {
            selector: Arc::new(ExclusionDependencySelector::new()),
            manager: Arc::new(ClassicDependencyManager::new()),
            traverser: Arc::new(StaticDependencyTraverser(true)),
            filter: Arc::new(StaticVersionFilter),
        }
    }

    fn derive_for_child(&self, context: &DescentContext, declared_management: &[Dependency]) -> Self {
        Self {
            selector: Arc::clone(&self.selector).derive_child_selector(context),
            manager: Arc::clone(&self.manager).derive_child_manager(context, declared_management),
            traverser: Arc::clone(&self.traverser).derive_child_traverser(context),
            filter: Arc::clone(&self.filter).derive_child_filter(context),
        }
    }
}

/// Dedup key for the collector's node pool (§4.F step 2): identical inputs
/// must reuse the same subtree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PoolKey {
    versionless_id: String,
    constraint: String,
    scope: String,
    optional: bool,
    exclusions: String,
}

fn pool_key_for(artifact: &Artifact, dependency: &Dependency) -> PoolKey {
    let mut exclusions: Vec<String> = dependency
        .exclusions()
        .iter()
        .map(|e| format!("{}:{}:{}:{}", e.group_id, e.artifact_id, e.extension, e.classifier))
        .collect();
    exclusions.sort();
    PoolKey {
        versionless_id: artifact.versionless_id().to_string(),
        constraint: dependency.version_constraint().to_string(),
        scope: dependency.scope().to_string(),
        optional: dependency.is_optional(),
        exclusions: exclusions.join(","),
    }
}

/// A pending edge, queued for the breadth-first variant: the arena parent
/// it attaches to, plus everything `resolve_edge` needs.
struct PendingEdge {
    parent: NodeId,
    dependency: Dependency,
    policies: Policies,
    repositories: Vec<String>,
    depth: usize,
    ancestors: Vec<(VersionlessId, NodeId)>,
}

/// The outcome of resolving one edge (§4.F steps 3-6), before its children
/// (if any) have been collected.
enum EdgeOutcome {
    Excluded,
    /// A pool hit: the existing subtree is reused outright (§4.F step 7).
    Reused(NodeId),
    New {
        id: NodeId,
        expand: bool,
        child_dependencies: Vec<Dependency>,
        child_policies: Policies,
        child_repositories: Vec<String>,
        child_ancestors: Vec<(VersionlessId, NodeId)>,
    },
}

/// Expands a [`CollectRequest`] into a raw [`Graph`] using the descriptor
/// and version-range gateways plus the collection policies (§4.F).
pub struct Collector {
    descriptor_gateway: Arc<DescriptorGateway>,
    range_gateway: Arc<VersionRangeGateway>,
    listener: Arc<dyn Listener>,
    config: CollectorConfig,
    fetch_permits: Arc<Semaphore>,
}

impl Collector {
    pub fn new(
        descriptor_reader: Arc<dyn ArtifactDescriptorReader>,
        range_resolver: Arc<dyn VersionRangeResolver>,
        config: CollectorConfig,
    ) -> Self {
        let fetch_permits = Arc::new(Semaphore::new(config.max_parallel_fetches.max(1)));
        Self {
            descriptor_gateway: Arc::new(DescriptorGateway::new(descriptor_reader, &config.cache)),
            range_gateway: Arc::new(VersionRangeGateway::new(range_resolver, &config.cache)),
            listener: Arc::new(NoopListener),
            config,
            fetch_permits,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn Listener>) -> Self {
        self.listener = listener;
        self
    }

    pub async fn collect(&self, request: CollectRequest) -> CollectResult {
        match self.config.variant {
            CollectorVariant::DepthFirst => self.collect_depth_first(request).await,
            CollectorVariant::BreadthFirst => self.collect_breadth_first(request).await,
        }
    }

    fn synthetic_root(request: &CollectRequest) -> (DependencyNode, Vec<Dependency>) {
        if let Some(root_dep) = &request.root_dependency {
            (
                DependencyNode::new_root(root_dep.artifact().clone()),
                vec![root_dep.clone()],
            )
        } else {
            let artifact = request
                .root_artifact
                .clone()
                .expect("CollectRequest needs a root_dependency or root_artifact");
            (DependencyNode::new_root(artifact), request.dependencies.clone())
        }
    }

    fn root_policies(managed_dependencies: &[Dependency]) -> Policies {
        let bootstrap_context = DescentContext {
            depth: 0,
            dependency: Dependency::new(Artifact::new("", "", Version::parse("0").unwrap()), ""),
        };
        Policies::classic().derive_for_child(&bootstrap_context, managed_dependencies)
    }

    async fn collect_depth_first(&self, request: CollectRequest) -> CollectResult {
        info!("starting depth-first collection");
        let (mut root, direct_dependencies) = Self::synthetic_root(&request);
        root.repositories = request.repositories.clone();
        let mut graph = Graph::new(root);
        let mut pool: HashMap<PoolKey, NodeId> = HashMap::new();
        let mut exceptions = ErrorAggregator::new();
        let policies = Self::root_policies(&request.managed_dependencies);
        let root_id = graph.root();
        let root_ancestors = vec![(graph.root_versionless_id(), root_id)];

        let mut children = Vec::new();
        for dependency in direct_dependencies {
            if let Some(id) = self
                .collect_df(
                    dependency,
                    policies.clone(),
                    request.repositories.clone(),
                    1,
                    root_ancestors.clone(),
                    &mut graph,
                    &mut pool,
                    &mut exceptions,
                    &request.trace,
                )
                .await
            {
                children.push(id);
            }
        }
        graph.get_mut(root_id).children = children;
        info!(nodes = graph.node_count(), "depth-first collection finished");
        CollectResult {
            graph,
            exceptions: exceptions.into_vec(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_df<'a>(
        &'a self,
        dependency: Dependency,
        policies: Policies,
        repositories: Vec<String>,
        depth: usize,
        ancestors: Vec<(VersionlessId, NodeId)>,
        graph: &'a mut Graph,
        pool: &'a mut HashMap<PoolKey, NodeId>,
        exceptions: &'a mut ErrorAggregator,
        trace: &'a Trace,
    ) -> Pin<Box<dyn Future<Output = Option<NodeId>> + Send + 'a>> {
        Box::pin(async move {
            match self
                .resolve_edge(dependency, policies, repositories, depth, ancestors, graph, pool, exceptions, trace)
                .await
            {
                EdgeOutcome::Excluded => None,
                EdgeOutcome::Reused(id) => Some(id),
                EdgeOutcome::New {
                    id,
                    expand,
                    child_dependencies,
                    child_policies,
                    child_repositories,
                    child_ancestors,
                } => {
                    if expand {
                        let mut children = Vec::with_capacity(child_dependencies.len());
                        for child_dependency in child_dependencies {
                            if let Some(child_id) = self
                                .collect_df(
                                    child_dependency,
                                    child_policies.clone(),
                                    child_repositories.clone(),
                                    depth + 1,
                                    child_ancestors.clone(),
                                    graph,
                                    pool,
                                    exceptions,
                                    trace,
                                )
                                .await
                            {
                                children.push(child_id);
                            }
                        }
                        graph.get_mut(id).children = children;
                    }
                    Some(id)
                }
            }
        })
    }

    async fn collect_breadth_first(&self, request: CollectRequest) -> CollectResult {
        info!("starting breadth-first collection");
        let (mut root, direct_dependencies) = Self::synthetic_root(&request);
        root.repositories = request.repositories.clone();
        let mut graph = Graph::new(root);
        let mut pool: HashMap<PoolKey, NodeId> = HashMap::new();
        let mut exceptions = ErrorAggregator::new();
        let policies = Self::root_policies(&request.managed_dependencies);
        let root_id = graph.root();
        let root_ancestors = vec![(graph.root_versionless_id(), root_id)];

        let mut queue: VecDeque<PendingEdge> = direct_dependencies
            .into_iter()
            .map(|dependency| PendingEdge {
                parent: root_id,
                dependency,
                policies: policies.clone(),
                repositories: request.repositories.clone(),
                depth: 1,
                ancestors: root_ancestors.clone(),
            })
            .collect();

        while !queue.is_empty() {
            let level: Vec<PendingEdge> = queue.drain(..).collect();
            for edge in level {
                let PendingEdge {
                    parent,
                    dependency,
                    policies,
                    repositories,
                    depth,
                    ancestors,
                } = edge;
                match self
                    .resolve_edge(
                        dependency,
                        policies,
                        repositories,
                        depth,
                        ancestors,
                        &mut graph,
                        &mut pool,
                        &mut exceptions,
                        &request.trace,
                    )
                    .await
                {
                    EdgeOutcome::Excluded => {}
                    EdgeOutcome::Reused(id) => graph.get_mut(parent).children.push(id),
                    EdgeOutcome::New {
                        id,
                        expand,
                        child_dependencies,
                        child_policies,
                        child_repositories,
                        child_ancestors,
                    } => {
                        graph.get_mut(parent).children.push(id);
                        if expand {
                            for child_dependency in child_dependencies {
                                queue.push_back(PendingEdge {
                                    parent: id,
                                    dependency: child_dependency,
                                    policies: child_policies.clone(),
                                    repositories: child_repositories.clone(),
                                    depth: depth + 1,
                                    ancestors: child_ancestors.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }

        info!(nodes = graph.node_count(), "breadth-first collection finished");
        CollectResult {
            graph,
            exceptions: exceptions.into_vec(),
        }
    }

    /// Resolves one pending edge (§4.F steps 3-6): management, selection,
    /// cycle detection, pool dedup, version resolution, and the descriptor
    /// fetch (with relocation). Does not recurse into children — the two
    /// collector variants each decide how and when to do that, so that
    /// only this method needs to stay byte-for-byte consistent between them
    /// (§8 "Determinism").
    #[allow(clippy::too_many_arguments)]
    async fn resolve_edge(
        &self,
        dependency: Dependency,
        policies: Policies,
        repositories: Vec<String>,
        depth: usize,
        ancestors: Vec<(VersionlessId, NodeId)>,
        graph: &mut Graph,
        pool: &mut HashMap<PoolKey, NodeId>,
        exceptions: &mut ErrorAggregator,
        trace: &Trace,
    ) -> EdgeOutcome {
        let dependency = self.apply_management(&policies.manager, dependency);
        if !policies.selector.select_dependency(&dependency) {
            debug!(dependency = %dependency, "edge excluded by selector");
            return EdgeOutcome::Excluded;
        }

        let versionless_id = dependency.artifact().versionless_id();
        if let Some((_, ancestor_id)) = ancestors.iter().find(|(id, _)| *id == versionless_id) {
            warn!(%versionless_id, "cycle detected, not expanding");
            let parent_id = ancestors.last().map(|(_, id)| *id).unwrap_or(*ancestor_id);
            graph.record_cycle(parent_id, *ancestor_id);
            return EdgeOutcome::Excluded;
        }

        let key = pool_key_for(dependency.artifact(), &dependency);
        if let Some(&existing) = pool.get(&key) {
            debug!(%versionless_id, "reusing pooled subtree");
            return EdgeOutcome::Reused(existing);
        }

        let candidate = match self
            .resolve_candidate_version(&dependency, &repositories, &policies.filter, trace)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "version range resolution failed");
                exceptions.push(e);
                return EdgeOutcome::Excluded;
            }
        };

        let artifact = dependency.artifact().clone().with_version(candidate);
        let (effective_artifact, descriptor, relocations) =
            match self.fetch_with_relocation(artifact, &repositories, trace).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "descriptor fetch failed, node becomes a leaf");
                    exceptions.push(e);
                    let leaf = DependencyNode::new_child(dependency.clone(), dependency.artifact().clone(), depth);
                    let id = graph.alloc(leaf);
                    pool.insert(key, id);
                    self.listener.node_added(dependency.artifact());
                    return EdgeOutcome::New {
                        id,
                        expand: false,
                        child_dependencies: Vec::new(),
                        child_policies: policies,
                        child_repositories: repositories,
                        child_ancestors: ancestors,
                    };
                }
            };

        self.listener.node_added(&effective_artifact);
        let mut node = DependencyNode::new_child(dependency.clone(), effective_artifact.clone(), depth);
        node.repositories = descriptor.repositories.clone();
        node.relocations = relocations;
        let id = graph.alloc(node);
        pool.insert(key, id);

        let expand = policies.traverser.traverse_dependency(&dependency);
        if !expand {
            self.listener.node_resolved(&effective_artifact);
            return EdgeOutcome::New {
                id,
                expand: false,
                child_dependencies: Vec::new(),
                child_policies: policies,
                child_repositories: repositories,
                child_ancestors: ancestors,
            };
        }

        let mut child_ancestors = ancestors;
        child_ancestors.push((versionless_id, id));
        let context = DescentContext {
            depth,
            dependency: dependency.clone(),
        };
        let child_policies = policies.derive_for_child(&context, &descriptor.managed_dependencies);
        let mut child_repositories = descriptor.repositories.clone();
        for repo in &repositories {
            if !child_repositories.contains(repo) {
                child_repositories.push(repo.clone());
            }
        }

        self.listener.node_resolved(&effective_artifact);
        EdgeOutcome::New {
            id,
            expand: true,
            child_dependencies: descriptor.dependencies,
            child_policies,
            child_repositories,
            child_ancestors,
        }
    }

    fn apply_management(&self, manager: &Arc<dyn DependencyManager>, dependency: Dependency) -> Dependency {
        match manager.manage_dependency(&dependency) {
            None => dependency,
            Some(management) => apply_management_fields(dependency, management),
        }
    }

    /// §4.F step 3: resolves the constraint to concrete versions, filters
    /// them, and picks the highest survivor.
    async fn resolve_candidate_version(
        &self,
        dependency: &Dependency,
        repositories: &[String],
        filter: &Arc<dyn VersionFilter>,
        trace: &Trace,
    ) -> Result<Version, CollectionError> {
        let constraint = dependency.version_constraint();
        if !constraint.is_hard() {
            return Ok(constraint
                .get_version()
                .cloned()
                .unwrap_or_else(|| dependency.artifact().version().clone()));
        }

        let _permit = self.fetch_permits.acquire().await.expect("semaphore open");
        let request = VersionRangeRequest {
            group_id: dependency.artifact().group_id().to_string(),
            artifact_id: dependency.artifact().artifact_id().to_string(),
            constraint: constraint.clone(),
            repositories: repositories.to_vec(),
            trace: trace.clone(),
        };
        let result = self.range_gateway.resolve(request).await?;
        let versions: Vec<Version> = result.versions.iter().map(|v| v.version.clone()).collect();
        let filtered = filter.clone().filter_versions(versions);
        match filtered.into_iter().max() {
            Some(v) => Ok(v),
            None => Err(CollectionError::VersionRange {
                artifact: dependency.artifact().clone(),
                constraint: constraint.to_string(),
                repositories: repositories.to_vec(),
            }),
        }
    }

    /// §4.F step 4: fetches the descriptor, following relocations until the
    /// descriptor reports an effective artifact matching what was asked for.
    /// Every coordinate followed along the way is carried back in the third
    /// tuple element, oldest first, so the caller can record the trail on
    /// the resulting node (§8 scenario 5).
    async fn fetch_with_relocation(
        &self,
        mut artifact: Artifact,
        repositories: &[String],
        trace: &Trace,
    ) -> Result<(Artifact, DescriptorResult, Vec<Artifact>), CollectionError> {
        let mut relocations = Vec::new();
        loop {
            let _permit = self.fetch_permits.acquire().await.expect("semaphore open");
            let request = DescriptorRequest {
                artifact: artifact.clone(),
                repositories: repositories.to_vec(),
                trace: trace.clone(),
            };
            let result = self.descriptor_gateway.read(request).await?;
            relocations.extend(result.relocations.iter().cloned());
            match &result.effective_artifact {
                Some(relocated) if relocated.versionless_id() != artifact.versionless_id() => {
                    artifact = relocated.clone();
                    continue;
                }
                Some(effective) => return Ok((effective.clone(), result, relocations)),
                None => return Ok((artifact, result, relocations)),
            }
        }
    }
}

fn apply_management_fields(dependency: Dependency, management: Management) -> Dependency {
    let mut dependency = dependency;
    if let Some(constraint) = management.version_constraint {
        dependency = dependency.with_constraint(constraint);
    }
    if let Some(scope) = management.scope {
        dependency = dependency.with_scope(scope);
    }
    if let Some(optional) = management.optional {
        dependency = dependency.with_optional(optional);
    }
    if let Some(exclusions) = management.exclusions {
        dependency = dependency.with_exclusions(exclusions);
    }
    dependency
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;
    use std::sync::Mutex;

    struct FakeRepository {
        descriptors: StdHashMap<String, DescriptorResult>,
        ranges: StdHashMap<String, Vec<(&'static str, &'static str)>>,
    }

    struct FakeReader(Arc<Mutex<FakeRepository>>);

    #[async_trait::async_trait]
    impl ArtifactDescriptorReader for FakeReader {
        async fn read_artifact_descriptor(
            &self,
            request: &DescriptorRequest,
        ) -> Result<DescriptorResult, CollectionError> {
            let repo = self.0.lock().unwrap();
            match repo.descriptors.get(&request.artifact.to_string()) {
                Some(result) => Ok(result.clone()),
                None => Ok(DescriptorResult::default()),
            }
        }
    }

    struct FakeResolver(Arc<Mutex<FakeRepository>>);

    #[async_trait::async_trait]
    impl VersionRangeResolver for FakeResolver {
        async fn resolve_version_range(
            &self,
            request: &VersionRangeRequest,
        ) -> Result<crate::interfaces::VersionRangeResult, CollectionError> {
            let repo = self.0.lock().unwrap();
            let key = format!("{}:{}", request.group_id, request.artifact_id);
            let versions = repo
                .ranges
                .get(&key)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|(v, r)| crate::interfaces::VersionAndRepository {
                    version: Version::parse(v).unwrap(),
                    repository: r.to_string(),
                })
                .collect();
            Ok(crate::interfaces::VersionRangeResult { versions })
        }
    }

    fn artifact(name: &str, version: &str) -> Artifact {
        Artifact::new("g", name, Version::parse(version).unwrap())
    }

    fn empty_repo() -> Arc<Mutex<FakeRepository>> {
        Arc::new(Mutex::new(FakeRepository {
            descriptors: StdHashMap::new(),
            ranges: StdHashMap::new(),
        }))
    }

    #[tokio::test]
    async fn simple_root_with_one_child() {
        let repo = empty_repo();
        let collector = Collector::new(
            Arc::new(FakeReader(repo.clone())),
            Arc::new(FakeResolver(repo)),
            CollectorConfig::default(),
        );

        let request = CollectRequest {
            root_dependency: None,
            root_artifact: Some(artifact("a", "1")),
            dependencies: vec![Dependency::new(artifact("b", "1"), "compile")],
            managed_dependencies: vec![],
            repositories: vec!["central".into()],
            trace: Trace::root(),
        };

        let result = collector.collect(request).await;
        assert!(result.exceptions.is_empty());
        assert_eq!(result.graph.node_count(), 2);
    }

    #[tokio::test]
    async fn cycle_is_not_expanded() {
        let mut descriptors = StdHashMap::new();
        descriptors.insert(
            "g:a:jar:1".to_string(),
            DescriptorResult {
                effective_artifact: None,
                relocations: vec![],
                dependencies: vec![Dependency::new(artifact("b", "1"), "compile")],
                managed_dependencies: vec![],
                repositories: vec![],
            },
        );
        descriptors.insert(
            "g:b:jar:1".to_string(),
            DescriptorResult {
                effective_artifact: None,
                relocations: vec![],
                dependencies: vec![Dependency::new(artifact("a", "1"), "compile")],
                managed_dependencies: vec![],
                repositories: vec![],
            },
        );
        let repo = Arc::new(Mutex::new(FakeRepository {
            descriptors,
            ranges: StdHashMap::new(),
        }));
        let collector = Collector::new(
            Arc::new(FakeReader(repo.clone())),
            Arc::new(FakeResolver(repo)),
            CollectorConfig::default(),
        );

        let request = CollectRequest {
            root_dependency: None,
            root_artifact: Some(artifact("a", "1")),
            dependencies: vec![Dependency::new(artifact("b", "1"), "compile")],
            managed_dependencies: vec![],
            repositories: vec!["central".into()],
            trace: Trace::root(),
        };

        let result = collector.collect(request).await;
        assert!(result.exceptions.is_empty());
        // root(a) -> b -> (a recurs, not expanded)
        assert_eq!(result.graph.node_count(), 2);
    }

    #[tokio::test]
    async fn hard_range_picks_highest_surviving_version() {
        let mut ranges = StdHashMap::new();
        ranges.insert(
            "g:b".to_string(),
            vec![
                ("1.0", "central"),
                ("1.5", "central"),
                ("1.9", "central"),
                ("2.0", "central"),
                ("2.1", "central"),
            ],
        );
        let repo = Arc::new(Mutex::new(FakeRepository {
            descriptors: StdHashMap::new(),
            ranges,
        }));
        let collector = Collector::new(
            Arc::new(FakeReader(repo.clone())),
            Arc::new(FakeResolver(repo)),
            CollectorConfig::default(),
        );

        let dep = Dependency::new(artifact("b", "1"), "compile")
            .with_constraint(VersionConstraint::parse("[1.0,2.0)").unwrap());
        let request = CollectRequest {
            root_dependency: None,
            root_artifact: Some(artifact("a", "1")),
            dependencies: vec![dep],
            managed_dependencies: vec![],
            repositories: vec!["central".into()],
            trace: Trace::root(),
        };

        let result = collector.collect(request).await;
        assert!(result.exceptions.is_empty());
        let (_, child) = result
            .graph
            .iter()
            .find(|(id, _)| *id != result.graph.root())
            .unwrap();
        assert_eq!(child.artifact.version().as_str(), "1.9");
    }

    #[tokio::test]
    async fn depth_first_and_breadth_first_agree_on_node_and_edge_counts() {
        let mut descriptors = StdHashMap::new();
        descriptors.insert(
            "g:b:jar:1".to_string(),
            DescriptorResult {
                effective_artifact: None,
                relocations: vec![],
                dependencies: vec![Dependency::new(artifact("d", "1"), "compile")],
                managed_dependencies: vec![],
                repositories: vec![],
            },
        );
        descriptors.insert(
            "g:c:jar:1".to_string(),
            DescriptorResult {
                effective_artifact: None,
                relocations: vec![],
                dependencies: vec![Dependency::new(artifact("e", "1"), "compile")],
                managed_dependencies: vec![],
                repositories: vec![],
            },
        );
        let repo = Arc::new(Mutex::new(FakeRepository {
            descriptors,
            ranges: StdHashMap::new(),
        }));

        let request = || CollectRequest {
            root_dependency: None,
            root_artifact: Some(artifact("a", "1")),
            dependencies: vec![
                Dependency::new(artifact("b", "1"), "compile"),
                Dependency::new(artifact("c", "1"), "compile"),
            ],
            managed_dependencies: vec![],
            repositories: vec!["central".into()],
            trace: Trace::root(),
        };

        let df_collector = Collector::new(
            Arc::new(FakeReader(repo.clone())),
            Arc::new(FakeResolver(repo.clone())),
            CollectorConfig {
                variant: CollectorVariant::DepthFirst,
                ..CollectorConfig::default()
            },
        );
        let bf_collector = Collector::new(
            Arc::new(FakeReader(repo.clone())),
            Arc::new(FakeResolver(repo.clone())),
            CollectorConfig {
                variant: CollectorVariant::BreadthFirst,
                ..CollectorConfig::default()
            },
        );

        let df_result = df_collector.collect(request()).await;
        let bf_result = bf_collector.collect(request()).await;

        assert_eq!(df_result.graph.node_count(), bf_result.graph.node_count());
        assert_eq!(df_result.graph.edge_count(), bf_result.graph.edge_count());
    }
}
