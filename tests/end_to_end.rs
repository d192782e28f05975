//! End-to-end collection + conflict resolution scenarios run against an
//! in-memory fake descriptor reader and version range resolver — no real
//! network or filesystem I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dep_resolver_core::{
    Artifact, ArtifactDescriptorReader, CollectRequest, Collector, CollectorConfig,
    CollectionError, Dependency, DependencyGraphTransformer, DescriptorRequest, DescriptorResult,
    NoopListener, Trace, Version, VersionAndRepository, VersionRangeRequest, VersionRangeResolver,
    VersionRangeResult, default_pipeline,
};

struct FakeRepository {
    descriptors: HashMap<String, DescriptorResult>,
    ranges: HashMap<String, Vec<(&'static str, &'static str)>>,
}

struct FakeReader(Arc<Mutex<FakeRepository>>);

#[async_trait]
impl ArtifactDescriptorReader for FakeReader {
    async fn read_artifact_descriptor(
        &self,
        request: &DescriptorRequest,
    ) -> Result<DescriptorResult, CollectionError> {
        let repo = self.0.lock().unwrap();
        Ok(repo
            .descriptors
            .get(&request.artifact.to_string())
            .cloned()
            .unwrap_or_default())
    }
}

struct FakeResolver(Arc<Mutex<FakeRepository>>);

#[async_trait]
impl VersionRangeResolver for FakeResolver {
    async fn resolve_version_range(
        &self,
        request: &VersionRangeRequest,
    ) -> Result<VersionRangeResult, CollectionError> {
        let repo = self.0.lock().unwrap();
        let key = format!("{}:{}", request.group_id, request.artifact_id);
        let versions = repo
            .ranges
            .get(&key)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|(v, r)| VersionAndRepository {
                version: Version::parse(v).unwrap(),
                repository: r.to_string(),
            })
            .collect();
        Ok(VersionRangeResult { versions })
    }
}

fn artifact(name: &str, version: &str) -> Artifact {
    Artifact::new("g", name, Version::parse(version).unwrap())
}

fn collector_over(repo: FakeRepository) -> Collector {
    let repo = Arc::new(Mutex::new(repo));
    Collector::new(
        Arc::new(FakeReader(repo.clone())),
        Arc::new(FakeResolver(repo)),
        CollectorConfig::default(),
    )
}

/// §8 scenario 2: `b` and `c` each pull in a different version of `d` at the
/// same depth; the raw graph keeps both, conflict resolution elects one.
#[tokio::test]
async fn deduplication_picks_one_winner_for_a_shared_coordinate() {
    let mut descriptors = HashMap::new();
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
            dependencies: vec![Dependency::new(artifact("d", "2"), "compile")],
            managed_dependencies: vec![],
            repositories: vec![],
        },
    );

    let collector = collector_over(FakeRepository {
        descriptors,
        ranges: HashMap::new(),
    });

    let request = CollectRequest {
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

    let mut result = collector.collect(request).await;
    assert!(result.exceptions.is_empty());

    let d_nodes: Vec<_> = result
        .graph
        .iter()
        .filter(|(_, n)| n.artifact.artifact_id() == "d")
        .map(|(id, _)| id)
        .collect();
    assert_eq!(d_nodes.len(), 2, "both d candidates survive collection");

    let pipeline = default_pipeline(Arc::new(NoopListener));
    pipeline.transform(&mut result.graph).unwrap();

    let winners: Vec<_> = d_nodes
        .iter()
        .filter(|&&id| !result.graph.get(id).pruned)
        .collect();
    assert_eq!(winners.len(), 1, "exactly one d candidate wins");
}

/// §8 scenario 5: a relocated artifact's children come from the new
/// descriptor, and the relocation is recorded.
#[tokio::test]
async fn relocation_follows_to_the_new_coordinate() {
    let mut descriptors = HashMap::new();
    let new_artifact = artifact("new", "1");
    descriptors.insert(
        "g:old:jar:1".to_string(),
        DescriptorResult {
            effective_artifact: Some(new_artifact.clone()),
            relocations: vec![artifact("old", "1")],
            dependencies: vec![],
            managed_dependencies: vec![],
            repositories: vec![],
        },
    );
    descriptors.insert(
        "g:new:jar:1".to_string(),
        DescriptorResult {
            effective_artifact: None,
            relocations: vec![],
            dependencies: vec![Dependency::new(artifact("leaf", "1"), "compile")],
            managed_dependencies: vec![],
            repositories: vec![],
        },
    );

    let collector = collector_over(FakeRepository {
        descriptors,
        ranges: HashMap::new(),
    });

    let request = CollectRequest {
        root_dependency: None,
        root_artifact: Some(artifact("a", "1")),
        dependencies: vec![Dependency::new(artifact("old", "1"), "compile")],
        managed_dependencies: vec![],
        repositories: vec!["central".into()],
        trace: Trace::root(),
    };

    let result = collector.collect(request).await;
    assert!(result.exceptions.is_empty());

    let relocated = result
        .graph
        .iter()
        .find(|(id, _)| *id != result.graph.root())
        .map(|(_, n)| n)
        .unwrap();
    assert_eq!(relocated.artifact.artifact_id(), "new");
    assert_eq!(relocated.relocations, vec![artifact("old", "1")]);
    assert_eq!(relocated.children.len(), 1);
    let leaf = result.graph.get(relocated.children[0]);
    assert_eq!(leaf.artifact.artifact_id(), "leaf");
}
