//! The graph transformer pipeline (§4.G/H/I): runs after collection to turn
//! the raw graph (which may contain several nodes per versionless identity)
//! into one with a single elected "winner" per conflict group, annotated
//! with its derived scope and optionality.
//!
//! Transformers mutate the graph in place and never remove nodes — a loser
//! is marked `pruned`, not deleted, so verbose inspection can still see the
//! full raw shape (§4.H "Output").

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CollectionError;
use crate::graph::{Graph, NodeId};
use crate::interfaces::{Listener, NoopListener};
use crate::model::Artifact;
use crate::version::{Version, VersionConstraint};

/// One stage of the pipeline. Each stage sees the whole graph and mutates it
/// in place; composition happens via [`ChainedDependencyGraphTransformer`].
pub trait DependencyGraphTransformer: Send + Sync {
    fn transform(&self, graph: &mut Graph) -> Result<(), CollectionError>;
}

/// Does nothing; the identity element for a transformer chain (§4.I).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDependencyGraphTransformer;

impl DependencyGraphTransformer for NoopDependencyGraphTransformer {
    fn transform(&self, _graph: &mut Graph) -> Result<(), CollectionError> {
        Ok(())
    }
}

/// Runs its members in order, stopping at the first error (§4.I).
pub struct ChainedDependencyGraphTransformer(pub Vec<Arc<dyn DependencyGraphTransformer>>);

impl DependencyGraphTransformer for ChainedDependencyGraphTransformer {
    fn transform(&self, graph: &mut Graph) -> Result<(), CollectionError> {
        for stage in &self.0 {
            stage.transform(graph)?;
        }
        Ok(())
    }
}

/// The standard pipeline: marker then resolver (§4.I).
pub fn default_pipeline(listener: Arc<dyn Listener>) -> ChainedDependencyGraphTransformer {
    ChainedDependencyGraphTransformer(vec![
        Arc::new(ConflictMarker),
        Arc::new(ConflictResolver::new(listener)),
    ])
}

/// Assigns each node a `conflictId` equal to its artifact's versionless
/// identity (§4.G). Two nodes are in the same conflict group iff they share
/// one. Depth is already tracked on the node by the collector, so this
/// stage only needs to stamp the identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConflictMarker;

impl DependencyGraphTransformer for ConflictMarker {
    fn transform(&self, graph: &mut Graph) -> Result<(), CollectionError> {
        let order = graph.preorder();
        for id in order {
            let conflict_id = graph.get(id).artifact.versionless_id().to_string();
            graph.get_mut(id).set_property("conflictId", conflict_id);
        }
        Ok(())
    }
}

fn parent_map(graph: &Graph) -> HashMap<NodeId, NodeId> {
    let mut parents = HashMap::new();
    for (id, node) in graph.iter() {
        for &child in &node.children {
            parents.insert(child, id);
        }
    }
    parents
}

fn path_to_root(graph: &Graph, parents: &HashMap<NodeId, NodeId>, mut id: NodeId) -> Vec<Artifact> {
    let mut path = vec![graph.get(id).artifact.clone()];
    while let Some(&parent) = parents.get(&id) {
        path.push(graph.get(parent).artifact.clone());
        id = parent;
    }
    path.reverse();
    path
}

fn accepted_by(version: &Version, accumulated: &[crate::version::UnionVersionRange]) -> bool {
    accumulated.iter().all(|range| range.contains_version(version))
}

/// `a` is nearer than `b` per §4.H: shallower depth always wins; among
/// siblings at equal depth the higher version wins; otherwise the
/// first-encountered candidate (i.e. `b`, since traversal is preorder) is
/// kept.
fn is_nearer(graph: &Graph, parents: &HashMap<NodeId, NodeId>, a: NodeId, b: NodeId) -> bool {
    let node_a = graph.get(a);
    let node_b = graph.get(b);
    if node_a.depth != node_b.depth {
        return node_a.depth < node_b.depth;
    }
    if parents.get(&a) == parents.get(&b) {
        return node_a.artifact.version() > node_b.artifact.version();
    }
    false
}

/// Resolves every conflict group left by [`ConflictMarker`]: elects a
/// winner by nearest-wins version election, derives scope, and derives
/// optionality (§4.H).
pub struct ConflictResolver {
    listener: Arc<dyn Listener>,
}

impl ConflictResolver {
    pub fn new(listener: Arc<dyn Listener>) -> Self {
        Self { listener }
    }
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new(Arc::new(NoopListener))
    }
}

impl DependencyGraphTransformer for ConflictResolver {
    fn transform(&self, graph: &mut Graph) -> Result<(), CollectionError> {
        let parents = parent_map(graph);
        derive_scopes(graph, &parents);

        let order = graph.preorder();
        let mut groups: indexmap::IndexMap<String, Vec<NodeId>> = indexmap::IndexMap::new();
        for id in &order {
            if let Some(conflict_id) = graph.get(*id).property("conflictId").and_then(|v| v.as_str()) {
                groups.entry(conflict_id.to_string()).or_default().push(*id);
            }
        }

        for (conflict_id, candidates) in groups {
            self.resolve_group(graph, &parents, &conflict_id, &candidates)?;
        }
        Ok(())
    }
}

impl ConflictResolver {
    fn resolve_group(
        &self,
        graph: &mut Graph,
        parents: &HashMap<NodeId, NodeId>,
        conflict_id: &str,
        candidates: &[NodeId],
    ) -> Result<(), CollectionError> {
        let winner = self.elect_version(graph, parents, conflict_id, candidates)?;

        for &id in candidates {
            let is_winner = id == winner;
            let node = graph.get_mut(id);
            node.pruned = !is_winner;
            node.set_property("winner", is_winner);
        }

        let optional = candidates.iter().all(|&id| graph.get(id).optional);
        graph.get_mut(winner).optional = optional;

        let winner_artifact = graph.get(winner).artifact.clone();
        self.listener.conflict_detected(conflict_id, &winner_artifact);
        Ok(())
    }

    /// §4.H "Version selector": nearest-wins with backtracking against the
    /// accumulated hard constraints seen so far in traversal order.
    fn elect_version(
        &self,
        graph: &Graph,
        parents: &HashMap<NodeId, NodeId>,
        conflict_id: &str,
        candidates: &[NodeId],
    ) -> Result<NodeId, CollectionError> {
        if candidates.len() == 1 {
            return Ok(candidates[0]);
        }

        let mut accumulated: Vec<crate::version::UnionVersionRange> = Vec::new();
        let mut winner: Option<NodeId> = None;

        for &id in candidates {
            let node = graph.get(id);
            if let VersionConstraint::Hard(range) = &node.version_constraint {
                accumulated.push(range.clone());
                if let Some(current) = winner {
                    let current_version = graph.get(current).artifact.version();
                    if !accepted_by(current_version, &accumulated) {
                        winner = candidates
                            .iter()
                            .copied()
                            .filter(|&c| accepted_by(graph.get(c).artifact.version(), &accumulated))
                            .fold(None, |best, c| match best {
                                None => Some(c),
                                Some(b) => Some(if is_nearer(graph, parents, c, b) { c } else { b }),
                            });
                        continue;
                    }
                }
            }

            let version = node.artifact.version();
            if accepted_by(version, &accumulated) {
                winner = Some(match winner {
                    None => id,
                    Some(current) => {
                        if is_nearer(graph, parents, id, current) {
                            id
                        } else {
                            current
                        }
                    }
                });
            }
        }

        match winner {
            Some(id) if accepted_by(graph.get(id).artifact.version(), &accumulated) => Ok(id),
            _ => Err(CollectionError::UnsolvableVersionConflict {
                conflict_id: conflict_id.to_string(),
                paths: candidates
                    .iter()
                    .map(|&id| path_to_root(graph, parents, id))
                    .collect(),
            }),
        }
    }
}

/// §4.H "Scope selector": derives every node's effective scope in a single
/// root-to-leaf pass (parents are always visited before children in
/// preorder), independent of which node a conflict group eventually elects.
/// This sidesteps the ordering hazard of deriving scope only for winners,
/// since a winner can come from any branch and still needs its own
/// path-consistent parent scope to have already been computed.
fn derive_scopes(graph: &mut Graph, parents: &HashMap<NodeId, NodeId>) {
    let order = graph.preorder();
    let root = graph.root();
    for id in order {
        if id == root {
            continue;
        }
        let Some(&parent) = parents.get(&id) else {
            continue;
        };
        let parent_scope = graph.get(parent).effective_scope().to_string();
        let own_scope = graph.get(id).scope.clone();
        let derived = derive_scope(&parent_scope, &own_scope);
        graph.get_mut(id).set_property("derivedScope", derived);
    }
}

/// The parent/child scope promotion table from §4.H. `test` as a parent is
/// viral: everything beneath it stays `test` regardless of the child's own
/// declared scope. Otherwise a `test` child always wins; a `system` child's
/// fate depends on the parent (kept under `system`, demoted to `test` under
/// `provided`, kept under any other parent since it has nowhere else to go).
fn derive_scope(parent: &str, child: &str) -> String {
    if parent == "test" {
        return "test".to_string();
    }
    if child == "test" {
        return "test".to_string();
    }
    if child == "system" {
        return match parent {
            "system" => "system".to_string(),
            "provided" => "test".to_string(),
            _ => "system".to_string(),
        };
    }
    match parent {
        "" | "compile" => child.to_string(),
        "runtime" => "runtime".to_string(),
        "system" | "provided" => "provided".to_string(),
        _ => child.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DependencyNode;
    use crate::model::Dependency;
    use crate::version::Version;

    fn artifact(name: &str, version: &str) -> Artifact {
        Artifact::new("g", name, Version::parse(version).unwrap())
    }

    fn dep(name: &str, version: &str, scope: &str) -> Dependency {
        Dependency::new(artifact(name, version), scope)
    }

    #[test]
    fn marker_groups_by_versionless_identity() {
        let mut graph = Graph::new(DependencyNode::new_root(artifact("root", "1.0")));
        let a = graph.alloc(DependencyNode::new_child(dep("a", "1.0", "compile"), artifact("a", "1.0"), 1));
        let b = graph.alloc(DependencyNode::new_child(dep("a", "2.0", "compile"), artifact("a", "2.0"), 2));
        graph.get_mut(graph.root()).children.push(a);
        graph.get_mut(a).children.push(b);

        ConflictMarker.transform(&mut graph).unwrap();
        assert_eq!(
            graph.get(a).property("conflictId"),
            graph.get(b).property("conflictId"),
        );
    }

    #[test]
    fn shallower_node_wins_the_conflict_group() {
        let mut graph = Graph::new(DependencyNode::new_root(artifact("root", "1.0")));
        // root -> a(1.0) -> shared(1.0)
        // root -> shared(2.0)   (shallower, should win even though lower version)
        let a = graph.alloc(DependencyNode::new_child(dep("a", "1.0", "compile"), artifact("a", "1.0"), 1));
        let deep_shared = graph.alloc(DependencyNode::new_child(
            dep("shared", "1.0", "compile"),
            artifact("shared", "1.0"),
            2,
        ));
        let shallow_shared = graph.alloc(DependencyNode::new_child(
            dep("shared", "2.0", "compile"),
            artifact("shared", "2.0"),
            1,
        ));
        graph.get_mut(graph.root()).children.push(a);
        graph.get_mut(graph.root()).children.push(shallow_shared);
        graph.get_mut(a).children.push(deep_shared);

        let pipeline = default_pipeline(Arc::new(NoopListener));
        pipeline.transform(&mut graph).unwrap();

        assert!(!graph.get(shallow_shared).pruned);
        assert!(graph.get(deep_shared).pruned);
    }

    #[test]
    fn siblings_at_equal_depth_prefer_the_higher_version() {
        let mut graph = Graph::new(DependencyNode::new_root(artifact("root", "1.0")));
        let low = graph.alloc(DependencyNode::new_child(dep("shared", "1.0", "compile"), artifact("shared", "1.0"), 1));
        let high = graph.alloc(DependencyNode::new_child(dep("shared", "2.0", "compile"), artifact("shared", "2.0"), 1));
        graph.get_mut(graph.root()).children.push(low);
        graph.get_mut(graph.root()).children.push(high);

        let pipeline = default_pipeline(Arc::new(NoopListener));
        pipeline.transform(&mut graph).unwrap();

        assert!(graph.get(high).property("winner").and_then(|v| v.as_bool()).unwrap_or(false));
        assert!(graph.get(low).pruned);
    }

    #[test]
    fn hard_constraint_conflict_with_no_accepted_version_is_unsolvable() {
        let mut graph = Graph::new(DependencyNode::new_root(artifact("root", "1.0")));
        let low_range = dep("shared", "1.0", "compile")
            .with_constraint(VersionConstraint::parse("[1.0,1.2]").unwrap());
        let high_range = dep("shared", "2.0", "compile")
            .with_constraint(VersionConstraint::parse("[2.0,2.2]").unwrap());
        let a = graph.alloc(DependencyNode::new_child(low_range, artifact("shared", "1.0"), 1));
        let b = graph.alloc(DependencyNode::new_child(high_range, artifact("shared", "2.0"), 1));
        graph.get_mut(graph.root()).children.push(a);
        graph.get_mut(graph.root()).children.push(b);

        let pipeline = default_pipeline(Arc::new(NoopListener));
        let result = pipeline.transform(&mut graph);
        assert!(matches!(result, Err(CollectionError::UnsolvableVersionConflict { .. })));
    }

    #[test]
    fn test_scope_is_viral_to_descendants() {
        let mut graph = Graph::new(DependencyNode::new_root(artifact("root", "1.0")));
        let a = graph.alloc(DependencyNode::new_child(dep("a", "1.0", "test"), artifact("a", "1.0"), 1));
        let b = graph.alloc(DependencyNode::new_child(dep("b", "1.0", "compile"), artifact("b", "1.0"), 2));
        graph.get_mut(graph.root()).children.push(a);
        graph.get_mut(a).children.push(b);

        let pipeline = default_pipeline(Arc::new(NoopListener));
        pipeline.transform(&mut graph).unwrap();

        assert_eq!(graph.get(b).effective_scope(), "test");
    }

    #[test]
    fn provided_parent_demotes_a_system_child_to_test() {
        let mut graph = Graph::new(DependencyNode::new_root(artifact("root", "1.0")));
        let a = graph.alloc(DependencyNode::new_child(dep("a", "1.0", "provided"), artifact("a", "1.0"), 1));
        let b = graph.alloc(DependencyNode::new_child(dep("b", "1.0", "system"), artifact("b", "1.0"), 2));
        graph.get_mut(graph.root()).children.push(a);
        graph.get_mut(a).children.push(b);

        let pipeline = default_pipeline(Arc::new(NoopListener));
        pipeline.transform(&mut graph).unwrap();

        assert_eq!(graph.get(b).effective_scope(), "test");
    }

    #[test]
    fn optional_winner_requires_every_candidate_edge_to_be_optional() {
        let mut graph = Graph::new(DependencyNode::new_root(artifact("root", "1.0")));
        let a = graph.alloc(DependencyNode::new_child(
            dep("shared", "1.0", "compile").with_optional(true),
            artifact("shared", "1.0"),
            1,
        ));
        let b = graph.alloc(DependencyNode::new_child(
            dep("shared", "2.0", "compile").with_optional(false),
            artifact("shared", "2.0"),
            1,
        ));
        graph.get_mut(graph.root()).children.push(a);
        graph.get_mut(graph.root()).children.push(b);

        let pipeline = default_pipeline(Arc::new(NoopListener));
        pipeline.transform(&mut graph).unwrap();

        let winner = if graph.get(a).property("winner").and_then(|v| v.as_bool()).unwrap_or(false) {
            a
        } else {
            b
        };
        assert!(!graph.get(winner).optional);
    }
}
