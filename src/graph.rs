//! The dependency graph built by the collector: an arena of
//! [`DependencyNode`]s addressed by index rather than shared/cyclic
//! references (§9 "Cyclic node graphs"). Children are owned by index into
//! the arena; a recurring coordinate in the ancestor chain is recorded as a
//! data-only back-reference in [`Graph::cycles`] instead of being expanded.

use std::collections::HashMap;
use std::fmt;

use petgraph::stable_graph::StableGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Directed;
use serde_json::Value as PropertyValue;

use crate::model::{Artifact, Dependency};
use crate::version::VersionConstraint;

/// An index into a [`Graph`]'s arena. Stable for the lifetime of the graph;
/// never reused after the node it names is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the raw or transformed dependency graph (§3 "DependencyNode").
///
/// Mutable during collection; the transformer pipeline mutates `properties`
/// and `pruned`/`scope` in place, after which the graph is treated as
/// immutable by consumers.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    /// `None` only for the synthetic node above a root-less collection
    /// request (§4.F step 1).
    pub dependency: Option<Dependency>,
    /// The effective artifact after any relocation (§4.F step 4).
    pub artifact: Artifact,
    /// Coordinates this node's descriptor was followed from, oldest first,
    /// if the fetch crossed one or more relocations (§4.F step 4, §8
    /// scenario 5). Empty when nothing relocated.
    pub relocations: Vec<Artifact>,
    pub version_constraint: VersionConstraint,
    pub children: Vec<NodeId>,
    /// Repositories descriptor lookups for this node and its children are
    /// permitted to use, deduplicated and order-preserving.
    pub repositories: Vec<String>,
    /// Shortest-path depth from the root (§4.G).
    pub depth: usize,
    /// Scope as declared on the edge; the *derived* scope is written into
    /// `properties["derivedScope"]` by the conflict resolver (§4.H).
    pub scope: String,
    pub optional: bool,
    /// Set by the conflict marker/resolver: `conflictId`, `winner`,
    /// `preManagedVersion`, `preManagedScope`, etc (§3, §4.H).
    pub properties: HashMap<String, PropertyValue>,
    /// True once a conflict-group loser has been pruned by the resolver;
    /// retained in the arena for verbose inspection (§4.H "Output").
    pub pruned: bool,
}

impl DependencyNode {
    pub fn new_root(artifact: Artifact) -> Self {
        Self {
            dependency: None,
            version_constraint: VersionConstraint::Soft(artifact.version().clone()),
            artifact,
            relocations: Vec::new(),
            children: Vec::new(),
            repositories: Vec::new(),
            depth: 0,
            scope: String::new(),
            optional: false,
            properties: HashMap::new(),
            pruned: false,
        }
    }

    pub fn new_child(dependency: Dependency, artifact: Artifact, depth: usize) -> Self {
        let version_constraint = dependency.version_constraint().clone();
        let scope = dependency.scope().to_string();
        let optional = dependency.is_optional();
        Self {
            dependency: Some(dependency),
            artifact,
            relocations: Vec::new(),
            version_constraint,
            children: Vec::new(),
            repositories: Vec::new(),
            depth,
            scope,
            optional,
            properties: HashMap::new(),
            pruned: false,
        }
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// The scope the conflict resolver derived for this node, falling back
    /// to the declared scope before resolution has run (§4.H "Scope
    /// selector").
    pub fn effective_scope(&self) -> &str {
        match self.properties.get("derivedScope").and_then(|v| v.as_str()) {
            Some(s) => s,
            None => &self.scope,
        }
    }
}

/// A data-only record of a detected cycle: `to` recurs in the ancestor
/// chain ending at `from`, so `from`'s edge to `to` was not expanded
/// (§3 "Cycle").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRecord {
    pub from: NodeId,
    pub to: NodeId,
}

/// The collector's output graph: an arena of nodes plus a root index and
/// any detected cycles. Indices remain valid for the graph's lifetime.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<DependencyNode>,
    root: NodeId,
    pub cycles: Vec<CycleRecord>,
}

impl Graph {
    pub fn new(root: DependencyNode) -> Self {
        Self {
            nodes: vec![root],
            root: NodeId(0),
            cycles: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_versionless_id(&self) -> crate::model::VersionlessId {
        self.get(self.root).artifact.versionless_id()
    }

    pub fn alloc(&mut self, node: DependencyNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &DependencyNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut DependencyNode {
        &mut self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).sum()
    }

    pub fn record_cycle(&mut self, from: NodeId, to: NodeId) {
        self.cycles.push(CycleRecord { from, to });
    }

    /// Depth-first preorder over non-pruned edges starting at `root`,
    /// matching the traversal order conflict resolution relies on (§5
    /// "Ordering").
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        let mut visited = vec![false; self.nodes.len()];
        while let Some(id) = stack.pop() {
            if visited[id.0] {
                continue;
            }
            visited[id.0] = true;
            out.push(id);
            for &child in self.get(id).children.iter().rev() {
                if !visited[child.0] && !self.get(child).pruned {
                    stack.push(child);
                }
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &DependencyNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i), n))
    }

    /// Snapshot statistics mirroring the teacher module's own graph
    /// statistics surface (§10.5).
    pub fn stats(&self, conflict_count: usize) -> GraphStats {
        GraphStats {
            package_count: self.nodes.len(),
            edge_count: self.edge_count(),
            conflict_count,
            cycle_count: self.cycles.len(),
            pruned_count: self.nodes.iter().filter(|n| n.pruned).count(),
        }
    }

    /// Builds a `petgraph` mirror containing only non-pruned nodes and the
    /// edges between them, for algorithms (DOT export, external traversal)
    /// that want a generic graph type rather than the arena's
    /// index-addressed children.
    pub fn to_petgraph(&self) -> StableGraph<NodeId, (), Directed> {
        let mut pg = StableGraph::new();
        let mut indices = HashMap::with_capacity(self.nodes.len());
        for (id, node) in self.iter() {
            if node.pruned {
                continue;
            }
            indices.insert(id, pg.add_node(id));
        }
        for (id, node) in self.iter() {
            if node.pruned {
                continue;
            }
            for &child in &node.children {
                if let (Some(&source), Some(&target)) = (indices.get(&id), indices.get(&child)) {
                    pg.add_edge(source, target, ());
                }
            }
        }
        pg
    }

    pub fn to_dot(&self) -> String {
        let pg = self.to_petgraph();
        let get_edge = |e: petgraph::stable_graph::EdgeReference<'_, ()>| {
            format!(
                "{} -> {}",
                self.get(*pg.node_weight(e.source()).unwrap()).artifact,
                self.get(*pg.node_weight(e.target()).unwrap()).artifact
            )
        };
        let mut out = String::from("digraph dependencies {\n");
        for edge in pg.edge_references() {
            out.push_str(&format!("  \"{}\";\n", get_edge(edge)));
        }
        out.push_str("}\n");
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    pub package_count: usize,
    pub edge_count: usize,
    pub conflict_count: usize,
    pub cycle_count: usize,
    pub pruned_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    fn artifact(name: &str) -> Artifact {
        Artifact::new("g", name, Version::parse("1.0").unwrap())
    }

    #[test]
    fn preorder_visits_root_before_children() {
        let mut graph = Graph::new(DependencyNode::new_root(artifact("root")));
        let a = graph.alloc(DependencyNode::new_child(
            Dependency::new(artifact("a"), "compile"),
            artifact("a"),
            1,
        ));
        graph.get_mut(graph.root()).children.push(a);
        let order = graph.preorder();
        assert_eq!(order[0], graph.root());
        assert_eq!(order[1], a);
    }

    #[test]
    fn cycle_is_recorded_without_a_child_edge() {
        let mut graph = Graph::new(DependencyNode::new_root(artifact("a")));
        let b = graph.alloc(DependencyNode::new_child(
            Dependency::new(artifact("b"), "compile"),
            artifact("b"),
            1,
        ));
        graph.get_mut(graph.root()).children.push(b);
        graph.record_cycle(b, graph.root());
        assert_eq!(graph.cycles.len(), 1);
        assert!(graph.get(b).children.is_empty());
    }

    #[test]
    fn stats_count_nodes_edges_and_cycles() {
        let mut graph = Graph::new(DependencyNode::new_root(artifact("root")));
        let a = graph.alloc(DependencyNode::new_child(
            Dependency::new(artifact("a"), "compile"),
            artifact("a"),
            1,
        ));
        graph.get_mut(graph.root()).children.push(a);
        graph.record_cycle(a, graph.root());
        let stats = graph.stats(0);
        assert_eq!(stats.package_count, 2);
        assert_eq!(stats.edge_count, 1);
        assert_eq!(stats.cycle_count, 1);
    }
}
