//! Collection policies (§4.E): four orthogonal, composable extension points
//! consulted by the collector at every edge. Each policy is a trait object
//! behind an `Arc` so that `derive_child_*` can hand back the *same*
//! instance when nothing changed for the next depth, giving the collector
//! cheap structural sharing instead of allocating a fresh policy per node.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::model::{Dependency, Exclusion, VersionlessId};
use crate::version::{Version, VersionConstraint};

/// Everything a policy needs to derive its child-facing counterpart: how
/// deep the *next* node will sit, and the edge that leads to it.
#[derive(Debug, Clone)]
pub struct DescentContext {
    pub depth: usize,
    pub dependency: Dependency,
}

impl DescentContext {
    pub fn child(&self, dependency: Dependency) -> Self {
        Self {
            depth: self.depth + 1,
            dependency,
        }
    }
}

/// `dep -> include this edge?` (§4.E).
pub trait DependencySelector: fmt::Debug + Send + Sync {
    fn select_dependency(&self, dependency: &Dependency) -> bool;
    fn derive_child_selector(self: Arc<Self>, context: &DescentContext) -> Arc<dyn DependencySelector>;
}

/// A single field-level override a [`DependencyManager`] applies to a child
/// dependency. `None` fields are left as declared.
#[derive(Debug, Clone, Default)]
pub struct Management {
    pub version_constraint: Option<VersionConstraint>,
    pub scope: Option<String>,
    pub optional: Option<bool>,
    pub exclusions: Option<BTreeSet<Exclusion>>,
}

impl Management {
    fn merge_over(self, base: Management) -> Management {
        Management {
            version_constraint: self.version_constraint.or(base.version_constraint),
            scope: self.scope.or(base.scope),
            optional: self.optional.or(base.optional),
            exclusions: self.exclusions.or(base.exclusions),
        }
    }
}

/// `dep -> optional field overrides from ancestor dependency management`
/// (§4.E).
pub trait DependencyManager: fmt::Debug + Send + Sync {
    fn manage_dependency(&self, dependency: &Dependency) -> Option<Management>;
    fn derive_child_manager(
        self: Arc<Self>,
        context: &DescentContext,
        declared_management: &[Dependency],
    ) -> Arc<dyn DependencyManager>;
}

/// `dep -> expand its children?`, consulted only after the edge survived
/// selection (§4.E).
pub trait DependencyTraverser: fmt::Debug + Send + Sync {
    fn traverse_dependency(&self, dependency: &Dependency) -> bool;
    fn derive_child_traverser(self: Arc<Self>, context: &DescentContext) -> Arc<dyn DependencyTraverser>;
}

/// Winnows the versions found for a range before the collector picks the
/// highest survivor (§4.E, §4.F step 3).
pub trait VersionFilter: fmt::Debug + Send + Sync {
    fn filter_versions(&self, versions: Vec<Version>) -> Vec<Version>;
    fn derive_child_filter(self: Arc<Self>, context: &DescentContext) -> Arc<dyn VersionFilter>;
}

// ---------------------------------------------------------------------
// Static (depth-invariant) builtins
// ---------------------------------------------------------------------

/// Always returns a fixed verdict and always derives to itself: the trivial
/// "Static" variant named in the design notes (§9).
#[derive(Debug, Clone, Copy)]
pub struct StaticDependencySelector(pub bool);

impl DependencySelector for StaticDependencySelector {
    fn select_dependency(&self, _dependency: &Dependency) -> bool {
        self.0
    }
    fn derive_child_selector(self: Arc<Self>, _context: &DescentContext) -> Arc<dyn DependencySelector> {
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StaticDependencyTraverser(pub bool);

impl DependencyTraverser for StaticDependencyTraverser {
    fn traverse_dependency(&self, _dependency: &Dependency) -> bool {
        self.0
    }
    fn derive_child_traverser(
        self: Arc<Self>,
        _context: &DescentContext,
    ) -> Arc<dyn DependencyTraverser> {
        self
    }
}

/// Passes every version through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct StaticVersionFilter;

impl VersionFilter for StaticVersionFilter {
    fn filter_versions(&self, versions: Vec<Version>) -> Vec<Version> {
        versions
    }
    fn derive_child_filter(self: Arc<Self>, _context: &DescentContext) -> Arc<dyn VersionFilter> {
        self
    }
}

/// Blocks versions that look like Maven-style timestamped or literal
/// `SNAPSHOT` builds, the example given in §4.E for `VersionFilter`.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotVersionFilter;

impl VersionFilter for SnapshotVersionFilter {
    fn filter_versions(&self, versions: Vec<Version>) -> Vec<Version> {
        versions
            .into_iter()
            .filter(|v| !v.as_str().to_ascii_uppercase().contains("SNAPSHOT"))
            .collect()
    }
    fn derive_child_filter(self: Arc<Self>, _context: &DescentContext) -> Arc<dyn VersionFilter> {
        self
    }
}

// ---------------------------------------------------------------------
// ScopeDependencySelector
// ---------------------------------------------------------------------

/// Elides dependencies whose effective scope is excluded (or, with an
/// include set, not explicitly included) below depth 1 — direct
/// dependencies are always kept (§4.E).
#[derive(Debug, Clone)]
pub struct ScopeDependencySelector {
    depth: usize,
    excluded: Arc<BTreeSet<String>>,
    included: Option<Arc<BTreeSet<String>>>,
}

impl ScopeDependencySelector {
    pub fn excluding(scopes: impl IntoIterator<Item = String>) -> Self {
        Self {
            depth: 0,
            excluded: Arc::new(scopes.into_iter().collect()),
            included: None,
        }
    }

    pub fn including(scopes: impl IntoIterator<Item = String>) -> Self {
        Self {
            depth: 0,
            excluded: Arc::new(BTreeSet::new()),
            included: Some(Arc::new(scopes.into_iter().collect())),
        }
    }

    fn scope_allowed(&self, scope: &str) -> bool {
        if self.excluded.contains(scope) {
            return false;
        }
        match &self.included {
            Some(allowed) => allowed.contains(scope),
            None => true,
        }
    }
}

impl DependencySelector for ScopeDependencySelector {
    fn select_dependency(&self, dependency: &Dependency) -> bool {
        if self.depth < 1 {
            return true;
        }
        self.scope_allowed(dependency.scope())
    }

    fn derive_child_selector(self: Arc<Self>, context: &DescentContext) -> Arc<dyn DependencySelector> {
        if self.depth == context.depth {
            return self;
        }
        Arc::new(Self {
            depth: context.depth,
            excluded: self.excluded.clone(),
            included: self.included.clone(),
        })
    }
}

// ---------------------------------------------------------------------
// OptionalDependencySelector
// ---------------------------------------------------------------------

/// Includes optional dependencies only at depth ≤ 1 (§4.E).
#[derive(Debug, Clone, Copy)]
pub struct OptionalDependencySelector {
    depth: usize,
}

impl OptionalDependencySelector {
    pub fn new() -> Self {
        Self { depth: 0 }
    }
}

impl Default for OptionalDependencySelector {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencySelector for OptionalDependencySelector {
    fn select_dependency(&self, dependency: &Dependency) -> bool {
        if !dependency.is_optional() {
            return true;
        }
        self.depth <= 1
    }

    fn derive_child_selector(self: Arc<Self>, context: &DescentContext) -> Arc<dyn DependencySelector> {
        if self.depth == context.depth {
            return self;
        }
        Arc::new(Self {
            depth: context.depth,
        })
    }
}

// ---------------------------------------------------------------------
// ExclusionDependencySelector
// ---------------------------------------------------------------------

/// Accumulates exclusions declared along the path from the root; a child
/// edge is dropped if any ancestor excluded its versionless identity
/// (§4.E).
#[derive(Debug, Clone)]
pub struct ExclusionDependencySelector {
    exclusions: Arc<BTreeSet<Exclusion>>,
}

impl ExclusionDependencySelector {
    pub fn new() -> Self {
        Self {
            exclusions: Arc::new(BTreeSet::new()),
        }
    }

    fn matches_id(&self, id: &VersionlessId) -> bool {
        self.exclusions.iter().any(|e| e.matches(id))
    }
}

impl Default for ExclusionDependencySelector {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencySelector for ExclusionDependencySelector {
    fn select_dependency(&self, dependency: &Dependency) -> bool {
        !self.matches_id(&dependency.artifact().versionless_id())
    }

    fn derive_child_selector(self: Arc<Self>, context: &DescentContext) -> Arc<dyn DependencySelector> {
        let incoming = context.dependency.exclusions();
        if incoming.is_empty() {
            return self;
        }
        let mut merged = (*self.exclusions).clone();
        let before = merged.len();
        merged.extend(incoming.iter().cloned());
        if merged.len() == before {
            return self;
        }
        Arc::new(Self {
            exclusions: Arc::new(merged),
        })
    }
}

// ---------------------------------------------------------------------
// ClassicDependencyManager
// ---------------------------------------------------------------------

/// The default manager (§4.E): records managed fields seen along the
/// descent, first-seen wins ("nearest-wins for management"), but only
/// actually overrides a dependency once the manager itself sits at depth
/// ≥ 2 — matching "applies management only at depth ≥ 2".
#[derive(Debug, Clone)]
pub struct ClassicDependencyManager {
    depth: usize,
    managed: Arc<indexmap::IndexMap<VersionlessId, Management>>,
}

impl ClassicDependencyManager {
    pub fn new() -> Self {
        Self {
            depth: 0,
            managed: Arc::new(indexmap::IndexMap::new()),
        }
    }
}

impl Default for ClassicDependencyManager {
    fn default() -> Self {
        Self::new()
    }
}

fn management_from(dependency: &Dependency) -> Management {
    Management {
        version_constraint: Some(dependency.version_constraint().clone()),
        scope: Some(dependency.scope().to_string()).filter(|s| !s.is_empty()),
        optional: Some(dependency.is_optional()),
        exclusions: Some(dependency.exclusions().clone()).filter(|s| !s.is_empty()),
    }
}

impl DependencyManager for ClassicDependencyManager {
    fn manage_dependency(&self, dependency: &Dependency) -> Option<Management> {
        if self.depth < 2 {
            return None;
        }
        self.managed
            .get(&dependency.artifact().versionless_id())
            .cloned()
    }

    fn derive_child_manager(
        self: Arc<Self>,
        context: &DescentContext,
        declared_management: &[Dependency],
    ) -> Arc<dyn DependencyManager> {
        if declared_management.is_empty() && self.depth == context.depth {
            return self;
        }
        let mut merged = (*self.managed).clone();
        for dep in declared_management {
            merged
                .entry(dep.artifact().versionless_id())
                .or_insert_with(|| management_from(dep));
        }
        Arc::new(Self {
            depth: context.depth,
            managed: Arc::new(merged),
        })
    }
}

// ---------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------

/// Includes an edge only if every member selector includes it.
#[derive(Debug, Clone)]
pub struct AndDependencySelector(pub Vec<Arc<dyn DependencySelector>>);

impl DependencySelector for AndDependencySelector {
    fn select_dependency(&self, dependency: &Dependency) -> bool {
        self.0.iter().all(|s| s.select_dependency(dependency))
    }

    fn derive_child_selector(self: Arc<Self>, context: &DescentContext) -> Arc<dyn DependencySelector> {
        let derived: Vec<Arc<dyn DependencySelector>> = self
            .0
            .iter()
            .map(|s| Arc::clone(s).derive_child_selector(context))
            .collect();
        let unchanged = derived
            .iter()
            .zip(self.0.iter())
            .all(|(a, b)| Arc::ptr_eq(a, b));
        if unchanged {
            self
        } else {
            Arc::new(AndDependencySelector(derived))
        }
    }
}

/// Includes an edge if any member selector includes it.
#[derive(Debug, Clone)]
pub struct OrDependencySelector(pub Vec<Arc<dyn DependencySelector>>);

impl DependencySelector for OrDependencySelector {
    fn select_dependency(&self, dependency: &Dependency) -> bool {
        self.0.iter().any(|s| s.select_dependency(dependency))
    }

    fn derive_child_selector(self: Arc<Self>, context: &DescentContext) -> Arc<dyn DependencySelector> {
        let derived: Vec<Arc<dyn DependencySelector>> = self
            .0
            .iter()
            .map(|s| Arc::clone(s).derive_child_selector(context))
            .collect();
        let unchanged = derived
            .iter()
            .zip(self.0.iter())
            .all(|(a, b)| Arc::ptr_eq(a, b));
        if unchanged {
            self
        } else {
            Arc::new(OrDependencySelector(derived))
        }
    }
}

/// Layers multiple management sources: later members override fields set
/// by earlier ones for the same dependency.
#[derive(Debug, Clone)]
pub struct ChainedDependencyManager(pub Vec<Arc<dyn DependencyManager>>);

impl DependencyManager for ChainedDependencyManager {
    fn manage_dependency(&self, dependency: &Dependency) -> Option<Management> {
        self.0
            .iter()
            .filter_map(|m| m.manage_dependency(dependency))
            .fold(None, |acc, next| match acc {
                None => Some(next),
                Some(base) => Some(next.merge_over(base)),
            })
    }

    fn derive_child_manager(
        self: Arc<Self>,
        context: &DescentContext,
        declared_management: &[Dependency],
    ) -> Arc<dyn DependencyManager> {
        let derived: Vec<Arc<dyn DependencyManager>> = self
            .0
            .iter()
            .map(|m| Arc::clone(m).derive_child_manager(context, declared_management))
            .collect();
        let unchanged = derived
            .iter()
            .zip(self.0.iter())
            .all(|(a, b)| Arc::ptr_eq(a, b));
        if unchanged {
            self
        } else {
            Arc::new(ChainedDependencyManager(derived))
        }
    }
}
