//! Immutable value types for artifact coordinates and dependency edges (§3).

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::error::ParseError;
use crate::version::{Version, VersionConstraint};

const DEFAULT_EXTENSION: &str = "jar";

/// An immutable `(groupId, artifactId, extension, classifier, version)`
/// coordinate plus an opaque property map and optional backing file.
///
/// `classifier` defaults to empty, `extension` to `"jar"`. All mutators
/// (`with_version`, `with_file`, ...) return a new `Artifact`; there is no
/// in-place mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    group_id: String,
    artifact_id: String,
    extension: String,
    classifier: String,
    version: Version,
    properties: IndexMap<String, String>,
    file: Option<PathBuf>,
}

impl Artifact {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>, version: Version) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            classifier: String::new(),
            version,
            properties: IndexMap::new(),
            file: None,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_file(mut self, file: PathBuf) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// The snapshot-normalized version (§3 `baseVersion`).
    pub fn base_version(&self) -> String {
        self.version.base_version()
    }

    /// `(groupId, artifactId, extension, classifier)` — identity without a
    /// version, used to group conflict candidates (§4.G).
    pub fn versionless_id(&self) -> VersionlessId {
        VersionlessId {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            extension: self.extension.clone(),
            classifier: self.classifier.clone(),
        }
    }

    /// Parses `groupId:artifactId[:extension[:classifier]]:version` (§6).
    pub fn parse_coordinate(raw: &str) -> Result<Self, ParseError> {
        let invalid = |reason: &str| ParseError::InvalidCoordinate {
            input: raw.to_string(),
            reason: reason.to_string(),
        };
        let parts: Vec<&str> = raw.split(':').collect();
        let (group_id, artifact_id, extension, classifier, version_str) = match parts.as_slice() {
            [g, a, v] => (*g, *a, DEFAULT_EXTENSION, "", *v),
            [g, a, e, v] => (*g, *a, *e, "", *v),
            [g, a, e, c, v] => (*g, *a, *e, *c, *v),
            _ => return Err(invalid("expected 3 to 5 colon-separated fields")),
        };
        if group_id.is_empty() || artifact_id.is_empty() {
            return Err(invalid("groupId and artifactId must be non-empty"));
        }
        let version = Version::parse(version_str).map_err(|e| invalid(&e.to_string()))?;
        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            extension: extension.to_string(),
            classifier: classifier.to_string(),
            version,
            properties: IndexMap::new(),
            file: None,
        })
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

/// `(groupId, artifactId, extension, classifier)` with no version: the
/// identity two dependency nodes share when they belong to the same conflict
/// group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionlessId {
    pub group_id: String,
    pub artifact_id: String,
    pub extension: String,
    pub classifier: String,
}

impl fmt::Display for VersionlessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        Ok(())
    }
}

/// A wildcard-aware exclusion pattern: `"*"` in any field matches anything
/// (§3 "Dependency" exclusions).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
    pub extension: String,
    pub classifier: String,
}

impl Exclusion {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        extension: impl Into<String>,
        classifier: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            extension: extension.into(),
            classifier: classifier.into(),
        }
    }

    pub fn everything() -> Self {
        Self::new("*", "*", "*", "*")
    }

    pub fn matches(&self, id: &VersionlessId) -> bool {
        field_matches(&self.group_id, &id.group_id)
            && field_matches(&self.artifact_id, &id.artifact_id)
            && field_matches(&self.extension, &id.extension)
            && field_matches(&self.classifier, &id.classifier)
    }
}

fn field_matches(pattern: &str, value: &str) -> bool {
    pattern == "*" || pattern == value
}

/// A resolvable reference to an artifact: its coordinate (with a
/// [`VersionConstraint`] rather than a pinned version, at collection time),
/// scope, optionality, and accumulated exclusions (§3 "Dependency").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    artifact: Artifact,
    version_constraint: VersionConstraint,
    scope: String,
    optional: bool,
    exclusions: BTreeSet<Exclusion>,
}

impl Dependency {
    pub fn new(artifact: Artifact, scope: impl Into<String>) -> Self {
        let version_constraint = VersionConstraint::Soft(artifact.version().clone());
        Self {
            artifact,
            version_constraint,
            scope: scope.into(),
            optional: false,
            exclusions: BTreeSet::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: VersionConstraint) -> Self {
        self.version_constraint = constraint;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_exclusions(mut self, exclusions: BTreeSet<Exclusion>) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn version_constraint(&self) -> &VersionConstraint {
        &self.version_constraint
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn exclusions(&self) -> &BTreeSet<Exclusion> {
        &self.exclusions
    }

    pub fn is_excluded_by(&self, id: &VersionlessId) -> bool {
        self.exclusions.iter().any(|e| e.matches(id))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.artifact, self.version_constraint)?;
        if !self.scope.is_empty() {
            write!(f, " [{}]", self.scope)?;
        }
        if self.optional {
            write!(f, " optional")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn parses_coordinate_forms() {
        let a = Artifact::parse_coordinate("g:a:1.0").unwrap();
        assert_eq!(a.extension(), "jar");
        assert_eq!(a.classifier(), "");

        let b = Artifact::parse_coordinate("g:a:zip:1.0").unwrap();
        assert_eq!(b.extension(), "zip");

        let c = Artifact::parse_coordinate("g:a:zip:sources:1.0").unwrap();
        assert_eq!(c.classifier(), "sources");

        assert!(Artifact::parse_coordinate("g:a").is_err());
    }

    #[test]
    fn versionless_id_ignores_version() {
        let a = Artifact::new("g", "a", v("1.0"));
        let b = Artifact::new("g", "a", v("2.0"));
        assert_eq!(a.versionless_id(), b.versionless_id());
    }

    #[test]
    fn wildcard_exclusion_matches_any_field() {
        let id = VersionlessId {
            group_id: "g".into(),
            artifact_id: "a".into(),
            extension: "jar".into(),
            classifier: "".into(),
        };
        assert!(Exclusion::everything().matches(&id));
        assert!(Exclusion::new("g", "*", "*", "*").matches(&id));
        assert!(!Exclusion::new("other", "*", "*", "*").matches(&id));
    }

    #[test]
    fn dependency_defaults_to_soft_constraint_on_its_own_version() {
        let a = Artifact::new("g", "a", v("1.0"));
        let dep = Dependency::new(a, "compile");
        assert!(!dep.version_constraint().is_hard());
        assert!(dep.version_constraint().contains_version(&v("99.0")));
    }
}
