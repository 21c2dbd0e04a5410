// Copyright 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::fmt;

use closure_model::{Dependency, Package, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    matcher::VersionMatcher, policy::policy_for_ecosystem, satisfier::ConstraintSatisfier,
    store::PackageStore,
};

pub mod context;
mod traversal;

pub use context::ResolutionContext;

use self::traversal::Traversal;

pub const DEFAULT_MAX_DEPTH: usize = 10;
pub const DEFAULT_MAX_DEPENDENCIES: usize = 30;
/// How many available versions a [`ResolutionError::NoSatisfyingVersion`] lists.
pub const MAX_REPORTED_CANDIDATES: usize = 5;

/// Any error that may abort a resolution.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error(
        "No version of '{package}' satisfies requirements: {requirement} (available: {})",
        format_candidates(.candidates)
    )]
    NoSatisfyingVersion {
        package: String,
        requirement: String,
        candidates: Vec<String>,
    },
    #[error("Too many dependencies: {count} exceeds limit of {limit}")]
    TooManyDependencies { count: usize, limit: usize },
    #[error("Unable to find {0}")]
    RootNotFound(VersionRef),
    #[error("Invalid resolution options: {0}")]
    InvalidOptions(String),
    #[error("Error while querying the package store: {0}")]
    Store(anyhow::Error),
}

fn format_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        "none".to_owned()
    } else {
        candidates.join(", ")
    }
}

/// The version a resolution starts from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRef {
    pub registry: String,
    pub package: String,
    pub version: String,
}

impl VersionRef {
    pub fn new(
        registry: impl Into<String>,
        package: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        VersionRef {
            registry: registry.into(),
            package: package.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} in {}", self.package, self.version, self.registry)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Levels of dependencies to follow; `0` resolves nothing and `1` only
    /// the direct dependencies.
    pub max_depth: usize,
    /// Upper bound on the size of the final closure.
    pub max_dependencies: usize,
    pub include_optional: bool,
    /// Only follow dependencies of this kind (`runtime`, `development`, ...).
    pub kind: Option<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            max_dependencies: DEFAULT_MAX_DEPENDENCIES,
            include_optional: false,
            kind: None,
        }
    }
}

impl ResolveOptions {
    /// The kind filter, with an empty string meaning no filter.
    pub fn kind_filter(&self) -> Option<&str> {
        self.kind.as_deref().filter(|kind| !kind.is_empty())
    }

    pub fn validate(&self) -> Result<(), ResolutionError> {
        if self.max_dependencies == 0 {
            return Err(ResolutionError::InvalidOptions(
                "max_dependencies must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// One edge of the closure: a declared dependency together with the version
/// it resolved to. For single-version ecosystems `requirements` may be the
/// OR-join of several dependants' requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub package_name: String,
    pub ecosystem: String,
    pub requirements: String,
    pub kind: String,
    pub optional: bool,
    pub resolved_version: String,
}

impl ResolvedDependency {
    pub fn new(dependency: &Dependency, target: &Package, version: &Version) -> Self {
        let ecosystem = if dependency.ecosystem.is_empty() {
            target.ecosystem.clone()
        } else {
            dependency.ecosystem.clone()
        };
        ResolvedDependency {
            package_name: dependency.package_name.clone(),
            ecosystem,
            requirements: dependency.requirements.clone(),
            kind: dependency.kind.clone(),
            optional: dependency.optional,
            resolved_version: version.number.clone(),
        }
    }
}

impl fmt::Display for ResolvedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.package_name, self.resolved_version)
    }
}

/// Computes the transitive dependency closure of a version.
///
/// The resolver holds no state between calls; everything memoized during a
/// resolution lives in a [`ResolutionContext`].
pub struct ClosureResolver<'a> {
    store: &'a dyn PackageStore,
    satisfier: &'a dyn ConstraintSatisfier,
}

impl<'a> ClosureResolver<'a> {
    pub fn new(store: &'a dyn PackageStore, satisfier: &'a dyn ConstraintSatisfier) -> Self {
        ClosureResolver { store, satisfier }
    }

    pub fn resolve(
        &self,
        root: &VersionRef,
        options: &ResolveOptions,
    ) -> Result<Vec<ResolvedDependency>, ResolutionError> {
        let mut ctx = ResolutionContext::new();
        self.resolve_with_context(&mut ctx, root, options)
    }

    /// Like [`ClosureResolver::resolve`], with the memo tables supplied by
    /// the caller.
    pub fn resolve_with_context(
        &self,
        ctx: &mut ResolutionContext,
        root: &VersionRef,
        options: &ResolveOptions,
    ) -> Result<Vec<ResolvedDependency>, ResolutionError> {
        options.validate()?;

        let package = ctx
            .find_package(self.store, &root.registry, &root.package)?
            .ok_or_else(|| ResolutionError::RootNotFound(root.clone()))?;
        let version = package
            .find_version(&root.version)
            .cloned()
            .ok_or_else(|| ResolutionError::RootNotFound(root.clone()))?;

        log::debug!("Begin resolving {} with {:?}", root, options);

        let policy = policy_for_ecosystem(&package.ecosystem);
        let traversal = Traversal {
            store: self.store,
            registry: &root.registry,
            options,
            policy,
            matcher: VersionMatcher::new(self.satisfier, policy),
        };
        let result = traversal.resolve_root(ctx, &package, &version)?;

        if result.len() > options.max_dependencies {
            log::debug!(
                "Closure of {} has {} dependencies, limit is {}",
                root,
                result.len(),
                options.max_dependencies
            );
            return Err(ResolutionError::TooManyDependencies {
                count: result.len(),
                limit: options.max_dependencies,
            });
        }

        log::debug!("Finished resolving {}: {} dependencies", root, result.len());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ResolutionError::NoSatisfyingVersion {
            package: "package-b".to_owned(),
            requirement: ">=2.0.0".to_owned(),
            candidates: vec!["1.0.0".to_owned(), "1.1.0".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "No version of 'package-b' satisfies requirements: >=2.0.0 (available: 1.0.0, 1.1.0)"
        );

        let err = ResolutionError::NoSatisfyingVersion {
            package: "package-b".to_owned(),
            requirement: "^1".to_owned(),
            candidates: vec![],
        };
        assert!(err.to_string().ends_with("(available: none)"));

        let err = ResolutionError::TooManyDependencies { count: 3, limit: 2 };
        assert_eq!(err.to_string(), "Too many dependencies: 3 exceeds limit of 2");

        let err = ResolutionError::RootNotFound(VersionRef::new("npmjs.org", "left-pad", "9.9.9"));
        assert_eq!(err.to_string(), "Unable to find left-pad@9.9.9 in npmjs.org");
    }

    #[test]
    fn test_options() {
        let options: ResolveOptions =
            serde_json::from_str(r#"{"max_depth": 3, "kind": ""}"#).unwrap();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.max_dependencies, DEFAULT_MAX_DEPENDENCIES);
        assert_eq!(options.kind_filter(), None);
        assert!(options.validate().is_ok());

        let options = ResolveOptions {
            max_dependencies: 0,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ResolutionError::InvalidOptions(_))
        ));
    }
}
