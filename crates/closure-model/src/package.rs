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

use std::{cmp::Ordering, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::version;

fn default_kind() -> String {
    "runtime".to_owned()
}

/// A dependency as declared by one version of a package. The target is only
/// known by name until the resolver matches it against a concrete version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub package_name: String,
    #[serde(default)]
    pub ecosystem: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub optional: bool,
}

impl Dependency {
    /// A non-optional runtime dependency.
    pub fn new(package_name: impl Into<String>, requirements: impl Into<String>) -> Self {
        Dependency {
            package_name: package_name.into(),
            ecosystem: String::new(),
            requirements: requirements.into(),
            kind: default_kind(),
            optional: false,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_ecosystem(mut self, ecosystem: impl Into<String>) -> Self {
        self.ecosystem = ecosystem.into();
        self
    }
}

/// One published version of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Set when the version is no longer installable (yanked, removed, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Version {
    pub fn new(number: impl Into<String>) -> Self {
        Version {
            number: number.into(),
            published_at: None,
            status: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// The number used for comparisons and range matching.
    pub fn clean_number(&self) -> String {
        version::clean_number(&self.number)
    }

    pub fn semantic_version(&self) -> Option<semver::Version> {
        version::clean(&self.number)
    }

    pub fn is_active(&self) -> bool {
        self.status.as_deref().is_none_or(str::is_empty)
    }
}

/// Orders two versions of one package, oldest first.
///
/// Two semver-shaped numbers compare by semver precedence. As soon as either
/// side is not semver-shaped, the publish timestamps decide instead; a
/// version without a timestamp sorts before any version that has one.
///
/// Mixing the two rules is not transitive, so pick extremes with `min_by` or
/// `max_by` instead of sorting with it.
pub fn compare_versions(a: &Version, b: &Version) -> Ordering {
    match (a.semantic_version(), b.semantic_version()) {
        (Some(x), Some(y)) => x
            .cmp(&y)
            .then_with(|| a.published_at.cmp(&b.published_at)),
        _ => a.published_at.cmp(&b.published_at),
    }
}

/// A package of one registry. Names are unique per registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub ecosystem: String,
    #[serde(default)]
    pub versions: Vec<Arc<Version>>,
}

impl Package {
    pub fn new(name: impl Into<String>, ecosystem: impl Into<String>) -> Self {
        Package {
            name: name.into(),
            ecosystem: ecosystem.into(),
            versions: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.versions.push(Arc::new(version));
        self
    }

    /// Versions that can still be selected by the resolver.
    pub fn active_versions(&self) -> impl Iterator<Item = &Arc<Version>> {
        self.versions.iter().filter(|v| v.is_active())
    }

    /// Finds a version by its number, falling back to the cleaned form so
    /// that `v1.2.0` and `1.2.0` name the same version.
    pub fn find_version(&self, number: &str) -> Option<&Arc<Version>> {
        self.versions
            .iter()
            .find(|v| v.number == number)
            .or_else(|| {
                let cleaned = version::clean_number(number);
                self.versions.iter().find(|v| v.clean_number() == cleaned)
            })
    }
}
