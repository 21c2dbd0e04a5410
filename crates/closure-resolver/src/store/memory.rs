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

//! A package store held entirely in memory, loadable from a JSON snapshot.

use std::{collections::BTreeMap, collections::HashMap, io::Read, sync::Arc};

use closure_model::{Dependency, Package, Version};
use serde::{Deserialize, Serialize};

use super::PackageStore;

/// On-disk form of a [`MemoryStore`]: registry id to its packages.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub registries: BTreeMap<String, Vec<Package>>,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    registries: HashMap<String, HashMap<String, Arc<Package>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = MemoryStore::new();
        for (registry, packages) in snapshot.registries {
            for package in packages {
                store.add_package(&registry, package);
            }
        }
        store
    }

    pub fn from_reader(reader: impl Read) -> anyhow::Result<Self> {
        let snapshot: Snapshot = serde_json::from_reader(reader)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn to_snapshot(&self) -> Snapshot {
        let mut registries = BTreeMap::new();
        for (registry, packages) in &self.registries {
            let mut packages: Vec<Package> = packages.values().map(|p| (**p).clone()).collect();
            packages.sort_by(|a, b| a.name.cmp(&b.name));
            registries.insert(registry.clone(), packages);
        }
        Snapshot { registries }
    }

    /// Adds or replaces a package. Dependencies that do not name their
    /// ecosystem inherit the package's.
    pub fn add_package(&mut self, registry: &str, mut package: Package) -> &mut Self {
        for version in package.versions.iter_mut() {
            if version
                .dependencies
                .iter()
                .any(|dep| dep.ecosystem.is_empty())
            {
                let version = Arc::make_mut(version);
                for dep in version.dependencies.iter_mut() {
                    if dep.ecosystem.is_empty() {
                        dep.ecosystem = package.ecosystem.clone();
                    }
                }
            }
        }
        self.registries
            .entry(registry.to_owned())
            .or_default()
            .insert(package.name.clone(), Arc::new(package));
        self
    }

    /// Adds one version, creating the package on first use.
    pub fn add_version(
        &mut self,
        registry: &str,
        name: &str,
        ecosystem: &str,
        version: Version,
    ) -> &mut Self {
        let mut package = self
            .registries
            .get(registry)
            .and_then(|packages| packages.get(name))
            .map(|p| (**p).clone())
            .unwrap_or_else(|| Package::new(name, ecosystem));
        package.versions.push(Arc::new(version));
        self.add_package(registry, package)
    }

    /// Shorthand for a version whose dependencies are all non-optional
    /// runtime dependencies, given as `(name, requirements)` pairs.
    pub fn add_version_full<'a>(
        &mut self,
        registry: &str,
        name: &str,
        ecosystem: &str,
        number: &str,
        deps: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> &mut Self {
        let version = create_version(number, deps);
        self.add_version(registry, name, ecosystem, version)
    }

    pub fn package_count(&self) -> usize {
        self.registries.values().map(HashMap::len).sum()
    }
}

pub fn create_version<'a>(
    number: &str,
    deps: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Version {
    deps.into_iter()
        .fold(Version::new(number), |version, (name, req)| {
            version.with_dependency(Dependency::new(name, req))
        })
}

impl PackageStore for MemoryStore {
    fn find_package(&self, registry: &str, name: &str) -> anyhow::Result<Option<Arc<Package>>> {
        Ok(self
            .registries
            .get(registry)
            .and_then(|packages| packages.get(name))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;

    #[test]
    fn test_memory_store_add() {
        let mut store = MemoryStore::new();
        store
            .add_version_full("npmjs.org", "foo", "npm", "0.2.0", [("bar", "^1.0.0")])
            .add_version_full("npmjs.org", "foo", "npm", "0.1.0", [])
            .add_version_full("npmjs.org", "bar", "npm", "1.0.0", []);

        let foo = store.find_package("npmjs.org", "foo").unwrap().unwrap();
        let numbers: Vec<_> = foo.versions.iter().map(|v| v.number.as_str()).collect();
        assert_eq!(numbers, vec!["0.2.0", "0.1.0"]);
        assert_eq!(foo.versions[0].dependencies[0].ecosystem, "npm");

        assert!(store.find_package("npmjs.org", "baz").unwrap().is_none());
        assert!(store.find_package("crates.io", "foo").unwrap().is_none());
        assert_eq!(store.package_count(), 2);
    }

    #[test]
    fn test_explicit_dependency_ecosystem_is_kept() {
        let version = Version::new("1.0.0")
            .with_dependency(Dependency::new("numpy", ">=1.20"))
            .with_dependency(Dependency::new("libc", "^0.2").with_ecosystem("cargo"));
        let mut store = MemoryStore::new();
        store.add_package("pypi.org", Package::new("maturin", "pypi").with_version(version));

        let maturin = store.find_package("pypi.org", "maturin").unwrap().unwrap();
        let ecosystems: Vec<_> = maturin.versions[0]
            .dependencies
            .iter()
            .map(|dep| dep.ecosystem.as_str())
            .collect();
        assert_eq!(ecosystems, vec!["pypi", "cargo"]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let json = r#"{
            "registries": {
                "rubygems.org": [
                    {
                        "name": "rails",
                        "ecosystem": "rubygems",
                        "versions": [
                            {
                                "number": "7.1.0",
                                "dependencies": [
                                    {"package_name": "activesupport", "requirements": "= 7.1.0"},
                                    {"package_name": "minitest", "requirements": ">= 5.1", "kind": "development"}
                                ]
                            }
                        ]
                    }
                ]
            }
        }"#;
        let store = MemoryStore::from_reader(json.as_bytes()).unwrap();
        let rails = store.find_package("rubygems.org", "rails").unwrap().unwrap();
        expect![[r#"
            [
                Dependency {
                    package_name: "activesupport",
                    ecosystem: "rubygems",
                    requirements: "= 7.1.0",
                    kind: "runtime",
                    optional: false,
                },
                Dependency {
                    package_name: "minitest",
                    ecosystem: "rubygems",
                    requirements: ">= 5.1",
                    kind: "development",
                    optional: false,
                },
            ]
        "#]]
        .assert_debug_eq(&rails.versions[0].dependencies);

        let snapshot = store.to_snapshot();
        assert_eq!(snapshot.registries["rubygems.org"].len(), 1);
    }
}
