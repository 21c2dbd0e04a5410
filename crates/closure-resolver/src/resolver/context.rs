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

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use closure_model::{Package, Version};

use crate::store::PackageStore;

use super::ResolutionError;

/// Per-resolution state: the versions on the current traversal path and the
/// memo tables for store lookups, version matches and range checks.
///
/// A context is meant to live for exactly one top-level resolution. Reusing
/// one across resolutions against a changing store would serve stale data.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    path: HashSet<(String, String)>,
    packages: HashMap<(String, String), Option<Arc<Package>>>,
    matches: HashMap<(String, String), Arc<Version>>,
    satisfied: HashMap<(String, String, String), bool>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        ResolutionContext::default()
    }

    /// Looks up a package, asking the store at most once per name.
    pub fn find_package(
        &mut self,
        store: &dyn PackageStore,
        registry: &str,
        name: &str,
    ) -> Result<Option<Arc<Package>>, ResolutionError> {
        let key = (registry.to_owned(), name.to_owned());
        if let Some(package) = self.packages.get(&key) {
            return Ok(package.clone());
        }
        let package = store
            .find_package(registry, name)
            .map_err(ResolutionError::Store)?;
        self.packages.insert(key, package.clone());
        Ok(package)
    }

    /// Marks a version as being on the current path. Returns `false` if it
    /// already was.
    pub fn enter(&mut self, name: &str, version: &str) -> bool {
        self.path.insert((name.to_owned(), version.to_owned()))
    }

    pub fn leave(&mut self, name: &str, version: &str) {
        self.path.remove(&(name.to_owned(), version.to_owned()));
    }

    pub fn is_on_path(&self, name: &str, version: &str) -> bool {
        self.path.contains(&(name.to_owned(), version.to_owned()))
    }

    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    pub(crate) fn matched_version(&self, package: &str, requirement: &str) -> Option<Arc<Version>> {
        self.matches
            .get(&(package.to_owned(), requirement.to_owned()))
            .cloned()
    }

    pub(crate) fn remember_match(&mut self, package: &str, requirement: &str, version: Arc<Version>) {
        self.matches
            .insert((package.to_owned(), requirement.to_owned()), version);
    }

    pub(crate) fn satisfied(&self, version: &str, requirement: &str, ecosystem: &str) -> Option<bool> {
        self.satisfied
            .get(&(version.to_owned(), requirement.to_owned(), ecosystem.to_owned()))
            .copied()
    }

    pub(crate) fn remember_satisfied(
        &mut self,
        version: &str,
        requirement: &str,
        ecosystem: &str,
        result: bool,
    ) {
        self.satisfied.insert(
            (version.to_owned(), requirement.to_owned(), ecosystem.to_owned()),
            result,
        );
    }
}
