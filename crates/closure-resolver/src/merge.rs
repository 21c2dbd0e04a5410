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

//! Deduplication of dependency edges that converge on the same package.

use indexmap::{map::Entry, IndexMap, IndexSet};

use crate::{policy::EcosystemPolicy, resolver::ResolvedDependency};

/// Deduplicates a list of resolved dependencies, keeping first-seen order.
///
/// If the ecosystem allows several versions of a package side by side, only
/// edges to the same package *and* version collapse. Otherwise edges collapse
/// per package and their requirements are OR-joined; the result does not
/// change which version was selected.
pub fn merge_dependencies(
    dependencies: Vec<ResolvedDependency>,
    policy: &dyn EcosystemPolicy,
) -> Vec<ResolvedDependency> {
    if policy.allows_multiple_versions() {
        dedup_exact(dependencies)
    } else {
        merge_by_package(dependencies)
    }
}

fn dedup_exact(dependencies: Vec<ResolvedDependency>) -> Vec<ResolvedDependency> {
    let mut seen = IndexSet::new();
    dependencies
        .into_iter()
        .filter(|dep| seen.insert((dep.package_name.clone(), dep.resolved_version.clone())))
        .collect()
}

fn merge_by_package(dependencies: Vec<ResolvedDependency>) -> Vec<ResolvedDependency> {
    let mut merged: IndexMap<String, ResolvedDependency> = IndexMap::new();
    for dep in dependencies {
        match merged.entry(dep.package_name.clone()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.requirements =
                    merge_requirements([existing.requirements.as_str(), dep.requirements.as_str()]);
            }
            Entry::Vacant(entry) => {
                entry.insert(dep);
            }
        }
    }
    merged.into_values().collect()
}

/// OR-joins requirement strings with `" || "`.
///
/// Requirements that already contain alternatives are split first, so merging
/// a merged string again does not repeat anything. Duplicates are dropped by
/// exact text, keeping the first occurrence; an empty requirement counts as
/// `*`.
pub fn merge_requirements<'a>(requirements: impl IntoIterator<Item = &'a str>) -> String {
    let mut alternatives = IndexSet::new();
    for requirement in requirements {
        for alternative in requirement.split("||") {
            let alternative = alternative.trim();
            alternatives.insert(if alternative.is_empty() {
                "*"
            } else {
                alternative
            });
        }
    }
    alternatives.into_iter().collect::<Vec<_>>().join(" || ")
}
