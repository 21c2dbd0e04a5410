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

use closure_model::{Dependency, Version};

/// Declared dependencies of `version` that take part in resolution: those of
/// the requested kind (any kind if `kind` is `None`), and optional ones only
/// if `include_optional` is set.
pub fn filter_dependencies<'a>(
    version: &'a Version,
    kind: Option<&str>,
    include_optional: bool,
) -> Vec<&'a Dependency> {
    version
        .dependencies
        .iter()
        .filter(|dep| kind.is_none_or(|kind| dep.kind == kind))
        .filter(|dep| include_optional || !dep.optional)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version() -> Version {
        Version::new("1.0.0")
            .with_dependency(Dependency::new("a", "^1").with_kind("runtime"))
            .with_dependency(Dependency::new("b", "^1").with_kind("dev"))
            .with_dependency(Dependency::new("c", "^1").with_optional(true))
    }

    fn names(deps: Vec<&Dependency>) -> Vec<&str> {
        deps.into_iter().map(|d| d.package_name.as_str()).collect()
    }

    #[test]
    fn test_filter_dependencies() {
        let v = version();
        assert_eq!(names(filter_dependencies(&v, None, false)), vec!["a", "b"]);
        assert_eq!(names(filter_dependencies(&v, None, true)), vec!["a", "b", "c"]);
        assert_eq!(names(filter_dependencies(&v, Some("runtime"), false)), vec!["a"]);
        assert_eq!(
            names(filter_dependencies(&v, Some("runtime"), true)),
            vec!["a", "c"]
        );
        assert!(filter_dependencies(&v, Some("build"), true).is_empty());
    }
}
