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

use closure_model::{Package, Version};

use crate::{
    filter::filter_dependencies, matcher::VersionMatcher, merge::merge_dependencies,
    policy::EcosystemPolicy, store::PackageStore,
};

use super::{ResolutionContext, ResolutionError, ResolveOptions, ResolvedDependency};

/// Depth-first walk over the dependency graph of a single registry.
pub(super) struct Traversal<'a> {
    pub store: &'a dyn PackageStore,
    pub registry: &'a str,
    pub options: &'a ResolveOptions,
    pub policy: &'static dyn EcosystemPolicy,
    pub matcher: VersionMatcher<'a>,
}

impl Traversal<'_> {
    pub fn resolve_root(
        &self,
        ctx: &mut ResolutionContext,
        package: &Package,
        version: &Version,
    ) -> Result<Vec<ResolvedDependency>, ResolutionError> {
        ctx.enter(&package.name, &version.number);
        let result = self.resolve_dependencies(ctx, version, 0);
        ctx.leave(&package.name, &version.number);
        result
    }

    /// Collects the dependencies of `version` and, recursively, theirs.
    ///
    /// Every version on the path from the root to `version` is marked in
    /// `ctx`, so an edge leading back onto the path is dropped instead of
    /// followed. The mark is removed once a subtree is done, which lets the
    /// same version show up again under an unrelated branch.
    fn resolve_dependencies(
        &self,
        ctx: &mut ResolutionContext,
        version: &Version,
        depth: usize,
    ) -> Result<Vec<ResolvedDependency>, ResolutionError> {
        if depth >= self.options.max_depth {
            return Ok(Vec::new());
        }

        let mut all_dependencies = Vec::new();
        let dependencies = filter_dependencies(
            version,
            self.options.kind_filter(),
            self.options.include_optional,
        );

        for dependency in dependencies {
            let Some(target) = ctx.find_package(self.store, self.registry, &dependency.package_name)?
            else {
                log::debug!(
                    "-- Skipping {}: not found in {}",
                    dependency.package_name,
                    self.registry
                );
                continue;
            };

            let matched = self
                .matcher
                .find_matching_version(ctx, &target, &dependency.requirements)?;

            if ctx.is_on_path(&target.name, &matched.number) {
                log::debug!(
                    "-- Skipping {}@{}: already on the current path",
                    target.name,
                    matched.number
                );
                continue;
            }

            log::debug!(
                "-- [depth {}] {}@{} -> {}@{}",
                depth,
                dependency.package_name,
                dependency.requirements,
                target.name,
                matched.number
            );
            all_dependencies.push(ResolvedDependency::new(dependency, &target, &matched));

            ctx.enter(&target.name, &matched.number);
            let nested = self.resolve_dependencies(ctx, &matched, depth + 1);
            ctx.leave(&target.name, &matched.number);
            all_dependencies.extend(nested?);
        }

        Ok(merge_dependencies(all_dependencies, self.policy))
    }
}
