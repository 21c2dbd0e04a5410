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

use std::sync::Arc;

use closure_model::{requirement, Package, Version};

use crate::{
    policy::EcosystemPolicy,
    resolver::{ResolutionContext, ResolutionError, MAX_REPORTED_CANDIDATES},
    satisfier::{ConstraintSatisfier, SatisfierError},
};

/// Selects the concrete version of a package that a requirement resolves to.
pub struct VersionMatcher<'a> {
    satisfier: &'a dyn ConstraintSatisfier,
    policy: &'a dyn EcosystemPolicy,
}

impl<'a> VersionMatcher<'a> {
    pub fn new(satisfier: &'a dyn ConstraintSatisfier, policy: &'a dyn EcosystemPolicy) -> Self {
        VersionMatcher { satisfier, policy }
    }

    /// Finds the version of `package` that `requirements` resolves to among
    /// its active versions, leaving the choice between several matches to the
    /// ecosystem policy.
    pub fn find_matching_version(
        &self,
        ctx: &mut ResolutionContext,
        package: &Package,
        requirements: &str,
    ) -> Result<Arc<Version>, ResolutionError> {
        let normalized = requirement::normalize(requirements);
        if let Some(version) = ctx.matched_version(&package.name, &normalized) {
            return Ok(version);
        }

        let candidates: Vec<Arc<Version>> = package
            .active_versions()
            .filter(|version| self.version_matches(ctx, package, version, &normalized))
            .cloned()
            .collect();

        let Some(best) = self.policy.select_best_version(&candidates) else {
            return Err(ResolutionError::NoSatisfyingVersion {
                package: package.name.clone(),
                requirement: requirements.to_owned(),
                candidates: package
                    .active_versions()
                    .take(MAX_REPORTED_CANDIDATES)
                    .map(|v| v.number.clone())
                    .collect(),
            });
        };

        log::debug!(
            "---- {} {:?}: {} candidates, selected {}",
            package.name,
            requirements,
            candidates.len(),
            best.number
        );
        ctx.remember_match(&package.name, &normalized, Arc::clone(&best));
        Ok(best)
    }

    fn version_matches(
        &self,
        ctx: &mut ResolutionContext,
        package: &Package,
        version: &Version,
        normalized: &str,
    ) -> bool {
        if requirement::is_wildcard(normalized) {
            return true;
        }

        let clean_number = version.clean_number();
        if let Some(result) = ctx.satisfied(&clean_number, normalized, &package.ecosystem) {
            return result;
        }

        let result = match self
            .satisfier
            .satisfies(&clean_number, normalized, &package.ecosystem)
        {
            Ok(result) => result,
            Err(err) => {
                match &err {
                    SatisfierError::InvalidRequirement { .. } => log::warn!(
                        "Falling back to exact matching for {}: {}",
                        package.name,
                        err
                    ),
                    SatisfierError::InvalidVersion(_) => log::debug!(
                        "Falling back to exact matching for {}: {}",
                        package.name,
                        err
                    ),
                }
                clean_number == normalized
            }
        };
        ctx.remember_satisfied(&clean_number, normalized, &package.ecosystem, result);
        result
    }
}
