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

//! Ecosystem-specific resolution rules.
//!
//! Ecosystems differ in two ways that matter to the resolver: which of the
//! versions satisfying a requirement gets picked, and whether one closure may
//! contain several versions of the same package.

use std::sync::Arc;

use closure_model::{compare_versions, Version};

pub trait EcosystemPolicy: Sync {
    /// Picks one version out of the candidates that satisfy a requirement.
    /// Returns `None` only if `candidates` is empty.
    fn select_best_version(&self, candidates: &[Arc<Version>]) -> Option<Arc<Version>>;

    /// Whether each dependant gets its own copy of a dependency (npm, cargo),
    /// as opposed to a single installed version per package.
    fn allows_multiple_versions(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Earliest,
    Latest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionPolicy {
    pub selection: Selection,
    pub multiple_versions: bool,
}

impl EcosystemPolicy for VersionPolicy {
    fn select_best_version(&self, candidates: &[Arc<Version>]) -> Option<Arc<Version>> {
        let best = match self.selection {
            Selection::Earliest => candidates.iter().min_by(|a, b| compare_versions(a, b)),
            Selection::Latest => candidates.iter().max_by(|a, b| compare_versions(a, b)),
        };
        best.cloned()
    }

    fn allows_multiple_versions(&self) -> bool {
        self.multiple_versions
    }
}

pub static DEFAULT_POLICY: VersionPolicy = VersionPolicy {
    selection: Selection::Earliest,
    multiple_versions: false,
};

/// Ecosystems where every dependant resolves its dependencies in isolation.
pub static NESTED_POLICY: VersionPolicy = VersionPolicy {
    selection: Selection::Earliest,
    multiple_versions: true,
};

pub static GO_POLICY: VersionPolicy = VersionPolicy {
    selection: Selection::Latest,
    multiple_versions: false,
};

pub fn policy_for_ecosystem(ecosystem: &str) -> &'static dyn EcosystemPolicy {
    match ecosystem.to_ascii_lowercase().as_str() {
        "go" => &GO_POLICY,
        "npm" | "cargo" => &NESTED_POLICY,
        _ => &DEFAULT_POLICY,
    }
}
