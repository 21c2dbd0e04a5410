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

//! Transitive dependency closure of a package version.
//!
//! [`ClosureResolver`] walks the dependency graph of a registry depth first,
//! picking one concrete version per dependency edge, and returns every edge
//! reachable from the root. [`CachedResolver`] memoizes whole resolutions in
//! a [`ResultCache`].

pub mod cache;
pub mod filter;
pub mod matcher;
pub mod merge;
pub mod policy;
pub mod resolver;
pub mod satisfier;
pub mod store;

pub use cache::{CachedResolver, MemoryCache, NoCache, ResultCache};
pub use policy::{policy_for_ecosystem, EcosystemPolicy};
pub use resolver::{
    ClosureResolver, ResolutionError, ResolveOptions, ResolvedDependency, VersionRef,
};
pub use satisfier::{ConstraintSatisfier, SatisfierError, SemverSatisfier};
pub use store::{MemoryStore, PackageStore};
