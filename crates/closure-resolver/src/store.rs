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

pub mod memory;

use std::sync::Arc;

use closure_model::Package;

pub use memory::MemoryStore;

/// Read access to the packages of one or more registries.
pub trait PackageStore {
    /// Looks up a package by name inside a registry. `Ok(None)` means the
    /// registry has no such package; `Err` is reserved for store failures.
    fn find_package(&self, registry: &str, name: &str) -> anyhow::Result<Option<Arc<Package>>>;
}

impl<S> PackageStore for &S
where
    S: PackageStore + ?Sized,
{
    fn find_package(&self, registry: &str, name: &str) -> anyhow::Result<Option<Arc<Package>>> {
        (**self).find_package(registry, name)
    }
}

impl<S> PackageStore for Arc<S>
where
    S: PackageStore + ?Sized,
{
    fn find_package(&self, registry: &str, name: &str) -> anyhow::Result<Option<Arc<Package>>> {
        (**self).find_package(registry, name)
    }
}
