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

//! Memoization of whole resolutions.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use sha2::{Digest, Sha256};

use crate::resolver::{
    ClosureResolver, ResolutionError, ResolveOptions, ResolvedDependency, VersionRef,
};

/// How long a cached resolution stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A string key-value store with per-entry expiry.
///
/// Implementations may be shared between threads. Concurrent writers of the
/// same key are fine; the last write wins.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String, ttl: Duration);
    fn expire(&self, key: &str);
}

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        MemoryCache::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.lock()
            .insert(key.to_owned(), CacheEntry { value, expires_at });
    }

    fn expire(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// A cache that never holds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl ResultCache for NoCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: String, _ttl: Duration) {}

    fn expire(&self, _key: &str) {}
}

/// The cache key of a resolution.
///
/// Options other than the depth are folded into a digest, so the key stays
/// short and two option sets only share a key if they are equal. `:` and `%`
/// are percent-encoded in the registry, package and version so that the
/// fields cannot run into each other.
pub fn cache_key(root: &VersionRef, options: &ResolveOptions) -> String {
    let digest_input = serde_json::json!([
        options.include_optional,
        options.kind_filter(),
        options.max_dependencies
    ]);
    let digest = Sha256::digest(digest_input.to_string().as_bytes());
    format!(
        "transitive_deps:{}:{}:{}:{}:{:x}",
        escape_key_field(&root.registry),
        escape_key_field(&root.package),
        escape_key_field(&root.version),
        options.max_depth,
        digest
    )
}

fn escape_key_field(field: &str) -> String {
    field.replace('%', "%25").replace(':', "%3A")
}

/// A [`ClosureResolver`] whose results are kept in a [`ResultCache`].
pub struct CachedResolver<'a> {
    resolver: ClosureResolver<'a>,
    cache: &'a dyn ResultCache,
    ttl: Duration,
}

impl<'a> CachedResolver<'a> {
    pub fn new(resolver: ClosureResolver<'a>, cache: &'a dyn ResultCache) -> Self {
        CachedResolver {
            resolver,
            cache,
            ttl: CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the cached closure of `root` if there is one, and resolves and
    /// caches it otherwise. Failed resolutions are not cached.
    pub fn resolve_cached(
        &self,
        root: &VersionRef,
        options: &ResolveOptions,
    ) -> Result<Vec<ResolvedDependency>, ResolutionError> {
        let key = cache_key(root, options);

        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_str(&cached) {
                Ok(result) => {
                    log::debug!("Cache hit for {}", key);
                    return Ok(result);
                }
                Err(e) => {
                    log::warn!("Discarding unreadable cache entry {}: {}", key, e);
                    self.cache.expire(&key);
                }
            }
        }

        let result = self.resolver.resolve(root, options)?;
        match serde_json::to_string(&result) {
            Ok(serialized) => self.cache.set(&key, serialized, self.ttl),
            Err(e) => log::warn!("Unable to cache {}: {}", key, e),
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key() {
        let root = VersionRef::new("1", "package-a", "1.0.0");
        let options = ResolveOptions::default();
        let key = cache_key(&root, &options);
        assert!(key.starts_with("transitive_deps:1:package-a:1.0.0:10:"));
        // sha256 in hex
        assert_eq!(key.rsplit(':').next().unwrap().len(), 64);

        let same = ResolveOptions {
            kind: Some(String::new()),
            ..ResolveOptions::default()
        };
        assert_eq!(cache_key(&root, &same), key);

        let variants = [
            ResolveOptions {
                include_optional: true,
                ..ResolveOptions::default()
            },
            ResolveOptions {
                kind: Some("runtime".to_owned()),
                ..ResolveOptions::default()
            },
            ResolveOptions {
                max_dependencies: 31,
                ..ResolveOptions::default()
            },
            ResolveOptions {
                max_depth: 11,
                ..ResolveOptions::default()
            },
        ];
        for variant in &variants {
            assert_ne!(cache_key(&root, variant), key, "{:?}", variant);
        }
    }

    #[test]
    fn test_cache_key_fields_are_separated() {
        let options = ResolveOptions::default();
        let a = cache_key(&VersionRef::new("a:b", "c", "1.0.0"), &options);
        let b = cache_key(&VersionRef::new("a", "b:c", "1.0.0"), &options);
        assert_ne!(a, b);
        assert!(a.starts_with("transitive_deps:a%3Ab:c:1.0.0:10:"));
        assert!(b.starts_with("transitive_deps:a:b%3Ac:1.0.0:10:"));

        let escaped = cache_key(&VersionRef::new("a%3Ab", "c", "1.0.0"), &options);
        assert_ne!(escaped, a);
    }

    #[test]
    fn test_memory_cache_expiry() {
        let cache = MemoryCache::new();
        cache.set("a", "1".to_owned(), Duration::from_secs(60));
        cache.set("b", "2".to_owned(), Duration::ZERO);
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.len(), 1);

        cache.expire("a");
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_no_cache() {
        NoCache.set("a", "1".to_owned(), CACHE_TTL);
        assert!(NoCache.get("a").is_none());
    }
}
