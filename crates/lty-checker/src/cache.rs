//! Shared declaration-type cache.
//!
//! Entries are keyed by declaration, the generation of the file that holds
//! it, and a fingerprint of the generic bindings active when it was
//! computed. A re-indexed file gets a new generation, so stale entries are
//! never *hit*; `invalidate_file` additionally drops them, together with
//! everything recorded as depending on the file or on a name it declares.
//!
//! All maps are `DashMap`s. Two threads computing the same key race with
//! insert-if-absent; the loser's value is discarded.

use dashmap::DashMap;
use lty_binder::DeclKey;
use lty_common::{Atom, FileId};
use lty_solver::Ty;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub decl: DeclKey,
    pub generation: u64,
    /// `TypeSubstitution::fingerprint` of the active bindings.
    pub fingerprint: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct InferenceCache {
    entries: DashMap<CacheKey, Ty>,
    /// Dependent file -> files its cached results read declarations from.
    file_dependencies: DashMap<FileId, FxHashSet<FileId>>,
    /// Dependent file -> global, class and alias names its cached results
    /// looked up (found or not).
    name_dependencies: DashMap<FileId, FxHashSet<Atom>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InferenceCache {
    pub fn new() -> Self {
        InferenceCache::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Ty> {
        let found = self.entries.get(key).map(|entry| entry.value().clone());
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(decl = %key.decl, "cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Insert unless another thread got there first. Returns the value now
    /// stored under `key`.
    pub fn insert(&self, key: CacheKey, ty: Ty) -> Ty {
        self.entries.entry(key).or_insert(ty).value().clone()
    }

    pub fn record_file_dependency(&self, dependent: FileId, dependency: FileId) {
        if dependent == dependency {
            return;
        }
        self.file_dependencies
            .entry(dependent)
            .or_default()
            .insert(dependency);
    }

    pub fn record_name_dependency(&self, dependent: FileId, name: &Atom) {
        self.name_dependencies
            .entry(dependent)
            .or_default()
            .insert(name.clone());
    }

    /// Drop every entry of `file`, of files that looked up any of `names`,
    /// and transitively of files depending on those. Returns the number of
    /// affected files.
    pub fn invalidate_file(&self, file: FileId, names: &[Atom]) -> usize {
        let mut reverse: FxHashMap<FileId, Vec<FileId>> = FxHashMap::default();
        for entry in self.file_dependencies.iter() {
            for &dependency in entry.value() {
                reverse.entry(dependency).or_default().push(*entry.key());
            }
        }

        let mut affected: FxHashSet<FileId> = FxHashSet::default();
        let mut pending = VecDeque::new();
        affected.insert(file);
        pending.push_back(file);
        if !names.is_empty() {
            for entry in self.name_dependencies.iter() {
                let reads_name = names.iter().any(|name| entry.value().contains(name));
                if reads_name && affected.insert(*entry.key()) {
                    pending.push_back(*entry.key());
                }
            }
        }

        while let Some(current) = pending.pop_front() {
            if let Some(dependents) = reverse.get(&current) {
                for &dependent in dependents {
                    if affected.insert(dependent) {
                        pending.push_back(dependent);
                    }
                }
            }
        }

        let before = self.entries.len();
        self.entries.retain(|key, _| !affected.contains(&key.decl.file));
        for file in &affected {
            self.file_dependencies.remove(file);
            self.name_dependencies.remove(file);
        }
        debug!(
            %file,
            files = affected.len(),
            entries = before.saturating_sub(self.entries.len()),
            "invalidated inference cache"
        );
        affected.len()
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.file_dependencies.clear();
        self.name_dependencies.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[path = "../tests/cache_tests.rs"]
mod tests;
