//! Project-wide stub index.
//!
//! Files are added and replaced independently; each replacement gets a new
//! generation so caches keyed on it go stale on their own. Readers work on an
//! [`IndexSnapshot`], an immutable merged view built on demand and reused
//! until the next write.

use crate::builder::build_stubs;
use crate::stubs::{DeclId, DeclKey, DeclKind, MemberOwner, StubEntry, StubTree};
use dashmap::DashMap;
use lty_common::{Atom, FileId};
use lty_syntax::NodeArena;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// One indexed file: the tree snapshot and the stubs built from it.
#[derive(Debug)]
pub struct FileStubs {
    pub file: FileId,
    pub generation: u64,
    pub arena: Arc<NodeArena>,
    pub stubs: Arc<StubTree>,
}

#[derive(Debug, Default)]
pub struct StubIndex {
    files: DashMap<FileId, Arc<FileStubs>>,
    next_generation: AtomicU64,
    /// Bumped on every write; a cached snapshot is valid for one version.
    version: AtomicU64,
    snapshot: RwLock<Option<(u64, Arc<IndexSnapshot>)>>,
}

impl StubIndex {
    pub fn new() -> Self {
        StubIndex::default()
    }

    /// Index (or re-index) `file`. Returns the new generation.
    pub fn set_file(&self, file: FileId, arena: NodeArena) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let stubs = build_stubs(file, &arena);
        debug!(%file, generation, decls = stubs.len(), "indexed file");
        self.files.insert(
            file,
            Arc::new(FileStubs {
                file,
                generation,
                arena: Arc::new(arena),
                stubs: Arc::new(stubs),
            }),
        );
        self.version.fetch_add(1, Ordering::Release);
        generation
    }

    pub fn remove_file(&self, file: FileId) -> bool {
        let removed = self.files.remove(&file).is_some();
        if removed {
            info!(%file, "removed file from index");
            self.version.fetch_add(1, Ordering::Release);
        }
        removed
    }

    pub fn file(&self, file: FileId) -> Option<Arc<FileStubs>> {
        self.files.get(&file).map(|entry| Arc::clone(entry.value()))
    }

    pub fn generation(&self, file: FileId) -> Option<u64> {
        self.files.get(&file).map(|entry| entry.generation)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Merged read view of every file currently indexed.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        let version = self.version.load(Ordering::Acquire);
        {
            let cached = match self.snapshot.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some((cached_version, snapshot)) = cached.as_ref()
                && *cached_version == version
            {
                return Arc::clone(snapshot);
            }
        }

        let files: BTreeMap<FileId, Arc<FileStubs>> = self
            .files
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        let snapshot = Arc::new(IndexSnapshot::new(files));
        let mut cached = match self.snapshot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *cached = Some((version, Arc::clone(&snapshot)));
        snapshot
    }
}

/// Immutable cross-file view. Every list is in deterministic
/// `(file, declaration)` order.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    files: BTreeMap<FileId, Arc<FileStubs>>,
    classes: FxHashMap<Atom, Vec<DeclKey>>,
    aliases: FxHashMap<Atom, Vec<DeclKey>>,
    globals: FxHashMap<Atom, Vec<DeclKey>>,
    class_members: FxHashMap<Atom, Vec<DeclKey>>,
    global_members: FxHashMap<Atom, Vec<DeclKey>>,
}

impl IndexSnapshot {
    pub fn new(files: BTreeMap<FileId, Arc<FileStubs>>) -> Self {
        let mut snapshot = IndexSnapshot {
            files: BTreeMap::new(),
            ..IndexSnapshot::default()
        };
        for (&file, stubs) in &files {
            let tree = &stubs.stubs;
            for (name, ids) in tree.classes_map() {
                snapshot.classes.entry(name.clone()).or_default().extend(keys(file, ids));
            }
            for (name, ids) in tree.aliases_map() {
                snapshot.aliases.entry(name.clone()).or_default().extend(keys(file, ids));
            }
            for (name, ids) in tree.globals_map() {
                snapshot.globals.entry(name.clone()).or_default().extend(keys(file, ids));
            }
            for (owner, ids) in tree.members_map() {
                let target = match owner {
                    MemberOwner::Class(name) => snapshot.class_members.entry(name.clone()),
                    MemberOwner::Global(name) => snapshot.global_members.entry(name.clone()),
                    MemberOwner::Table(_) => continue,
                };
                target.or_default().extend(keys(file, ids));
            }
        }
        // Per-file maps iterate in hash order; restore declaration order.
        for list in snapshot
            .classes
            .values_mut()
            .chain(snapshot.aliases.values_mut())
            .chain(snapshot.globals.values_mut())
            .chain(snapshot.class_members.values_mut())
            .chain(snapshot.global_members.values_mut())
        {
            list.sort_unstable();
        }
        snapshot.files = files;
        snapshot
    }

    pub fn file(&self, file: FileId) -> Option<&Arc<FileStubs>> {
        self.files.get(&file)
    }

    pub fn files(&self) -> impl Iterator<Item = &Arc<FileStubs>> {
        self.files.values()
    }

    pub fn stubs(&self, file: FileId) -> Option<&StubTree> {
        self.files.get(&file).map(|f| f.stubs.as_ref())
    }

    pub fn arena(&self, file: FileId) -> Option<&NodeArena> {
        self.files.get(&file).map(|f| f.arena.as_ref())
    }

    pub fn generation(&self, file: FileId) -> u64 {
        self.files.get(&file).map_or(0, |f| f.generation)
    }

    pub fn entry(&self, key: DeclKey) -> Option<&StubEntry> {
        self.stubs(key.file)?.entry(key.decl)
    }

    pub fn class_decls(&self, name: &str) -> &[DeclKey] {
        self.classes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn alias_decls(&self, name: &str) -> &[DeclKey] {
        self.aliases.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn global_decls(&self, name: &str) -> &[DeclKey] {
        self.globals.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Direct supertypes of `class`, merged across its declarations.
    pub fn supertypes(&self, class: &str) -> SmallVec<[Atom; 2]> {
        let mut supers: SmallVec<[Atom; 2]> = SmallVec::new();
        for &key in self.class_decls(class) {
            if let Some(entry) = self.entry(key) {
                for name in &entry.supers {
                    if !supers.contains(name) {
                        supers.push(name.clone());
                    }
                }
            }
        }
        supers
    }

    /// Own member declarations of `class`, including those attached to a
    /// global variable that holds the class table.
    pub fn class_members(&self, class: &str) -> Vec<DeclKey> {
        let mut members: Vec<DeclKey> = self.class_members.get(class).cloned().unwrap_or_default();
        let global_holds_class = self
            .global_decls(class)
            .iter()
            .filter_map(|&key| self.entry(key))
            .any(|entry| entry.class.as_deref() == Some(class));
        if global_holds_class {
            members.extend(self.global_members(class).iter().copied());
            members.sort_unstable();
        }
        members
    }

    pub fn global_members(&self, name: &str) -> &[DeclKey] {
        self.global_members.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Members attached to the local table declared by `table`.
    pub fn table_members(&self, table: DeclKey) -> Vec<DeclKey> {
        self.stubs(table.file)
            .map(|tree| {
                tree.member_decls(&MemberOwner::Table(table.decl))
                    .iter()
                    .map(|&id| DeclKey::new(table.file, id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Members of `owner` as seen from `file` (table owners are file-local).
    pub fn owner_members(&self, file: FileId, owner: &MemberOwner) -> Vec<DeclKey> {
        match owner {
            MemberOwner::Class(class) => self.class_members(class),
            MemberOwner::Global(name) => self.global_members(name).to_vec(),
            MemberOwner::Table(decl) => self.table_members(DeclKey::new(file, *decl)),
        }
    }

    /// Entries of `kind` named `name` across all files.
    pub fn find_by_name(&self, name: &str, kind: Option<DeclKind>) -> Vec<DeclKey> {
        self.files
            .iter()
            .flat_map(|(&file, stubs)| {
                stubs
                    .stubs
                    .find_by_name(name, kind)
                    .into_iter()
                    .map(move |entry| DeclKey::new(file, entry.id))
            })
            .collect()
    }
}

fn keys(file: FileId, ids: &[DeclId]) -> impl Iterator<Item = DeclKey> + '_ {
    ids.iter().map(move |&id| DeclKey::new(file, id))
}

#[cfg(test)]
#[path = "../tests/index_tests.rs"]
mod tests;
