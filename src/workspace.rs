//! Workspace container for multi-file inference.
//!
//! Holds the project-wide stub index, the shared inference cache and the
//! options every query runs with. All methods take `&self`; a `Workspace`
//! can be shared across threads and queried concurrently while files are
//! being replaced.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use lty_binder::{DeclKey, IndexSnapshot, StubIndex};
use lty_checker::{CacheStats, InferenceCache, InferenceOptions, Inferrer};
use lty_common::{Atom, CancellationToken, FileId};
use lty_solver::{Ty, TypeFormatter};
use lty_syntax::{NodeArena, NodeIndex};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::config::load_options;

#[derive(Debug, Default)]
pub struct Workspace {
    index: StubIndex,
    cache: InferenceCache,
    options: InferenceOptions,
}

impl Workspace {
    pub fn new(options: InferenceOptions) -> Self {
        Workspace {
            index: StubIndex::new(),
            cache: InferenceCache::new(),
            options,
        }
    }

    /// Workspace configured from an options file.
    pub fn from_config(path: &Path) -> Result<Self> {
        let options = load_options(path)?;
        info!(path = %path.display(), "loaded inference options");
        Ok(Workspace::new(options))
    }

    pub fn options(&self) -> &InferenceOptions {
        &self.options
    }

    pub fn file_count(&self) -> usize {
        self.index.len()
    }

    /// Index (or re-index) `file` and drop every cached result that could
    /// depend on its old or new contents. Returns the file's new generation.
    pub fn set_file(&self, file: FileId, arena: NodeArena) -> u64 {
        let mut names = self.contributed_names(file);
        let generation = self.index.set_file(file, arena);
        names.extend(self.contributed_names(file));
        self.invalidate(file, names);
        generation
    }

    pub fn remove_file(&self, file: FileId) -> bool {
        let names = self.contributed_names(file);
        let removed = self.index.remove_file(file);
        if removed {
            self.invalidate(file, names);
            let released = Atom::purge_unused();
            debug!(%file, released, "interned names released");
        }
        removed
    }

    fn contributed_names(&self, file: FileId) -> FxHashSet<Atom> {
        self.index
            .file(file)
            .map(|stubs| stubs.stubs.contributed_names().into_iter().collect())
            .unwrap_or_default()
    }

    fn invalidate(&self, file: FileId, names: FxHashSet<Atom>) {
        let mut names: Vec<Atom> = names.into_iter().collect();
        names.sort();
        let affected = self.cache.invalidate_file(file, &names);
        debug!(%file, names = names.len(), affected, "file changed");
    }

    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.index.snapshot()
    }

    /// Type of `node` in `file`. Never fails; anything that cannot be
    /// inferred is `Unknown`.
    pub fn infer_type(&self, file: FileId, node: NodeIndex) -> Ty {
        self.infer_type_cancellable(file, node, &CancellationToken::new())
    }

    /// [`infer_type`](Self::infer_type) that gives up with `Unknown` once
    /// `cancel` is signalled.
    pub fn infer_type_cancellable(&self, file: FileId, node: NodeIndex, cancel: &CancellationToken) -> Ty {
        let snapshot = self.index.snapshot();
        let mut inferrer = Inferrer::new(&snapshot, &self.cache, &self.options, cancel.clone());
        inferrer.infer_type(file, node)
    }

    /// Declarations `node` may refer to, in deterministic order.
    pub fn resolve_reference(&self, file: FileId, node: NodeIndex) -> Vec<DeclKey> {
        let snapshot = self.index.snapshot();
        let mut inferrer = Inferrer::new(&snapshot, &self.cache, &self.options, CancellationToken::new());
        inferrer.resolve_reference(file, node)
    }

    pub fn is_subtype(&self, a: &Ty, b: &Ty) -> bool {
        let snapshot = self.index.snapshot();
        let mut inferrer = Inferrer::new(&snapshot, &self.cache, &self.options, CancellationToken::new());
        inferrer.is_subtype(a, b)
    }

    /// Display form of a type.
    pub fn render(&self, ty: &Ty) -> String {
        TypeFormatter::new().format(ty)
    }

    /// Rendered type of `node`, as shown on hover.
    pub fn hover(&self, file: FileId, node: NodeIndex) -> String {
        self.render(&self.infer_type(file, node))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
