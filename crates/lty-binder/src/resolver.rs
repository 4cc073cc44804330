//! Name resolution over an [`IndexSnapshot`].
//!
//! A bare name at a position resolves in three steps, stopping at the first
//! that finds anything:
//! 1. lexical scopes from the innermost outward (latest visible binding)
//! 2. members of the class whose method encloses the position, then its
//!    supertypes
//! 3. global declarations across the project, all of them

use crate::index::IndexSnapshot;
use crate::stubs::{DeclKey, MemberOwner, ScopeId, ScopeKind};
use lty_common::limits::{MAX_RESOLUTION_CANDIDATES, MAX_SUPERTYPE_CHAIN_DEPTH};
use lty_common::{Atom, FileId};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::debug;

pub struct NameResolver<'a> {
    index: &'a IndexSnapshot,
}

impl<'a> NameResolver<'a> {
    pub fn new(index: &'a IndexSnapshot) -> Self {
        NameResolver { index }
    }

    /// Candidate declarations for `name` referenced at `pos` in `file`.
    pub fn resolve_name(&self, file: FileId, name: &str, pos: u32) -> Vec<DeclKey> {
        let Some(tree) = self.index.stubs(file) else {
            return Vec::new();
        };
        debug!("[RESOLVE] looking up '{}' at {}:{}", name, file, pos);

        let scope = tree.scope_at(pos);
        if let Some(id) = tree.lookup_local(name, pos, scope) {
            debug!("[RESOLVE] '{}': lexical binding {}", name, id.0);
            return vec![DeclKey::new(file, id)];
        }

        'members: {
            let Some(owner) = self.enclosing_method_owner(file, scope) else {
                break 'members;
            };
            let found = self.resolve_member(file, &owner, name);
            if !found.is_empty() {
                debug!("[RESOLVE] '{}': {} member candidate(s) of {:?}", name, found.len(), owner);
                return found;
            }
        }

        let mut globals = self.index.global_decls(name).to_vec();
        globals.truncate(MAX_RESOLUTION_CANDIDATES);
        debug!("[RESOLVE] '{}': {} global candidate(s)", name, globals.len());
        globals
    }

    /// Member declarations named `member` on `owner`. For classes the
    /// supertype chain is searched breadth-first and the nearest class that
    /// declares the member wins.
    pub fn resolve_member(&self, file: FileId, owner: &MemberOwner, member: &str) -> Vec<DeclKey> {
        match owner {
            MemberOwner::Class(class) => self.resolve_class_member(class, member),
            _ => self.named(self.index.owner_members(file, owner), member),
        }
    }

    pub fn resolve_class_member(&self, class: &Atom, member: &str) -> Vec<DeclKey> {
        for current in self.class_chain(class) {
            let found = self.named(self.index.class_members(&current), member);
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// `class` followed by its supertypes, breadth-first, each once.
    pub fn class_chain(&self, class: &Atom) -> Vec<Atom> {
        let mut chain: Vec<Atom> = Vec::new();
        let mut visited: FxHashSet<Atom> = FxHashSet::default();
        let mut pending: VecDeque<Atom> = VecDeque::from([class.clone()]);
        while let Some(current) = pending.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if chain.len() as u32 >= MAX_SUPERTYPE_CHAIN_DEPTH {
                debug!("[RESOLVE] supertype chain of '{}' too deep", class);
                break;
            }
            pending.extend(self.index.supertypes(&current));
            chain.push(current);
        }
        chain
    }

    fn named(&self, candidates: Vec<DeclKey>, member: &str) -> Vec<DeclKey> {
        let mut found: Vec<DeclKey> = candidates
            .into_iter()
            .filter(|&key| self.index.entry(key).is_some_and(|entry| entry.name == member))
            .collect();
        found.truncate(MAX_RESOLUTION_CANDIDATES);
        found
    }

    /// Owner of `self` for the innermost enclosing method, if any.
    fn enclosing_method_owner(&self, file: FileId, scope: ScopeId) -> Option<MemberOwner> {
        let tree = self.index.stubs(file)?;
        let mut current = scope;
        while let Some(s) = tree.scope(current) {
            if s.kind == ScopeKind::Function
                && let Some(owner) = tree.function(s.function).and_then(|f| f.method_of.clone())
            {
                return Some(owner);
            }
            current = s.parent;
        }
        None
    }
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod tests;
