//! Member access, class construction and reference resolution.

use crate::context::GuardKey;
use crate::infer::{Inferrer, union_all};
use indexmap::IndexMap;
use lty_binder::{DeclKey, DeclKind, MemberOwner, NameResolver};
use lty_common::limits::MAX_SUPERTYPE_CHAIN_DEPTH;
use lty_common::{Atom, FileId};
use lty_solver::{ClassType, DeclSite, MemberInfo, RecursionResult, Ty};
use lty_syntax::{IndexKey, NodeData, NodeIndex};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::VecDeque;
use tracing::{debug, trace};

impl<'a> Inferrer<'a> {
    pub(crate) fn infer_index(&mut self, file: FileId, base: NodeIndex, key: &IndexKey) -> Ty {
        let base_ty = self.infer_value(file, base);
        match key {
            IndexKey::Named(name) => self.member_type(&base_ty, name),
            IndexKey::Expr(key) => {
                let key_ty = self.infer_value(file, *key);
                self.indexed_type(&base_ty, &key_ty)
            }
        }
    }

    /// Type of `base.member`. On a union, the union over the alternatives
    /// that have the member.
    pub fn member_type(&mut self, base: &Ty, member: &Atom) -> Ty {
        match base {
            Ty::Class(class) => match class.members.get(member) {
                Some(info) => info.ty.clone(),
                None if !class.anonymous => self.class_member_type(&class.name, member),
                None => Ty::Unknown,
            },
            Ty::Union(union) => {
                let types = union
                    .alternatives()
                    .iter()
                    .map(|alt| self.member_type(alt, member))
                    .collect();
                union_all(types)
            }
            _ => Ty::Unknown,
        }
    }

    /// `base[key]`.
    fn indexed_type(&mut self, base: &Ty, key: &Ty) -> Ty {
        match (base, key) {
            (Ty::Array(element), key) if key.is_number_like() || key.is_unknown() => (**element).clone(),
            (Ty::Tuple(elements), Ty::Number) => union_all(elements.to_vec()),
            (Ty::Class(_) | Ty::Union(_), Ty::StringLiteral(name)) => self.member_type(base, name),
            (Ty::Union(union), key) => {
                let types = union
                    .alternatives()
                    .iter()
                    .map(|alt| self.indexed_type(alt, key))
                    .collect();
                union_all(types)
            }
            _ => Ty::Unknown,
        }
    }

    /// Member of a named class, searching its supertypes breadth-first.
    /// Among the declarations of the nearest class that has the member,
    /// only the highest-worth ones are unioned.
    pub fn class_member_type(&mut self, class: &Atom, member: &str) -> Ty {
        let index = self.index;
        let chain = NameResolver::new(index).class_chain(class);
        for current in &chain {
            self.record_name(current);
            let keys: Vec<DeclKey> = index
                .class_members(current)
                .into_iter()
                .filter(|&key| index.entry(key).is_some_and(|entry| entry.name == member))
                .collect();
            if !keys.is_empty() {
                trace!(class = %class, member, found_on = %current, "class member");
                return self.best_member_type(&keys);
            }
        }
        Ty::Unknown
    }

    fn best_member_type(&mut self, keys: &[DeclKey]) -> Ty {
        let index = self.index;
        let best = keys
            .iter()
            .filter_map(|&key| index.entry(key))
            .map(|entry| entry.worth)
            .max()
            .unwrap_or(0);
        let types = keys
            .iter()
            .filter(|&&key| index.entry(key).is_some_and(|entry| entry.worth == best))
            .map(|&key| self.infer_decl(key))
            .collect();
        union_all(types)
    }

    /// Member table built from member declarations: grouped by name in
    /// declaration order, highest worth wins, equal-worth types are unioned.
    pub(crate) fn member_infos(&mut self, keys: &[DeclKey]) -> IndexMap<Atom, MemberInfo> {
        let index = self.index;
        let mut grouped: IndexMap<Atom, (u32, Vec<DeclKey>)> = IndexMap::new();
        for &key in keys {
            let Some(entry) = index.entry(key) else {
                continue;
            };
            let slot = grouped
                .entry(entry.name.clone())
                .or_insert_with(|| (entry.worth, Vec::new()));
            if entry.worth > slot.0 {
                slot.0 = entry.worth;
                slot.1.clear();
            }
            if entry.worth == slot.0 {
                slot.1.push(key);
            }
        }

        let mut members = IndexMap::with_capacity(grouped.len());
        for (name, (_, keys)) in grouped {
            let Some(first) = keys.first().and_then(|&key| index.entry(key).map(|e| (key, e))) else {
                continue;
            };
            let types = keys.iter().map(|&key| self.infer_decl(key)).collect();
            let deprecated = keys
                .iter()
                .any(|&key| index.entry(key).is_some_and(|entry| entry.deprecated));
            let (key, entry) = first;
            members.insert(
                name,
                MemberInfo {
                    ty: union_all(types),
                    visibility: entry.visibility,
                    deprecated,
                    site: Some(DeclSite {
                        file: key.file,
                        span: entry.span,
                    }),
                },
            );
        }
        members
    }

    /// Full value of a named class: its own members and direct supertypes.
    ///
    /// Re-entering a class under construction (a field typed as its own
    /// class) yields the shallow value; classes compare by name, so the
    /// field's type is still the class.
    pub fn class_value(&mut self, name: &Atom) -> Ty {
        self.record_name(name);
        if let Some(ty) = self.class_memo.get(name) {
            return ty.clone();
        }
        let supers = self.acyclic_supertypes(name);
        let shallow = || {
            let mut class = ClassType::named(name.clone());
            class.supers = supers.clone();
            Ty::class(class)
        };

        let guard_key = GuardKey::Class(name.clone());
        match self.ctx.guard.enter(guard_key.clone()) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                trace!(class = %name, "class under construction, using shallow value");
                return shallow();
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => return shallow(),
        }
        let index = self.index;
        let keys = index.class_members(name);
        let mut class = ClassType::named(name.clone());
        class.supers = supers.clone();
        class.members = self.member_infos(&keys);
        let provisional = self.ctx.guard.leave(&guard_key);

        let ty = Ty::class(class);
        if !provisional && self.ctx.may_cache() {
            self.class_memo.insert(name.clone(), ty.clone());
        }
        ty
    }

    /// Direct supertypes of `class`, minus any whose chain leads back to it.
    fn acyclic_supertypes(&self, class: &Atom) -> SmallVec<[Atom; 2]> {
        let index = self.index;
        let mut supers = index.supertypes(class);
        supers.retain(|candidate| {
            let mut visited: FxHashSet<Atom> = FxHashSet::default();
            let mut pending: VecDeque<Atom> = VecDeque::from([candidate.clone()]);
            let mut steps = 0u32;
            while let Some(current) = pending.pop_front() {
                if current == *class {
                    debug!(class = %class, via = %candidate, "supertype cycle dropped");
                    return false;
                }
                steps += 1;
                if steps > MAX_SUPERTYPE_CHAIN_DEPTH {
                    break;
                }
                if visited.insert(current.clone()) {
                    pending.extend(index.supertypes(&current));
                }
            }
            true
        });
        supers
    }

    /// Declarations `node` refers to: a name's candidates, or the member
    /// declarations behind `a.b` and `a:b()`.
    pub fn resolve_reference(&mut self, file: FileId, node: NodeIndex) -> Vec<DeclKey> {
        let index = self.index;
        let (Some(arena), Some(tree)) = (index.arena(file), index.stubs(file)) else {
            return Vec::new();
        };
        if let Some(decl) = tree.decl_for_node(node) {
            return vec![DeclKey::new(file, decl)];
        }
        match arena.data(node) {
            Some(NodeData::Name(name)) => {
                NameResolver::new(index).resolve_name(file, name, arena.span(node).start)
            }
            Some(NodeData::Index {
                base,
                key: IndexKey::Named(member),
            }) => self.member_references(file, *base, member),
            Some(NodeData::Call {
                callee,
                method: Some(method),
                ..
            }) => self.member_references(file, *callee, method),
            _ => Vec::new(),
        }
    }

    fn member_references(&mut self, file: FileId, base: NodeIndex, member: &Atom) -> Vec<DeclKey> {
        let index = self.index;
        let resolver = NameResolver::new(index);
        let base_ty = self.infer_value(file, base);
        let base_ty = self.resolve_type(&base_ty);

        let mut found: Vec<DeclKey> = Vec::new();
        for alt in base_ty.alternatives() {
            if let Ty::Class(class) = alt
                && !class.anonymous
            {
                found.extend(resolver.resolve_class_member(&class.name, member));
            }
        }

        // Plain tables: follow the base name to the variable that owns them.
        if found.is_empty()
            && let Some(NodeData::Name(name)) = index.arena(file).and_then(|a| a.data(base))
        {
            let pos = index.arena(file).map_or(0, |a| a.span(base).start);
            for key in resolver.resolve_name(file, name, pos) {
                let Some(entry) = index.entry(key) else {
                    continue;
                };
                let owner = match entry.kind {
                    DeclKind::Local => MemberOwner::Table(key.decl),
                    DeclKind::Global => MemberOwner::Global(entry.name.clone()),
                    DeclKind::Parameter => match &entry.owner {
                        Some(owner) => owner.clone(),
                        None => continue,
                    },
                    _ => continue,
                };
                found.extend(resolver.resolve_member(key.file, &owner, member));
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }
}

#[cfg(test)]
#[path = "../tests/member_tests.rs"]
mod tests;
