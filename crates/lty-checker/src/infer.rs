//! The inferrer: entry points and declaration inference.
//!
//! Expression, call, member and alias handling live in sibling modules as
//! further `impl Inferrer` blocks.

use crate::cache::{CacheKey, InferenceCache};
use crate::context::{GuardKey, InferenceContext};
use crate::options::InferenceOptions;
use lty_binder::{DeclKey, DeclKind, IndexSnapshot, InitShape, MemberOwner, StubEntry};
use lty_common::limits::{STACK_GROWTH_SIZE, STACK_RED_ZONE};
use lty_common::{Atom, CancellationToken, FileId};
use lty_solver::{ClassType, RecursionResult, Ty, TypeSubstitution, instantiate_type, map_type, union_of};
use lty_syntax::NodeIndex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Union of `types`, `Unknown` when there are none.
pub(crate) fn union_all(types: Vec<Ty>) -> Ty {
    if types.is_empty() {
        Ty::Unknown
    } else {
        union_of(types)
    }
}

/// One inference query over a fixed index snapshot.
///
/// Cheap to build; create one per request. Results of completed
/// declarations go to the shared [`InferenceCache`], everything else is
/// dropped with the inferrer.
pub struct Inferrer<'a> {
    pub(crate) index: &'a IndexSnapshot,
    pub(crate) cache: &'a InferenceCache,
    pub(crate) options: &'a InferenceOptions,
    pub ctx: InferenceContext,
    /// Class values built during this query.
    pub(crate) class_memo: FxHashMap<Atom, Ty>,
}

impl<'a> Inferrer<'a> {
    pub fn new(
        index: &'a IndexSnapshot,
        cache: &'a InferenceCache,
        options: &'a InferenceOptions,
        cancel: CancellationToken,
    ) -> Self {
        Inferrer {
            index,
            cache,
            options,
            ctx: InferenceContext::new(options, cancel),
            class_memo: FxHashMap::default(),
        }
    }

    /// Infer under explicit generic bindings.
    pub fn with_bindings(mut self, bindings: TypeSubstitution) -> Self {
        self.ctx.bindings = bindings;
        self
    }

    /// Type of `node` in `file`. Declaring nodes give the declaration's
    /// type, anything else is inferred as an expression. The result never
    /// contains an alias reference.
    pub fn infer_type(&mut self, file: FileId, node: NodeIndex) -> Ty {
        if self.ctx.is_cancelled() {
            return Ty::Unknown;
        }
        let decl = self
            .index
            .stubs(file)
            .and_then(|tree| tree.decl_for_node(node));
        let ty = match decl {
            Some(decl) => self.infer_decl(DeclKey::new(file, decl)),
            None => self.infer_expr(file, node),
        };
        let ty = self.resolve_type(&ty);
        if self.ctx.is_cancelled() {
            return Ty::Unknown;
        }
        strip_alias_refs(ty)
    }

    /// Type of a declaration, memoized in the shared cache.
    pub fn infer_decl(&mut self, key: DeclKey) -> Ty {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH_SIZE, || self.infer_decl_inner(key))
    }

    fn infer_decl_inner(&mut self, key: DeclKey) -> Ty {
        if self.ctx.is_cancelled() {
            return Ty::Unknown;
        }
        self.record_dependency(key.file);
        let cache_key = CacheKey {
            decl: key,
            generation: self.index.generation(key.file),
            fingerprint: self.ctx.bindings.fingerprint(),
        };
        if let Some(ty) = self.cache.get(&cache_key) {
            return ty;
        }

        let guard_key = GuardKey::Decl(key);
        match self.ctx.guard.enter(guard_key.clone()) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                debug!(decl = %key, "declaration cycle cut");
                return Ty::Unknown;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                debug!(decl = %key, depth = self.ctx.guard.depth(), "inference limit reached");
                return Ty::Unknown;
            }
        }
        self.ctx.decl_files.push(key.file);
        let computed = self.compute_decl(key);
        let ty = instantiate_type(&computed, &self.ctx.bindings);
        self.ctx.decl_files.pop();
        let provisional = self.ctx.guard.leave(&guard_key);

        if self.ctx.is_cancelled() {
            return Ty::Unknown;
        }
        if provisional || !self.ctx.may_cache() {
            trace!(decl = %key, provisional, "result not cached");
            return ty;
        }
        self.cache.insert(cache_key, ty)
    }

    #[tracing::instrument(level = "debug", skip(self), fields(decl = %key))]
    fn compute_decl(&mut self, key: DeclKey) -> Ty {
        let index = self.index;
        let Some(entry) = index.entry(key) else {
            return Ty::Unknown;
        };
        match entry.kind {
            DeclKind::Class => return self.class_value(&entry.name),
            DeclKind::Alias => {
                return match &entry.declared {
                    Some(ty) => self.resolve_type(ty),
                    None => Ty::Unknown,
                };
            }
            _ => {}
        }

        // A documented type is authoritative; the initializer is not looked at.
        if let Some(declared) = &entry.declared {
            let mut ty = self.resolve_type(declared);
            if entry.kind != DeclKind::Parameter
                && !entry.generics.is_empty()
                && let Ty::Function(function) = &ty
                && function.generics.is_empty()
            {
                ty = Ty::generic_function(
                    function.params.clone(),
                    function.ret.clone(),
                    function.variadic,
                    entry.generics.clone(),
                );
            }
            return self.with_overloads(entry, ty);
        }

        let ty = match entry.kind {
            DeclKind::Parameter => self.parameter_type(key, entry),
            _ => self.initializer_type(key, entry),
        };
        self.with_overloads(entry, ty)
    }

    fn with_overloads(&mut self, entry: &StubEntry, ty: Ty) -> Ty {
        if entry.overloads.is_empty() {
            return ty;
        }
        let mut all = Vec::with_capacity(entry.overloads.len() + 1);
        all.push(ty);
        for overload in &entry.overloads {
            all.push(self.resolve_type(overload));
        }
        union_all(all)
    }

    fn parameter_type(&mut self, key: DeclKey, entry: &StubEntry) -> Ty {
        // Implicit `self` of a method on a plain table or global.
        if entry.node.is_none() {
            match &entry.owner {
                Some(MemberOwner::Table(table)) => {
                    return self.infer_decl(DeclKey::new(key.file, *table));
                }
                Some(MemberOwner::Global(name)) => return self.global_type(name),
                Some(MemberOwner::Class(class)) => return self.class_value(class),
                None => {}
            }
        }
        self.contextual_param_type(key.file, entry.node)
            .unwrap_or(Ty::Unknown)
    }

    fn initializer_type(&mut self, key: DeclKey, entry: &StubEntry) -> Ty {
        let Some(init) = &entry.initializer else {
            return Ty::Unknown;
        };
        match &init.shape {
            InitShape::NumericFor => Ty::Number,
            InitShape::Iterator => self.iterator_value_type(key.file, init.expr, init.value_index),
            InitShape::Function { .. } if init.value_index == 0 => {
                self.infer_closure(key.file, init.expr, None)
            }
            InitShape::Table
                if init.value_index == 0
                    && matches!(entry.kind, DeclKind::Local | DeclKind::Global) =>
            {
                self.table_decl_type(key, entry, init.expr)
            }
            _ => self
                .infer_expr(key.file, init.expr)
                .nth_value(init.value_index),
        }
    }

    /// A table-initialized variable: the literal plus every member attached
    /// to the variable afterwards.
    fn table_decl_type(&mut self, key: DeclKey, entry: &StubEntry, table: NodeIndex) -> Ty {
        let literal = self.infer_table(key.file, table);
        let members = match entry.kind {
            DeclKind::Local => self.index.table_members(key),
            DeclKind::Global => {
                self.record_name(&entry.name);
                self.index.global_members(&entry.name).to_vec()
            }
            _ => Vec::new(),
        };
        if members.is_empty() {
            return literal;
        }
        let mut class = match &literal {
            Ty::Class(class) if class.anonymous => (**class).clone(),
            _ => ClassType::anonymous(),
        };
        for (name, info) in self.member_infos(&members) {
            class.members.insert(name, info);
        }
        Ty::class(class)
    }

    /// Union of every global declaration named `name`.
    pub(crate) fn global_type(&mut self, name: &Atom) -> Ty {
        self.record_name(name);
        let keys = self.index.global_decls(name).to_vec();
        let types = keys.into_iter().map(|key| self.infer_decl(key)).collect();
        union_all(types)
    }

    pub(crate) fn record_dependency(&self, file: FileId) {
        if let Some(current) = self.ctx.current_file() {
            self.cache.record_file_dependency(current, file);
        }
    }

    pub(crate) fn record_name(&self, name: &Atom) {
        if let Some(current) = self.ctx.current_file() {
            self.cache.record_name_dependency(current, name);
        }
    }
}

/// Last line of defence for the public entry point: an alias that survived
/// substitution degrades to `Unknown`.
fn strip_alias_refs(ty: Ty) -> Ty {
    if !ty.contains_alias_ref() {
        return ty;
    }
    debug!(ty = %ty, "unresolved alias reference in result");
    map_type(&ty, &mut |inner| match inner {
        Ty::AliasRef(_) => Some(Ty::Unknown),
        _ => None,
    })
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
