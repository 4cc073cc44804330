//! Subtype relation.
//!
//! `a <: b` holds when every value described by `a` is acceptable where `b`
//! is expected:
//! - `Unknown` is the top type and a subtype only of itself
//! - a union on the left needs every alternative, on the right any one
//! - named classes follow their supertype chain, anonymous targets are
//!   matched member by member
//! - functions are contravariant in parameters and covariant in the return
//!
//! Recursive shapes are compared coinductively: a pair already under
//! comparison is assumed to hold.

use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::resolver::{NoopResolver, TypeResolver};
use crate::types::{ClassType, FunctionType, Ty};
use lty_common::Atom;
use lty_common::limits::MAX_SUPERTYPE_CHAIN_DEPTH;
use rustc_hash::{FxHashSet, FxHasher};
use std::hash::{Hash, Hasher};
use tracing::trace;

/// `is_subtype_of(a, b)` with strict nil and no external resolver.
pub fn is_subtype_of(a: &Ty, b: &Ty) -> bool {
    SubtypeChecker::new(&NoopResolver).is_subtype(a, b)
}

pub struct SubtypeChecker<'a> {
    resolver: &'a dyn TypeResolver,
    /// When `false`, `nil` is accepted wherever any type is expected.
    nil_strict: bool,
    guard: RecursionGuard<(u64, u64)>,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(resolver: &'a dyn TypeResolver) -> Self {
        SubtypeChecker {
            resolver,
            nil_strict: true,
            guard: RecursionGuard::with_profile(RecursionProfile::SubtypeCheck),
        }
    }

    pub fn with_nil_strict(mut self, nil_strict: bool) -> Self {
        self.nil_strict = nil_strict;
        self
    }

    pub fn is_subtype(&mut self, a: &Ty, b: &Ty) -> bool {
        if a == b {
            return true;
        }
        match (a, b) {
            (_, Ty::Unknown) => return true,
            (Ty::Unknown, _) => return false,
            (Ty::Union(union), _) => {
                return union.alternatives().iter().all(|alt| self.is_subtype(alt, b));
            }
            (Ty::Nil, _) if !self.nil_strict => return true,
            (_, Ty::Union(union)) => {
                return union.alternatives().iter().any(|alt| self.is_subtype(a, alt));
            }
            _ => {}
        }

        let key = (fingerprint(a), fingerprint(b));
        match self.guard.enter(key) {
            RecursionResult::Entered => {
                let result = self.check_structural(a, b);
                self.guard.leave(&key);
                result
            }
            RecursionResult::Cycle => {
                trace!(%a, %b, "assuming subtype on cycle");
                true
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => false,
        }
    }

    fn check_structural(&mut self, a: &Ty, b: &Ty) -> bool {
        match (a, b) {
            (Ty::StringLiteral(_), Ty::String) => true,
            (Ty::Class(ca), Ty::Class(cb)) => self.check_class(ca, cb),
            (Ty::Array(_) | Ty::Tuple(_), Ty::Class(cb)) => cb.is_table(),
            (Ty::Array(ea), Ty::Array(eb)) => self.is_subtype(ea, eb),
            (Ty::Tuple(items), Ty::Array(eb)) => items.iter().all(|item| self.is_subtype(item, eb)),
            (Ty::Tuple(xs), Ty::Tuple(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| self.is_subtype(x, y))
            }
            (Ty::Function(fa), Ty::Function(fb)) => self.check_function(fa, fb),
            _ => false,
        }
    }

    fn check_class(&mut self, a: &ClassType, b: &ClassType) -> bool {
        if b.is_table() {
            return true;
        }
        if b.anonymous {
            return b.members.iter().all(|(name, expected)| {
                match self.member_of(a, name) {
                    Some(actual) => self.is_subtype(&actual, &expected.ty),
                    None => false,
                }
            });
        }
        if a.anonymous {
            return false;
        }
        if a.name == b.name {
            return true;
        }
        self.inherits_from(a, &b.name)
    }

    /// Walk the transitive supertype chain of `class` looking for `target`.
    fn inherits_from(&self, class: &ClassType, target: &Atom) -> bool {
        let mut visited: FxHashSet<Atom> = FxHashSet::default();
        visited.insert(class.name.clone());
        let mut pending: Vec<Atom> = class.supers.iter().cloned().collect();
        pending.extend(self.resolver.supertypes(&class.name));
        let mut steps = 0u32;

        while let Some(name) = pending.pop() {
            if &name == target {
                return true;
            }
            steps += 1;
            if steps > MAX_SUPERTYPE_CHAIN_DEPTH {
                break;
            }
            // A class that reaches itself again is a cycle; skip the repeat.
            if !visited.insert(name.clone()) {
                continue;
            }
            pending.extend(self.resolver.supertypes(&name));
        }
        false
    }

    fn member_of(&self, class: &ClassType, name: &Atom) -> Option<Ty> {
        if let Some(info) = class.members.get(name) {
            return Some(info.ty.clone());
        }
        if class.anonymous {
            return None;
        }
        self.resolver.lookup_member(&class.name, name)
    }

    fn check_function(&mut self, a: &FunctionType, b: &FunctionType) -> bool {
        // Surplus arguments from `b`'s callers are dropped, so only the
        // overlapping prefix is compared.
        for (expected, actual) in b.params.iter().zip(a.params.iter()) {
            if !self.is_subtype(expected, actual) {
                return false;
            }
        }
        if !b.variadic {
            // Parameters `b`'s callers never pass arrive as nil.
            for actual in a.params.iter().skip(b.params.len()) {
                if !self.is_subtype(&Ty::Nil, actual) {
                    return false;
                }
            }
        }
        self.is_subtype(&a.ret, &b.ret)
    }
}

fn fingerprint(ty: &Ty) -> u64 {
    let mut hasher = FxHasher::default();
    ty.hash(&mut hasher);
    hasher.finish()
}
