//! Call-site generic inference.
//!
//! Walks a parameter type and an argument type side by side and records what
//! each generic placeholder must be. Repeated bindings for the same name are
//! unioned, so `id(1)` binds `T = number` and `pick(1, "a")` with two `T`
//! parameters binds `T = number|"a"`.

use crate::instantiate::TypeSubstitution;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{FunctionType, Ty};
use crate::union::union;
use lty_common::Atom;

pub struct GenericUnifier<'a> {
    generics: &'a [Atom],
    bindings: TypeSubstitution,
    depth: DepthCounter,
}

impl<'a> GenericUnifier<'a> {
    /// `generics` are the placeholder names that may be bound.
    pub fn new(generics: &'a [Atom]) -> Self {
        GenericUnifier {
            generics,
            bindings: TypeSubstitution::new(),
            depth: DepthCounter::with_profile(RecursionProfile::Unification),
        }
    }

    pub fn unify(&mut self, param: &Ty, arg: &Ty) {
        if arg.is_unknown() || !self.depth.enter() {
            return;
        }
        self.unify_inner(param, arg);
        self.depth.leave();
    }

    fn unify_inner(&mut self, param: &Ty, arg: &Ty) {
        match (param, arg) {
            (Ty::Generic(name), _) if self.generics.contains(name) => self.bind(name, arg),
            (Ty::Array(p), Ty::Array(a)) => self.unify(p, a),
            (Ty::Array(p), Ty::Tuple(items)) => {
                for item in items.iter() {
                    self.unify(p, item);
                }
            }
            (Ty::Tuple(ps), Ty::Tuple(items)) => {
                for (p, a) in ps.iter().zip(items.iter()) {
                    self.unify(p, a);
                }
            }
            (Ty::Function(p), Ty::Function(a)) => self.unify_function(p, a),
            (Ty::Class(p), Ty::Class(a)) if p.anonymous => {
                for (name, expected) in &p.members {
                    if let Some(actual) = a.members.get(name) {
                        self.unify(&expected.ty, &actual.ty);
                    }
                }
            }
            (Ty::AliasRef(p), Ty::AliasRef(a)) if p.name == a.name => {
                for (p, a) in p.args.iter().zip(a.args.iter()) {
                    self.unify(p, a);
                }
            }
            (Ty::Union(union), _) => self.unify_union(union.alternatives(), arg),
            _ => {}
        }
    }

    /// `T|nil` against `number|nil` binds `T = number`: argument alternatives
    /// already matched by a concrete parameter alternative are set aside.
    fn unify_union(&mut self, params: &[Ty], arg: &Ty) {
        let (generic, concrete): (Vec<&Ty>, Vec<&Ty>) =
            params.iter().partition(|p| p.contains_generic());
        if generic.is_empty() {
            return;
        }
        let rest: Vec<Ty> = arg
            .alternatives()
            .iter()
            .filter(|alt| !concrete.contains(alt))
            .cloned()
            .collect();
        if rest.is_empty() {
            return;
        }
        let remaining = crate::union::union_of(rest);
        for p in generic {
            self.unify(p, &remaining);
        }
    }

    fn unify_function(&mut self, p: &FunctionType, a: &FunctionType) {
        for (pp, ap) in p.params.iter().zip(a.params.iter()) {
            self.unify(pp, ap);
        }
        self.unify(&p.ret, &a.ret);
    }

    fn bind(&mut self, name: &Atom, ty: &Ty) {
        let merged = match self.bindings.get(name) {
            Some(existing) => union(existing, ty),
            None => ty.clone(),
        };
        self.bindings.insert(name.clone(), merged);
    }

    pub fn finish(self) -> TypeSubstitution {
        self.bindings
    }
}

/// Bindings for `generics` from unifying each parameter with its argument.
pub fn infer_generic_bindings(generics: &[Atom], params: &[Ty], args: &[Ty]) -> TypeSubstitution {
    let mut unifier = GenericUnifier::new(generics);
    for (param, arg) in params.iter().zip(args.iter()) {
        unifier.unify(param, arg);
    }
    unifier.finish()
}

#[cfg(test)]
#[path = "../tests/unify_tests.rs"]
mod tests;
