//! `TypeResolver` over the stub index, for subtype checks and unions that
//! need transitive supertypes and inherited members.

use crate::infer::Inferrer;
use lty_common::Atom;
use lty_solver::{ClassType, SubtypeChecker, Ty, TypeResolver, union_with};
use std::cell::RefCell;
use std::sync::Arc;

pub struct InferenceEnvironment<'r, 'a> {
    inferrer: RefCell<&'r mut Inferrer<'a>>,
}

impl<'r, 'a> InferenceEnvironment<'r, 'a> {
    pub fn new(inferrer: &'r mut Inferrer<'a>) -> Self {
        InferenceEnvironment {
            inferrer: RefCell::new(inferrer),
        }
    }
}

impl TypeResolver for InferenceEnvironment<'_, '_> {
    fn supertypes(&self, class: &Atom) -> Vec<Atom> {
        self.inferrer.borrow().index.supertypes(class).into_vec()
    }

    fn lookup_member(&self, class: &Atom, member: &Atom) -> Option<Ty> {
        // Re-entrant lookups (none today) see no member rather than panic.
        let mut inferrer = self.inferrer.try_borrow_mut().ok()?;
        let ty = inferrer.class_member_type(class, member);
        ty.is_known().then_some(ty)
    }

    fn class_type(&self, class: &Atom) -> Option<Arc<ClassType>> {
        let mut inferrer = self.inferrer.try_borrow_mut().ok()?;
        if !inferrer.index.is_class(class) {
            return None;
        }
        inferrer.class_value(class).as_class().cloned()
    }
}

impl<'a> Inferrer<'a> {
    /// `a <: b` after resolving aliases, with the configured nil leniency.
    pub fn is_subtype(&mut self, a: &Ty, b: &Ty) -> bool {
        let a = self.resolve_type(a);
        let b = self.resolve_type(b);
        let nil_strict = self.options.nil_strict;
        let environment = InferenceEnvironment::new(self);
        SubtypeChecker::new(&environment)
            .with_nil_strict(nil_strict)
            .is_subtype(&a, &b)
    }

    /// Union that collapses across the project's class hierarchy
    /// (`Dog | Animal` is `Animal`).
    pub fn union_in_project(&mut self, types: Vec<Ty>) -> Ty {
        if types.is_empty() {
            return Ty::Unknown;
        }
        let environment = InferenceEnvironment::new(self);
        union_with(types, &environment)
    }
}

#[cfg(test)]
#[path = "../tests/environment_tests.rs"]
mod tests;
