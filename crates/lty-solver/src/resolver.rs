//! Lookups the solver needs from the declaration index.
//!
//! Class values carry their own members and direct supertypes. Anything
//! beyond that (inherited members, the transitive supertype chain, class
//! definitions by name) comes from a `TypeResolver`, which the checker
//! implements over the project-wide stub index.

use crate::types::{ClassType, Ty};
use lty_common::Atom;
use std::sync::Arc;

pub trait TypeResolver {
    /// Direct supertypes of the named class, in declaration order.
    fn supertypes(&self, _class: &Atom) -> Vec<Atom> {
        Vec::new()
    }

    /// Type of `member` on the named class, searching its supertypes.
    fn lookup_member(&self, _class: &Atom, _member: &Atom) -> Option<Ty> {
        None
    }

    /// Full class value for a class name.
    fn class_type(&self, _class: &Atom) -> Option<Arc<ClassType>> {
        None
    }
}

/// Resolver with no external knowledge.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopResolver;

impl TypeResolver for NoopResolver {}
