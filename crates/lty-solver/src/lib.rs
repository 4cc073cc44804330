//! Type value model for the lty inference engine.
//!
//! This crate is pure: it knows nothing about syntax trees or declarations.
//! It provides:
//!
//! - **`Ty`**: immutable, shareable type values
//! - **Union algebra**: flattening, deduplication and subtype collapsing
//! - **Subtyping**: `SubtypeChecker` with coinductive handling of recursive shapes
//! - **Generics**: substitution (`instantiate_type`) and call-site unification
//! - **Rendering**: `TypeFormatter` / `Display`
//!
//! Knowledge that lives in the declaration index (inherited members,
//! transitive supertypes) is reached through the [`TypeResolver`] trait.

pub mod format;
pub mod instantiate;
pub mod recursion;
pub mod resolver;
pub mod subtype;
pub mod types;
pub mod unify;
mod union;

pub use format::TypeFormatter;
pub use instantiate::{TypeSubstitution, erase_generics, instantiate_type, map_type};
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
pub use resolver::{NoopResolver, TypeResolver};
pub use subtype::{SubtypeChecker, is_subtype_of};
pub use types::{
    AliasRef, ClassType, DeclSite, FunctionType, MemberInfo, TABLE_CLASS_NAME, Ty, UnionType,
};
pub use unify::{GenericUnifier, infer_generic_bindings};
pub use union::{union, union_of, union_with};

#[cfg(test)]
#[path = "../tests/type_algebra_tests.rs"]
mod type_algebra_tests;
