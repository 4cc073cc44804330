//! Type inference for lty.
//!
//! An [`Inferrer`] answers one query against an [`IndexSnapshot`]:
//! - `infer`: entry points and declaration inference with the shared cache
//! - `expr`: literals, names, operators, tables and function literals
//! - `call`: calls, generic binding at call sites, iterators, contextual
//!   parameter types
//! - `member`: member access, class values, reference resolution
//! - `substitute`: alias resolution
//! - `environment`: `TypeResolver` over the index for subtyping
//!
//! [`IndexSnapshot`]: lty_binder::IndexSnapshot

pub mod options;
pub use options::InferenceOptions;

pub mod cache;
pub use cache::{CacheKey, CacheStats, InferenceCache};

pub mod context;
pub use context::{GuardKey, InferenceContext};

pub mod infer;
pub use infer::Inferrer;

mod call;
mod expr;
mod member;
mod substitute;

pub mod environment;
pub use environment::InferenceEnvironment;
