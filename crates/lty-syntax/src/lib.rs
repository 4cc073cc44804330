//! Syntax tree interface consumed by the lty inference engine.
//!
//! The lexer and parser live outside this workspace. This crate pins down the
//! shape they produce:
//! - `node`: closed statement/expression enumeration (`NodeData`) and `NodeIndex`
//! - `arena`: `NodeArena`, the per-file node store with parent links and
//!   attached documentation
//! - `doc`: already-parsed documentation annotations (`DocComment`, `DocTag`, `DocTy`)
//! - `builder`: `TreeBuilder`, which assigns ordered spans while assembling a tree

pub mod node;
pub use node::{
    BinaryOp, FieldKey, IfArm, IndexKey, Node, NodeData, NodeIndex, UnaryOp,
};

pub mod arena;
pub use arena::NodeArena;

pub mod doc;
pub use doc::{DocComment, DocTag, DocTy, GenericParam};

pub mod builder;
pub use builder::TreeBuilder;
