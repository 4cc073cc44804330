//! Declaration indexing for lty.
//!
//! - `lower`: annotation types to type values
//! - `stubs`: per-file declaration entries, scopes and lookup tables
//! - `builder`: the linear walk that produces a `StubTree`
//! - `index`: the concurrent project index and its immutable snapshots
//! - `resolver`: bare-name resolution through scopes, class members and globals

pub mod lower;
pub use lower::{lower_doc_ty, lower_returns};

pub mod stubs;
pub use stubs::{
    DeclId, DeclKey, DeclKind, FunctionStub, InitShape, Initializer, MemberOwner, Scope, ScopeId,
    ScopeKind, StubEntry, StubTree, worth,
};

pub mod builder;
pub use builder::{StubBuilder, build_stubs};

pub mod index;
pub use index::{FileStubs, IndexSnapshot, StubIndex};

pub mod resolver;
pub use resolver::NameResolver;
