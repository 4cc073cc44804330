//! lty: type inference and symbol resolution for annotated Lua.
//!
//! The work is split across the `crates/` members; this crate ties them
//! into a [`Workspace`] and re-exports what callers need:
//!
//! ```no_run
//! use lty::{FileId, TreeBuilder, Workspace};
//!
//! let mut b = TreeBuilder::new();
//! let five = b.number(5.0);
//! let x = b.local("x", five);
//! let x_ref = b.name("x");
//! let stat = b.expr_stat(x_ref);
//!
//! let workspace = Workspace::default();
//! workspace.set_file(FileId(1), b.finish(vec![x, stat]));
//! assert_eq!(workspace.hover(FileId(1), x_ref), "number");
//! ```

pub mod config;
pub use config::{LtyConfig, load_options, parse_config};

pub mod tracing_config;
pub use tracing_config::init_tracing;

pub mod workspace;
pub use workspace::Workspace;

pub use lty_binder::{DeclKey, DeclKind, IndexSnapshot, StubEntry, StubIndex};
pub use lty_checker::{CacheStats, InferenceOptions, Inferrer};
pub use lty_common::{Atom, CancellationToken, FileId, Span};
pub use lty_solver::{Ty, TypeFormatter, union};
pub use lty_syntax::{BinaryOp, DocTag, DocTy, NodeArena, NodeIndex, TreeBuilder, UnaryOp};
