//! Declaration stubs.
//!
//! A [`StubTree`] is the per-file declaration index: one [`StubEntry`] per
//! named declaration, the lexical scope tree they live in, and lookup tables
//! by name, class, alias, member owner and declaring node. Entries refer to
//! the syntax tree only through `NodeIndex` values and spans, so a stub tree
//! stays meaningful for as long as the arena snapshot it was built from.

use lty_common::{Atom, FileId, Span, Visibility};
use lty_solver::Ty;
use lty_syntax::NodeIndex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;

/// Member priority. When a member is declared several ways, only the
/// candidates of the highest worth contribute to its type.
pub mod worth {
    /// `---@field`
    pub const DOC: u32 = 1000;
    /// `function Class:method()` / `function t.f()`
    pub const METHOD_DEF: u32 = 900;
    /// `{ name = value }` in the table bound to the owner
    pub const TABLE_FIELD: u32 = 800;
    /// `t.x = value` / `self.x = value`
    pub const ASSIGN: u32 = 0;
}

/// Index of an entry within its file's [`StubTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// Project-wide declaration identity: stable cache key and sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclKey {
    pub file: FileId,
    pub decl: DeclId,
}

impl DeclKey {
    pub fn new(file: FileId, decl: DeclId) -> Self {
        DeclKey { file, decl }
    }
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.decl.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// `---@class`
    Class,
    /// `---@alias`
    Alias,
    /// `---@field`, table constructor fields and field assignments.
    Field,
    /// `local function f`, and functions defined on a table or class.
    Function,
    /// `local x`, loop variables.
    Local,
    Parameter,
    /// Non-local assignments and `function name()` statements.
    Global,
}

impl DeclKind {
    /// Kinds bound through lexical scopes.
    pub fn is_lexical(self) -> bool {
        matches!(self, DeclKind::Local | DeclKind::Parameter | DeclKind::Function)
    }

    pub fn is_member(self) -> bool {
        matches!(self, DeclKind::Field | DeclKind::Function)
    }
}

/// Who a member declaration belongs to, decided syntactically.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberOwner {
    /// Attached to a variable declared with `---@class Name`.
    Class(Atom),
    /// Attached to a plain local table in the same file.
    Table(DeclId),
    /// Attached to a global table by name.
    Global(Atom),
}

/// Syntactic summary of an initializer, recorded without inference.
#[derive(Clone, Debug, PartialEq)]
pub enum InitShape {
    Function { params: usize, variadic: bool },
    Table,
    Literal,
    Call,
    Name(Atom),
    /// Numeric `for` control variable.
    NumericFor,
    /// Generic `for` variable; `expr` is the iterator expression.
    Iterator,
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Initializer {
    pub expr: NodeIndex,
    /// Which value of a multi-value expression this declaration receives.
    pub value_index: usize,
    pub shape: InitShape,
}

#[derive(Clone, Debug)]
pub struct StubEntry {
    pub id: DeclId,
    pub kind: DeclKind,
    pub name: Atom,
    /// Documented type, lowered but not yet alias-substituted.
    pub declared: Option<Ty>,
    /// `---@overload` signatures.
    pub overloads: Vec<Ty>,
    pub initializer: Option<Initializer>,
    pub visibility: Visibility,
    pub deprecated: bool,
    pub scope: ScopeId,
    pub owner: Option<MemberOwner>,
    /// Declaring node: the name, field, statement or closure.
    pub node: NodeIndex,
    pub span: Span,
    /// Offset from which lexical references see this entry.
    pub visible_from: u32,
    /// Visible throughout its scope regardless of position.
    pub hoisted: bool,
    pub worth: u32,
    /// Generic parameters in scope for `declared`.
    pub generics: Vec<Atom>,
    /// Direct supertypes, for `Class` entries.
    pub supers: SmallVec<[Atom; 2]>,
    /// Class name when this variable holds the table of a `---@class`.
    pub class: Option<Atom>,
}

impl StubEntry {
    pub fn new(id: DeclId, kind: DeclKind, name: Atom, scope: ScopeId, node: NodeIndex, span: Span) -> Self {
        StubEntry {
            id,
            kind,
            name,
            declared: None,
            overloads: Vec::new(),
            initializer: None,
            visibility: Visibility::Public,
            deprecated: false,
            scope,
            owner: None,
            node,
            span,
            visible_from: span.end,
            hoisted: false,
            worth: worth::ASSIGN,
            generics: Vec::new(),
            supers: SmallVec::new(),
            class: None,
        }
    }

    /// Fields and functions attached to a class or table.
    pub fn is_member(&self) -> bool {
        self.kind.is_member() && self.owner.is_some()
    }

    /// Whether a lexical reference at `pos` can see this entry.
    pub fn is_visible_at(&self, pos: u32) -> bool {
        self.hoisted || self.visible_from <= pos
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const NONE: ScopeId = ScopeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    File,
    Function,
    Block,
    Loop,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: ScopeId,
    pub span: Span,
    /// Declarations in textual order.
    pub decls: Vec<DeclId>,
    pub children: Vec<ScopeId>,
    /// The closure node for `Function` scopes.
    pub function: NodeIndex,
}

/// Per-closure facts the inferrer needs: documented returns, generic
/// parameters, and the reachable `return` statements.
#[derive(Clone, Debug, Default)]
pub struct FunctionStub {
    pub returns: Option<Ty>,
    pub generics: Vec<Atom>,
    /// Parameter declarations in order, including an implicit `self`.
    pub params: Vec<DeclId>,
    pub variadic: bool,
    /// Owner of `self` for `function Owner:method()`.
    pub method_of: Option<MemberOwner>,
    pub return_stmts: Vec<NodeIndex>,
    /// Control can reach the end of the body without a `return`.
    pub falls_through: bool,
}

#[derive(Debug, Default)]
pub struct StubTree {
    pub file: Option<FileId>,
    pub entries: Vec<StubEntry>,
    pub scopes: Vec<Scope>,
    pub functions: FxHashMap<NodeIndex, FunctionStub>,
    pub(crate) by_name: FxHashMap<Atom, Vec<DeclId>>,
    pub(crate) classes: FxHashMap<Atom, Vec<DeclId>>,
    pub(crate) aliases: FxHashMap<Atom, Vec<DeclId>>,
    pub(crate) globals: FxHashMap<Atom, Vec<DeclId>>,
    pub(crate) members: FxHashMap<MemberOwner, Vec<DeclId>>,
    pub(crate) node_decls: FxHashMap<NodeIndex, DeclId>,
}

impl StubTree {
    pub fn entry(&self, id: DeclId) -> Option<&StubEntry> {
        self.entries.get(id.0 as usize)
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        if id.is_none() {
            return None;
        }
        self.scopes.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries named `name`, optionally restricted to `kind`, in textual order.
    pub fn find_by_name(&self, name: &str, kind: Option<DeclKind>) -> Vec<&StubEntry> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|&id| self.entry(id))
            .filter(|entry| kind.is_none_or(|k| entry.kind == k))
            .collect()
    }

    pub fn class_decls(&self, name: &str) -> &[DeclId] {
        self.classes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn alias_decls(&self, name: &str) -> &[DeclId] {
        self.aliases.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn global_decls(&self, name: &str) -> &[DeclId] {
        self.globals.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn member_decls(&self, owner: &MemberOwner) -> &[DeclId] {
        self.members.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn members_map(&self) -> &FxHashMap<MemberOwner, Vec<DeclId>> {
        &self.members
    }

    pub(crate) fn classes_map(&self) -> &FxHashMap<Atom, Vec<DeclId>> {
        &self.classes
    }

    pub(crate) fn aliases_map(&self) -> &FxHashMap<Atom, Vec<DeclId>> {
        &self.aliases
    }

    pub(crate) fn globals_map(&self) -> &FxHashMap<Atom, Vec<DeclId>> {
        &self.globals
    }

    /// Class, alias and global names this file declares or attaches
    /// members to, sorted. Other files' lookups of these names depend on it.
    pub fn contributed_names(&self) -> Vec<Atom> {
        let mut names: Vec<Atom> = self
            .classes
            .keys()
            .chain(self.aliases.keys())
            .chain(self.globals.keys())
            .cloned()
            .collect();
        names.extend(self.members.keys().filter_map(|owner| match owner {
            MemberOwner::Class(name) | MemberOwner::Global(name) => Some(name.clone()),
            MemberOwner::Table(_) => None,
        }));
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Declaration introduced by `node` (a name, field, statement or closure).
    pub fn decl_for_node(&self, node: NodeIndex) -> Option<DeclId> {
        self.node_decls.get(&node).copied()
    }

    pub fn function(&self, closure: NodeIndex) -> Option<&FunctionStub> {
        self.functions.get(&closure)
    }

    /// Innermost scope containing `pos`.
    pub fn scope_at(&self, pos: u32) -> ScopeId {
        let Some(root) = self.scopes.first() else {
            return ScopeId::NONE;
        };
        if !root.span.contains(pos) {
            return ScopeId(0);
        }
        let mut current = ScopeId(0);
        loop {
            let Some(scope) = self.scope(current) else {
                return current;
            };
            let next = scope
                .children
                .iter()
                .copied()
                .find(|&child| self.scope(child).is_some_and(|s| s.span.contains(pos)));
            match next {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Lexical lookup from `scope` outward: the latest visible binding of
    /// `name` in the innermost scope that has one.
    pub fn lookup_local(&self, name: &str, pos: u32, scope: ScopeId) -> Option<DeclId> {
        let mut current = scope;
        let mut steps = 0usize;
        while let Some(s) = self.scope(current) {
            let found = s
                .decls
                .iter()
                .filter_map(|&id| self.entry(id))
                .filter(|entry| entry.kind.is_lexical() && !entry.is_member() && entry.name == name)
                .filter(|entry| entry.is_visible_at(pos))
                .max_by_key(|entry| (entry.visible_from, entry.id));
            if let Some(entry) = found {
                return Some(entry.id);
            }
            current = s.parent;
            steps += 1;
            if steps > lty_common::limits::MAX_TREE_WALK_ITERATIONS {
                break;
            }
        }
        None
    }

    /// Innermost function scope enclosing `scope`, with its closure node.
    pub fn enclosing_function(&self, scope: ScopeId) -> Option<NodeIndex> {
        let mut current = scope;
        while let Some(s) = self.scope(current) {
            if s.kind == ScopeKind::Function {
                return Some(s.function);
            }
            current = s.parent;
        }
        None
    }
}
