//! Stub construction: one linear walk over a file's tree.
//!
//! The walk records declarations, scopes and member ownership. It never
//! infers a type: documented types are lowered, initializers are recorded
//! by node and shape, and member owners are decided from the syntax of the
//! assignment target alone.

use crate::lower::{lower_doc_ty, lower_returns};
use crate::stubs::{
    DeclId, DeclKind, FunctionStub, InitShape, Initializer, MemberOwner, Scope, ScopeId,
    ScopeKind, StubEntry, StubTree, worth,
};
use lty_common::limits::{STACK_GROWTH_SIZE, STACK_RED_ZONE};
use lty_common::{Atom, FileId};
use lty_solver::Ty;
use lty_syntax::{DocComment, DocTag, FieldKey, IndexKey, NodeArena, NodeData, NodeIndex};
use tracing::{debug, trace, warn};

/// Build the stub tree for `arena`.
#[tracing::instrument(level = "debug", skip(arena), fields(nodes = arena.len()))]
pub fn build_stubs(file: FileId, arena: &NodeArena) -> StubTree {
    StubBuilder::new(file, arena).build()
}

pub struct StubBuilder<'a> {
    file: FileId,
    arena: &'a NodeArena,
    tree: StubTree,
    scope: ScopeId,
    /// Closures being walked, innermost last.
    functions: Vec<NodeIndex>,
}

impl<'a> StubBuilder<'a> {
    pub fn new(file: FileId, arena: &'a NodeArena) -> Self {
        StubBuilder {
            file,
            arena,
            tree: StubTree {
                file: Some(file),
                ..StubTree::default()
            },
            scope: ScopeId::NONE,
            functions: Vec::new(),
        }
    }

    pub fn build(mut self) -> StubTree {
        let arena = self.arena;
        let root = arena.root();
        let Some(NodeData::Chunk { block }) = arena.data(root) else {
            warn!(file = %self.file, "tree has no chunk root, no stubs built");
            return self.tree;
        };
        self.push_scope(ScopeKind::File, root, NodeIndex::NONE);
        self.bind_stmts(*block);
        self.pop_scope();
        debug!(
            file = %self.file,
            decls = self.tree.entries.len(),
            scopes = self.tree.scopes.len(),
            "stubs built"
        );
        self.tree
    }

    // Scopes

    fn push_scope(&mut self, kind: ScopeKind, node: NodeIndex, function: NodeIndex) -> ScopeId {
        let id = ScopeId(self.tree.scopes.len() as u32);
        self.tree.scopes.push(Scope {
            kind,
            parent: self.scope,
            span: self.arena.span(node),
            decls: Vec::new(),
            children: Vec::new(),
            function,
        });
        if let Some(parent) = self.tree.scopes.get_mut(self.scope.0 as usize) {
            parent.children.push(id);
        }
        self.scope = id;
        id
    }

    fn pop_scope(&mut self) {
        if let Some(scope) = self.tree.scope(self.scope) {
            self.scope = scope.parent;
        }
    }

    // Entries

    /// A fresh entry carrying the next id. Insert it before creating another.
    fn entry(&self, kind: DeclKind, name: Atom, node: NodeIndex) -> StubEntry {
        let id = DeclId(self.tree.entries.len() as u32);
        StubEntry::new(id, kind, name, self.scope, node, self.arena.span(node))
    }

    fn insert(&mut self, entry: StubEntry) -> DeclId {
        let id = entry.id;
        debug_assert_eq!(id.0 as usize, self.tree.entries.len());
        trace!(name = %entry.name, kind = ?entry.kind, id = id.0, "declare");

        self.tree.by_name.entry(entry.name.clone()).or_default().push(id);
        match entry.kind {
            DeclKind::Class => self.tree.classes.entry(entry.name.clone()).or_default().push(id),
            DeclKind::Alias => self.tree.aliases.entry(entry.name.clone()).or_default().push(id),
            DeclKind::Global => self.tree.globals.entry(entry.name.clone()).or_default().push(id),
            _ => {}
        }
        if let Some(owner) = &entry.owner
            && entry.kind.is_member()
        {
            self.tree.members.entry(owner.clone()).or_default().push(id);
        }
        if entry.node.is_some() {
            self.tree.node_decls.entry(entry.node).or_insert(id);
        }
        if let Some(scope) = self.tree.scopes.get_mut(entry.scope.0 as usize) {
            scope.decls.push(id);
        }
        self.tree.entries.push(entry);
        id
    }

    // Statements

    fn bind_stmts(&mut self, block: NodeIndex) {
        let arena = self.arena;
        match arena.data(block) {
            Some(NodeData::Block { stmts }) => {
                for &stmt in stmts {
                    self.bind_stmt(stmt);
                }
            }
            Some(_) => self.bind_stmt(block),
            None => {}
        }
    }

    fn bind_block(&mut self, block: NodeIndex, kind: ScopeKind) {
        if block.is_none() {
            return;
        }
        self.push_scope(kind, block, NodeIndex::NONE);
        self.bind_stmts(block);
        self.pop_scope();
    }

    fn bind_stmt(&mut self, stmt: NodeIndex) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH_SIZE, || self.bind_stmt_inner(stmt));
    }

    fn bind_stmt_inner(&mut self, stmt: NodeIndex) {
        let arena = self.arena;
        let Some(data) = arena.data(stmt) else {
            return;
        };
        let doc = arena.doc(stmt);
        if let Some(doc) = doc {
            self.bind_doc_tags(stmt, doc);
        }

        match data {
            NodeData::Local { names, exprs } => self.bind_local(stmt, names, exprs, doc),
            NodeData::LocalFunction { name, func } => self.bind_local_function(*name, *func, doc),
            NodeData::FunctionStat {
                target,
                method,
                func,
            } => self.bind_function_stat(stmt, *target, *method, *func, doc),
            NodeData::Assign { targets, exprs } => self.bind_assign(stmt, targets, exprs, doc),
            NodeData::Return { exprs } => {
                if let Some(&function) = self.functions.last()
                    && let Some(stub) = self.tree.functions.get_mut(&function)
                {
                    stub.return_stmts.push(stmt);
                }
                for &expr in exprs {
                    self.bind_expr(expr, None);
                }
            }
            NodeData::If { arms, else_block } => {
                for arm in arms {
                    self.bind_expr(arm.cond, None);
                    self.bind_block(arm.block, ScopeKind::Block);
                }
                self.bind_block(*else_block, ScopeKind::Block);
            }
            NodeData::While { cond, block } => {
                self.bind_expr(*cond, None);
                self.bind_block(*block, ScopeKind::Loop);
            }
            NodeData::Repeat { block, cond } => {
                // The condition sees the body's locals.
                self.push_scope(ScopeKind::Loop, stmt, NodeIndex::NONE);
                self.bind_stmts(*block);
                self.bind_expr(*cond, None);
                self.pop_scope();
            }
            NodeData::NumericFor {
                var,
                start,
                limit,
                step,
                block,
            } => {
                for expr in [*start, *limit, *step] {
                    self.bind_expr(expr, None);
                }
                self.push_scope(ScopeKind::Loop, stmt, NodeIndex::NONE);
                let visible_from = self.body_start(stmt, *block);
                self.bind_loop_var(*var, *start, 0, InitShape::NumericFor, visible_from);
                self.bind_stmts(*block);
                self.pop_scope();
            }
            NodeData::GenericFor {
                names,
                exprs,
                block,
            } => {
                for &expr in exprs {
                    self.bind_expr(expr, None);
                }
                self.push_scope(ScopeKind::Loop, stmt, NodeIndex::NONE);
                let iterator = exprs.first().copied().unwrap_or(NodeIndex::NONE);
                let visible_from = self.body_start(stmt, *block);
                for (i, &name) in names.iter().enumerate() {
                    self.bind_loop_var(name, iterator, i, InitShape::Iterator, visible_from);
                }
                self.bind_stmts(*block);
                self.pop_scope();
            }
            NodeData::Do { block } => self.bind_block(*block, ScopeKind::Block),
            NodeData::Block { .. } => self.bind_block(stmt, ScopeKind::Block),
            NodeData::ExprStat { expr } => self.bind_expr(*expr, None),
            NodeData::Chunk { block } => self.bind_stmts(*block),
            NodeData::Break | NodeData::DocOnly => {}
            _ => self.bind_expr(stmt, None),
        }
    }

    /// `---@class`, `---@field` and `---@alias` declare independently of the
    /// statement they are attached to.
    fn bind_doc_tags(&mut self, stmt: NodeIndex, doc: &DocComment) {
        let mut class: Option<Atom> = None;
        for tag in &doc.tags {
            match tag {
                DocTag::Class { name, supers } => {
                    if name.is_empty() {
                        warn!(file = %self.file, node = stmt.0, "@class without a name");
                        continue;
                    }
                    let mut entry = self.entry(DeclKind::Class, name.clone(), stmt);
                    entry.supers = supers.iter().filter(|s| !s.is_empty()).cloned().collect();
                    entry.deprecated = doc.is_deprecated();
                    entry.hoisted = true;
                    self.insert(entry);
                    class = Some(name.clone());
                }
                DocTag::Field {
                    visibility,
                    name,
                    ty,
                } => {
                    let Some(owner) = class.clone() else {
                        debug!(file = %self.file, field = %name, "@field outside a class comment");
                        continue;
                    };
                    if name.is_empty() {
                        warn!(file = %self.file, class = %owner, "@field without a name");
                        continue;
                    }
                    let mut entry = self.entry(DeclKind::Field, name.clone(), stmt);
                    entry.owner = Some(MemberOwner::Class(owner));
                    entry.worth = worth::DOC;
                    entry.visibility = *visibility;
                    entry.declared = Some(lower_doc_ty(ty, &[]));
                    self.insert(entry);
                }
                DocTag::Alias { name, generics, ty } => {
                    if name.is_empty() {
                        warn!(file = %self.file, node = stmt.0, "@alias without a name");
                        continue;
                    }
                    let params: Vec<Atom> = generics.iter().map(|g| g.name.clone()).collect();
                    let mut entry = self.entry(DeclKind::Alias, name.clone(), stmt);
                    entry.declared = Some(lower_doc_ty(ty, &params));
                    entry.generics = params;
                    entry.hoisted = true;
                    self.insert(entry);
                }
                _ => {}
            }
        }
    }

    fn bind_local(
        &mut self,
        stmt: NodeIndex,
        names: &[NodeIndex],
        exprs: &[NodeIndex],
        doc: Option<&DocComment>,
    ) {
        let arena = self.arena;
        let end = arena.span(stmt).end;
        let class = class_of(doc);
        let mut bound: Vec<(usize, DeclId)> = Vec::with_capacity(names.len());

        for (i, &name_node) in names.iter().enumerate() {
            let Some(name) = arena.name_text(name_node).filter(|n| !n.is_empty()).cloned() else {
                warn!(file = %self.file, node = name_node.0, "local without a name");
                continue;
            };
            let mut entry = self.entry(DeclKind::Local, name, name_node);
            entry.visible_from = end;
            entry.initializer = self.initializer_for(exprs, i);
            if i == 0 {
                apply_doc(&mut entry, doc, class.as_ref());
            }
            bound.push((i, self.insert(entry)));
        }

        for (i, id) in bound {
            if let Some(&expr) = exprs.get(i) {
                let owner = match (&class, i) {
                    (Some(class), 0) => MemberOwner::Class(class.clone()),
                    _ => MemberOwner::Table(id),
                };
                self.bind_table_members(expr, owner);
            }
        }
        for (i, &expr) in exprs.iter().enumerate() {
            self.bind_expr(expr, if i == 0 { doc } else { None });
        }
    }

    fn bind_local_function(&mut self, name_node: NodeIndex, func: NodeIndex, doc: Option<&DocComment>) {
        let arena = self.arena;
        match arena.name_text(name_node).filter(|n| !n.is_empty()) {
            Some(name) => {
                let mut entry = self.entry(DeclKind::Function, name.clone(), name_node);
                entry.hoisted = true;
                entry.initializer = Some(Initializer {
                    expr: func,
                    value_index: 0,
                    shape: self.shape_of(func),
                });
                apply_doc(&mut entry, doc, None);
                self.insert(entry);
            }
            None => warn!(file = %self.file, node = name_node.0, "local function without a name"),
        }
        self.bind_closure(func, doc, None, false);
    }

    fn bind_function_stat(
        &mut self,
        stmt: NodeIndex,
        target: NodeIndex,
        method: bool,
        func: NodeIndex,
        doc: Option<&DocComment>,
    ) {
        let arena = self.arena;
        let initializer = Some(Initializer {
            expr: func,
            value_index: 0,
            shape: self.shape_of(func),
        });
        let mut self_owner = None;

        match arena.data(target) {
            Some(NodeData::Name(name)) => {
                let pos = arena.span(target).start;
                if self.tree.lookup_local(name, pos, self.scope).is_none() {
                    let mut entry = self.entry(DeclKind::Global, name.clone(), target);
                    entry.visible_from = arena.span(stmt).end;
                    entry.initializer = initializer;
                    apply_doc(&mut entry, doc, None);
                    self.insert(entry);
                }
            }
            Some(NodeData::Index {
                base,
                key: IndexKey::Named(member),
            }) => {
                let owner = self.owner_of(*base);
                match &owner {
                    Some(owner) => {
                        let mut entry = self.entry(DeclKind::Function, member.clone(), target);
                        entry.owner = Some(owner.clone());
                        entry.worth = worth::METHOD_DEF;
                        entry.initializer = initializer;
                        apply_doc(&mut entry, doc, None);
                        self.insert(entry);
                    }
                    None => debug!(file = %self.file, member = %member, "function on an untracked table"),
                }
                if method {
                    self_owner = owner;
                }
            }
            _ => self.bind_expr(target, None),
        }
        self.bind_closure(func, doc, self_owner, method);
    }

    fn bind_assign(
        &mut self,
        stmt: NodeIndex,
        targets: &[NodeIndex],
        exprs: &[NodeIndex],
        doc: Option<&DocComment>,
    ) {
        let arena = self.arena;
        let class = class_of(doc);

        for (i, &target) in targets.iter().enumerate() {
            let primary = i == 0;
            match arena.data(target) {
                Some(NodeData::Name(name)) => {
                    let pos = arena.span(target).start;
                    if self.tree.lookup_local(name, pos, self.scope).is_some() {
                        continue;
                    }
                    let mut entry = self.entry(DeclKind::Global, name.clone(), target);
                    entry.visible_from = arena.span(stmt).end;
                    entry.initializer = self.initializer_for(exprs, i);
                    if primary {
                        apply_doc(&mut entry, doc, class.as_ref());
                    }
                    self.insert(entry);
                    if let Some(&expr) = exprs.get(i) {
                        let owner = match (&class, primary) {
                            (Some(class), true) => MemberOwner::Class(class.clone()),
                            _ => MemberOwner::Global(name.clone()),
                        };
                        self.bind_table_members(expr, owner);
                    }
                }
                Some(NodeData::Index {
                    base,
                    key: IndexKey::Named(member),
                }) => {
                    let Some(owner) = self.owner_of(*base) else {
                        self.bind_expr(*base, None);
                        continue;
                    };
                    let initializer = self.initializer_for(exprs, i);
                    let kind = match &initializer {
                        Some(Initializer {
                            shape: InitShape::Function { .. },
                            ..
                        }) => DeclKind::Function,
                        _ => DeclKind::Field,
                    };
                    let mut entry = self.entry(kind, member.clone(), target);
                    entry.owner = Some(owner);
                    entry.worth = worth::ASSIGN;
                    entry.initializer = initializer;
                    if primary {
                        apply_doc(&mut entry, doc, None);
                    }
                    self.insert(entry);
                }
                _ => self.bind_expr(target, None),
            }
        }

        let single = targets.len() == 1;
        for (i, &expr) in exprs.iter().enumerate() {
            self.bind_expr(expr, if i == 0 && single { doc } else { None });
        }
    }

    /// Loop variables are in scope in the body only; the header sees the
    /// enclosing bindings.
    fn bind_loop_var(
        &mut self,
        name_node: NodeIndex,
        expr: NodeIndex,
        value_index: usize,
        shape: InitShape,
        visible_from: u32,
    ) {
        let arena = self.arena;
        let Some(name) = arena.name_text(name_node).filter(|n| !n.is_empty()).cloned() else {
            warn!(file = %self.file, node = name_node.0, "loop variable without a name");
            return;
        };
        let mut entry = self.entry(DeclKind::Local, name, name_node);
        entry.visible_from = visible_from;
        if expr.is_some() {
            entry.initializer = Some(Initializer {
                expr,
                value_index,
                shape,
            });
        }
        self.insert(entry);
    }

    /// Named fields of a table constructor become members of `owner`.
    fn bind_table_members(&mut self, table: NodeIndex, owner: MemberOwner) {
        let arena = self.arena;
        let Some(NodeData::Table { fields }) = arena.data(table) else {
            return;
        };
        for &field in fields {
            let Some(NodeData::TableField {
                key: FieldKey::Named(name),
                value,
            }) = arena.data(field)
            else {
                continue;
            };
            let shape = self.shape_of(*value);
            let kind = match shape {
                InitShape::Function { .. } => DeclKind::Function,
                _ => DeclKind::Field,
            };
            let mut entry = self.entry(kind, name.clone(), field);
            entry.owner = Some(owner.clone());
            entry.worth = worth::TABLE_FIELD;
            entry.initializer = Some(Initializer {
                expr: *value,
                value_index: 0,
                shape,
            });
            apply_doc(&mut entry, arena.doc(field), None);
            self.insert(entry);
        }
    }

    // Expressions

    fn bind_expr(&mut self, expr: NodeIndex, doc: Option<&DocComment>) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH_SIZE, || self.bind_expr_inner(expr, doc));
    }

    fn bind_expr_inner(&mut self, expr: NodeIndex, doc: Option<&DocComment>) {
        let arena = self.arena;
        match arena.data(expr) {
            Some(NodeData::Closure { .. }) => self.bind_closure(expr, doc, None, false),
            Some(NodeData::Table { fields }) => {
                for &field in fields {
                    if let Some(NodeData::TableField { key, value }) = arena.data(field) {
                        if let FieldKey::Expr(key) = key {
                            self.bind_expr(*key, None);
                        }
                        self.bind_expr(*value, arena.doc(field));
                    }
                }
            }
            Some(_) => {
                for child in arena.children(expr) {
                    self.bind_expr(child, None);
                }
            }
            None => {}
        }
    }

    fn bind_closure(
        &mut self,
        closure: NodeIndex,
        doc: Option<&DocComment>,
        self_owner: Option<MemberOwner>,
        method: bool,
    ) {
        let arena = self.arena;
        let Some(NodeData::Closure {
            params,
            variadic,
            body,
        }) = arena.data(closure)
        else {
            return;
        };
        let generics: Vec<Atom> = doc
            .map(|d| d.generics().into_iter().map(|g| g.name.clone()).collect())
            .unwrap_or_default();
        let returns = doc
            .map(DocComment::returns)
            .filter(|r| !r.is_empty())
            .map(|r| lower_returns(&r, &generics));

        self.push_scope(ScopeKind::Function, closure, closure);
        let start = arena.span(closure).start;
        let mut param_ids = Vec::with_capacity(params.len() + usize::from(method));

        if method {
            let mut entry = self.entry(DeclKind::Parameter, Atom::new("self"), NodeIndex::NONE);
            entry.span = arena.span(closure);
            entry.hoisted = true;
            entry.visible_from = start;
            entry.declared = match doc.and_then(|d| d.param("self")) {
                Some(ty) => Some(lower_doc_ty(ty, &generics)),
                None => match &self_owner {
                    Some(MemberOwner::Class(class)) => Some(Ty::alias_ref(class.clone(), Vec::new())),
                    _ => None,
                },
            };
            entry.owner = self_owner.clone();
            param_ids.push(self.insert(entry));
        }
        for &param in params {
            let Some(name) = arena.name_text(param).filter(|n| !n.is_empty()).cloned() else {
                warn!(file = %self.file, node = param.0, "parameter without a name");
                continue;
            };
            let mut entry = self.entry(DeclKind::Parameter, name.clone(), param);
            entry.hoisted = true;
            entry.visible_from = start;
            entry.declared = doc
                .and_then(|d| d.param(&name))
                .map(|ty| lower_doc_ty(ty, &generics));
            entry.generics = generics.clone();
            param_ids.push(self.insert(entry));
        }

        let falls_through = !self.block_always_returns(*body);
        self.tree.functions.insert(
            closure,
            FunctionStub {
                returns,
                generics,
                params: param_ids,
                variadic: *variadic,
                method_of: self_owner,
                return_stmts: Vec::new(),
                falls_through,
            },
        );

        self.functions.push(closure);
        self.bind_stmts(*body);
        self.functions.pop();
        self.pop_scope();
    }

    // Syntactic helpers

    /// Which value of `exprs` the `i`-th name receives. Names past the last
    /// expression take further values of it.
    fn initializer_for(&self, exprs: &[NodeIndex], i: usize) -> Option<Initializer> {
        let last = exprs.len().checked_sub(1)?;
        let (expr, value_index) = if i <= last {
            (exprs[i], 0)
        } else {
            (exprs[last], i - last)
        };
        Some(Initializer {
            expr,
            value_index,
            shape: self.shape_of(expr),
        })
    }

    fn shape_of(&self, expr: NodeIndex) -> InitShape {
        match self.arena.data(expr) {
            Some(NodeData::Closure {
                params, variadic, ..
            }) => InitShape::Function {
                params: params.len(),
                variadic: *variadic,
            },
            Some(NodeData::Table { .. }) => InitShape::Table,
            Some(
                NodeData::Nil
                | NodeData::True
                | NodeData::False
                | NodeData::Number(_)
                | NodeData::String(_),
            ) => InitShape::Literal,
            Some(NodeData::Call { .. }) => InitShape::Call,
            Some(NodeData::Name(name)) => InitShape::Name(name.clone()),
            Some(NodeData::Paren { expr }) => self.shape_of(*expr),
            _ => InitShape::Other,
        }
    }

    /// Owner for `base.member` when `base` is a plain name.
    fn owner_of(&self, base: NodeIndex) -> Option<MemberOwner> {
        let arena = self.arena;
        let Some(NodeData::Name(name)) = arena.data(base) else {
            return None;
        };
        let pos = arena.span(base).start;
        match self.tree.lookup_local(name, pos, self.scope) {
            Some(id) => {
                let entry = self.tree.entry(id)?;
                if entry.kind == DeclKind::Parameter && entry.owner.is_some() {
                    return entry.owner.clone();
                }
                Some(match &entry.class {
                    Some(class) => MemberOwner::Class(class.clone()),
                    None => MemberOwner::Table(id),
                })
            }
            None => {
                let class = self
                    .tree
                    .global_decls(name)
                    .iter()
                    .filter_map(|&id| self.tree.entry(id))
                    .find_map(|entry| entry.class.clone());
                Some(match class {
                    Some(class) => MemberOwner::Class(class),
                    None => MemberOwner::Global(name.clone()),
                })
            }
        }
    }

    fn body_start(&self, stmt: NodeIndex, block: NodeIndex) -> u32 {
        if block.is_some() {
            self.arena.span(block).start
        } else {
            self.arena.span(stmt).end
        }
    }

    fn block_always_returns(&self, block: NodeIndex) -> bool {
        match self.arena.data(block) {
            Some(NodeData::Block { stmts }) => stmts.iter().any(|&s| self.stmt_always_returns(s)),
            _ => false,
        }
    }

    fn stmt_always_returns(&self, stmt: NodeIndex) -> bool {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH_SIZE, || self.stmt_always_returns_inner(stmt))
    }

    fn stmt_always_returns_inner(&self, stmt: NodeIndex) -> bool {
        match self.arena.data(stmt) {
            Some(NodeData::Return { .. }) => true,
            Some(NodeData::Do { block }) => self.block_always_returns(*block),
            Some(NodeData::If { arms, else_block }) => {
                else_block.is_some()
                    && self.block_always_returns(*else_block)
                    && arms.iter().all(|arm| self.block_always_returns(arm.block))
            }
            _ => false,
        }
    }
}

fn class_of(doc: Option<&DocComment>) -> Option<Atom> {
    doc.and_then(DocComment::class_tag)
        .map(|(name, _)| name.clone())
        .filter(|name| !name.is_empty())
}

/// `@type`, `@class`, `@deprecated` and `@overload` on the primary name.
fn apply_doc(entry: &mut StubEntry, doc: Option<&DocComment>, class: Option<&Atom>) {
    let Some(doc) = doc else {
        return;
    };
    let generics: Vec<Atom> = doc.generics().into_iter().map(|g| g.name.clone()).collect();
    if let Some(class) = class {
        entry.declared = Some(Ty::alias_ref(class.clone(), Vec::new()));
        entry.class = Some(class.clone());
    } else if let Some(ty) = doc.type_tag() {
        entry.declared = Some(lower_doc_ty(ty, &generics));
    }
    entry.deprecated = doc.is_deprecated();
    entry.overloads = doc
        .tags
        .iter()
        .filter_map(|tag| match tag {
            DocTag::Overload { ty } => Some(lower_doc_ty(ty, &generics)),
            _ => None,
        })
        .collect();
    entry.generics = generics;
}

#[cfg(test)]
#[path = "../tests/stub_tests.rs"]
mod tests;
