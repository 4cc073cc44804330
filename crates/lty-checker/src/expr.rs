//! Expression inference.

use crate::infer::{Inferrer, union_all};
use lty_binder::{DeclKey, FunctionStub, NameResolver};
use lty_common::limits::{STACK_GROWTH_SIZE, STACK_RED_ZONE};
use lty_common::{Atom, FileId};
use lty_solver::{ClassType, DeclSite, MemberInfo, Ty, union};
use lty_syntax::{BinaryOp, FieldKey, NodeData, NodeIndex, UnaryOp};
use tracing::{debug, trace};

impl<'a> Inferrer<'a> {
    /// Type of an expression. Calls and `...` may produce a `Tuple`; use
    /// [`infer_value`](Self::infer_value) in single-value positions.
    pub fn infer_expr(&mut self, file: FileId, node: NodeIndex) -> Ty {
        let expected = self.ctx.swap_expected(None);
        if self.ctx.is_cancelled() {
            return Ty::Unknown;
        }
        if !self.ctx.depth.enter() {
            debug!(%file, node = node.0, "expression depth limit reached");
            return Ty::Unknown;
        }
        let ty = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH_SIZE, || {
            self.infer_expr_inner(file, node, expected)
        });
        self.ctx.depth.leave();
        ty
    }

    /// Infer `node` with an expected type, as at a call-argument position.
    pub fn infer_expr_expecting(&mut self, file: FileId, node: NodeIndex, expected: Option<Ty>) -> Ty {
        self.ctx.expected = expected;
        self.infer_expr(file, node)
    }

    /// The single value an expression contributes.
    pub fn infer_value(&mut self, file: FileId, node: NodeIndex) -> Ty {
        self.infer_expr(file, node).first_value()
    }

    fn infer_expr_inner(&mut self, file: FileId, node: NodeIndex, expected: Option<Ty>) -> Ty {
        let index = self.index;
        let Some(data) = index.arena(file).and_then(|arena| arena.data(node)) else {
            return Ty::Unknown;
        };
        match data {
            NodeData::Nil => Ty::Nil,
            NodeData::True | NodeData::False => Ty::Boolean,
            NodeData::Number(_) => Ty::Number,
            NodeData::String(text) => Ty::StringLiteral(text.clone()),
            NodeData::Vararg => Ty::Unknown,
            NodeData::Name(name) => self.infer_name(file, node, name),
            NodeData::Index { base, key } => self.infer_index(file, *base, key),
            NodeData::Call {
                callee,
                method,
                args,
            } => self.infer_call(file, *callee, method.as_ref(), args),
            NodeData::Closure { .. } => self.infer_closure(file, node, expected),
            NodeData::Table { .. } => self.infer_table(file, node),
            NodeData::TableField { value, .. } => self.infer_value(file, *value),
            NodeData::Binary { op, lhs, rhs } => self.infer_binary(file, *op, *lhs, *rhs),
            NodeData::Unary { op, operand } => self.infer_unary(file, *op, *operand),
            NodeData::Paren { expr } => self.infer_value(file, *expr),
            _ => Ty::Unknown,
        }
    }

    fn infer_name(&mut self, file: FileId, node: NodeIndex, name: &Atom) -> Ty {
        let index = self.index;
        let pos = index.arena(file).map_or(0, |arena| arena.span(node).start);
        let candidates = NameResolver::new(index).resolve_name(file, name, pos);
        let lexical = candidates.len() == 1
            && candidates[0].file == file
            && index
                .entry(candidates[0])
                .is_some_and(|entry| entry.kind.is_lexical());
        if !lexical {
            // Global and member candidates change when other files do.
            self.record_name(name);
        }
        if candidates.is_empty() {
            trace!(%file, name = %name, "unresolved name");
            return Ty::Unknown;
        }
        let types = candidates
            .into_iter()
            .map(|key| self.infer_decl(key))
            .collect();
        self.union_in_project(types)
    }

    fn infer_binary(&mut self, file: FileId, op: BinaryOp, lhs: NodeIndex, rhs: NodeIndex) -> Ty {
        match op {
            BinaryOp::And => self.infer_value(file, rhs),
            BinaryOp::Or => {
                let left = self.infer_value(file, lhs).without_nil();
                let right = self.infer_value(file, rhs);
                union(&left, &right)
            }
            BinaryOp::Concat => Ty::String,
            op if op.is_comparison() => Ty::Boolean,
            _ => {
                let left = self.infer_value(file, lhs);
                let right = self.infer_value(file, rhs);
                arithmetic(&left, &right)
            }
        }
    }

    fn infer_unary(&mut self, file: FileId, op: UnaryOp, operand: NodeIndex) -> Ty {
        match op {
            UnaryOp::Not => Ty::Boolean,
            UnaryOp::Len => Ty::Number,
            UnaryOp::Neg | UnaryOp::BitNot => {
                let operand = self.infer_value(file, operand);
                arithmetic(&operand, &Ty::Number)
            }
        }
    }

    /// Table constructor: an array when purely positional, otherwise an
    /// anonymous class of its named fields.
    pub(crate) fn infer_table(&mut self, file: FileId, node: NodeIndex) -> Ty {
        let index = self.index;
        let (Some(arena), Some(tree)) = (index.arena(file), index.stubs(file)) else {
            return Ty::Unknown;
        };
        let Some(NodeData::Table { fields }) = arena.data(node) else {
            return Ty::Unknown;
        };

        let mut class = ClassType::anonymous();
        let mut items: Vec<Ty> = Vec::new();
        for &field in fields {
            let Some(NodeData::TableField { key, value }) = arena.data(field) else {
                continue;
            };
            match key {
                FieldKey::Named(name) => {
                    // Fields of tracked tables carry their own documentation.
                    let ty = match tree.decl_for_node(field) {
                        Some(decl) => self.infer_decl(DeclKey::new(file, decl)),
                        None => self.infer_value(file, *value),
                    };
                    let mut info = MemberInfo::new(ty);
                    info.site = Some(DeclSite {
                        file,
                        span: arena.span(field),
                    });
                    class.members.insert(name.clone(), info);
                }
                FieldKey::Positional => {
                    let ty = self.infer_value(file, *value);
                    items.push(ty.widen());
                }
                FieldKey::Expr(_) => {}
            }
        }

        if class.members.is_empty() && !items.is_empty() {
            return Ty::array(union_all(items));
        }
        Ty::class(class)
    }

    /// Function literal. Parameters take their documented or contextual
    /// type; the return type is the documented one or the union over every
    /// `return` in the body, plus `nil` if control can fall off the end.
    pub(crate) fn infer_closure(&mut self, file: FileId, node: NodeIndex, expected: Option<Ty>) -> Ty {
        let index = self.index;
        let Some(stub) = index.stubs(file).and_then(|tree| tree.function(node)) else {
            return Ty::any_function();
        };
        let expected = expected.as_ref().and_then(Ty::as_function);

        let mut params = Vec::with_capacity(stub.params.len());
        for (i, &param) in stub.params.iter().enumerate() {
            let mut ty = self.infer_decl(DeclKey::new(file, param));
            if ty.is_unknown()
                && let Some(hint) = expected.and_then(|f| f.params.get(i))
            {
                ty = hint.clone();
            }
            params.push(ty);
        }

        let ret = match &stub.returns {
            Some(returns) => self.resolve_type(returns),
            None => self.infer_returns(file, stub),
        };
        Ty::generic_function(params, ret, stub.variadic, stub.generics.clone())
    }

    fn infer_returns(&mut self, file: FileId, stub: &FunctionStub) -> Ty {
        let index = self.index;
        let Some(arena) = index.arena(file) else {
            return Ty::Unknown;
        };
        let mut types = Vec::with_capacity(stub.return_stmts.len() + 1);
        for &stmt in &stub.return_stmts {
            let Some(NodeData::Return { exprs }) = arena.data(stmt) else {
                continue;
            };
            let ty = match exprs.as_slice() {
                [] => Ty::Nil,
                [single] => self.infer_expr(file, *single),
                many => Ty::tuple(many.iter().map(|&expr| self.infer_value(file, expr)).collect()),
            };
            types.push(ty);
        }
        if stub.falls_through || types.is_empty() {
            types.push(Ty::Nil);
        }
        union_all(types)
    }
}

/// Arithmetic result rule: `Number` only when both operands are numbers,
/// `Unknown` otherwise (including when either is unknown).
fn arithmetic(left: &Ty, right: &Ty) -> Ty {
    if left.is_number_like() && right.is_number_like() {
        Ty::Number
    } else {
        Ty::Unknown
    }
}
