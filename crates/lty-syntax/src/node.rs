//! Node kinds for the Lua syntax tree.
//!
//! Every statement and expression form is one variant of [`NodeData`]. Child
//! nodes are referenced by [`NodeIndex`] into the owning [`NodeArena`], never
//! by pointer, so a tree is a flat vector that can be shared across threads.
//!
//! [`NodeArena`]: crate::NodeArena

use lty_common::{Atom, Span};
use serde::Serialize;
use smallvec::SmallVec;

/// Index of a node within its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        NodeIndex::NONE
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
    Mod,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Sub
                | BinaryOp::Mul
                | BinaryOp::Div
                | BinaryOp::IDiv
                | BinaryOp::Mod
                | BinaryOp::Pow
                | BinaryOp::BitAnd
                | BinaryOp::BitOr
                | BinaryOp::BitXor
                | BinaryOp::Shl
                | BinaryOp::Shr
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Neg,
    Not,
    Len,
    BitNot,
}

/// Key of an index expression: `a.b` or `a[expr]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum IndexKey {
    Named(Atom),
    Expr(NodeIndex),
}

/// Key of a table constructor field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum FieldKey {
    /// `{ name = value }`
    Named(Atom),
    /// `{ [expr] = value }`
    Expr(NodeIndex),
    /// `{ value }`
    Positional,
}

/// One `if`/`elseif` arm.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IfArm {
    pub cond: NodeIndex,
    pub block: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum NodeData {
    // Statements
    Chunk {
        block: NodeIndex,
    },
    Block {
        stmts: Vec<NodeIndex>,
    },
    /// `local a, b = e1, e2`. `names` are `Name` nodes.
    Local {
        names: Vec<NodeIndex>,
        exprs: Vec<NodeIndex>,
    },
    /// `local function name() end`. `name` is a `Name` node, `func` a `Closure`.
    LocalFunction {
        name: NodeIndex,
        func: NodeIndex,
    },
    /// `function a.b.c() end` or `function a:b() end` (`method == true`).
    /// `target` is a `Name` or `Index` expression.
    FunctionStat {
        target: NodeIndex,
        method: bool,
        func: NodeIndex,
    },
    Assign {
        targets: Vec<NodeIndex>,
        exprs: Vec<NodeIndex>,
    },
    Return {
        exprs: Vec<NodeIndex>,
    },
    If {
        arms: Vec<IfArm>,
        else_block: NodeIndex,
    },
    While {
        cond: NodeIndex,
        block: NodeIndex,
    },
    Repeat {
        block: NodeIndex,
        cond: NodeIndex,
    },
    /// `for var = start, limit[, step] do block end`. `step` may be NONE.
    NumericFor {
        var: NodeIndex,
        start: NodeIndex,
        limit: NodeIndex,
        step: NodeIndex,
        block: NodeIndex,
    },
    /// `for k, v in exprs do block end`.
    GenericFor {
        names: Vec<NodeIndex>,
        exprs: Vec<NodeIndex>,
        block: NodeIndex,
    },
    Do {
        block: NodeIndex,
    },
    ExprStat {
        expr: NodeIndex,
    },
    Break,
    /// A documentation comment not followed by a statement (`---@alias` etc.).
    DocOnly,

    // Expressions
    Nil,
    True,
    False,
    Number(f64),
    String(Atom),
    Vararg,
    Name(Atom),
    Index {
        base: NodeIndex,
        key: IndexKey,
    },
    /// `callee(args)` or `callee:method(args)`.
    Call {
        callee: NodeIndex,
        method: Option<Atom>,
        args: Vec<NodeIndex>,
    },
    /// `function(params) body end`. `params` are `Name` nodes.
    Closure {
        params: Vec<NodeIndex>,
        variadic: bool,
        body: NodeIndex,
    },
    Table {
        fields: Vec<NodeIndex>,
    },
    TableField {
        key: FieldKey,
        value: NodeIndex,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeIndex,
        rhs: NodeIndex,
    },
    Unary {
        op: UnaryOp,
        operand: NodeIndex,
    },
    Paren {
        expr: NodeIndex,
    },
}

impl NodeData {
    /// Direct children in source order.
    pub fn children(&self) -> SmallVec<[NodeIndex; 4]> {
        let mut out: SmallVec<[NodeIndex; 4]> = SmallVec::new();
        match self {
            NodeData::Chunk { block } | NodeData::Do { block } => out.push(*block),
            NodeData::Block { stmts } => out.extend(stmts.iter().copied()),
            NodeData::Local { names, exprs } => {
                out.extend(names.iter().copied());
                out.extend(exprs.iter().copied());
            }
            NodeData::LocalFunction { name, func } => {
                out.push(*name);
                out.push(*func);
            }
            NodeData::FunctionStat { target, func, .. } => {
                out.push(*target);
                out.push(*func);
            }
            NodeData::Assign { targets, exprs } => {
                out.extend(targets.iter().copied());
                out.extend(exprs.iter().copied());
            }
            NodeData::Return { exprs } => out.extend(exprs.iter().copied()),
            NodeData::If { arms, else_block } => {
                for arm in arms {
                    out.push(arm.cond);
                    out.push(arm.block);
                }
                out.push(*else_block);
            }
            NodeData::While { cond, block } => {
                out.push(*cond);
                out.push(*block);
            }
            NodeData::Repeat { block, cond } => {
                out.push(*block);
                out.push(*cond);
            }
            NodeData::NumericFor {
                var,
                start,
                limit,
                step,
                block,
            } => {
                out.extend([*var, *start, *limit, *step, *block]);
            }
            NodeData::GenericFor {
                names,
                exprs,
                block,
            } => {
                out.extend(names.iter().copied());
                out.extend(exprs.iter().copied());
                out.push(*block);
            }
            NodeData::ExprStat { expr } | NodeData::Paren { expr } => out.push(*expr),
            NodeData::Index { base, key } => {
                out.push(*base);
                if let IndexKey::Expr(key) = key {
                    out.push(*key);
                }
            }
            NodeData::Call { callee, args, .. } => {
                out.push(*callee);
                out.extend(args.iter().copied());
            }
            NodeData::Closure { params, body, .. } => {
                out.extend(params.iter().copied());
                out.push(*body);
            }
            NodeData::Table { fields } => out.extend(fields.iter().copied()),
            NodeData::TableField { key, value } => {
                if let FieldKey::Expr(key) = key {
                    out.push(*key);
                }
                out.push(*value);
            }
            NodeData::Binary { lhs, rhs, .. } => {
                out.push(*lhs);
                out.push(*rhs);
            }
            NodeData::Unary { operand, .. } => out.push(*operand),
            NodeData::Break
            | NodeData::DocOnly
            | NodeData::Nil
            | NodeData::True
            | NodeData::False
            | NodeData::Number(_)
            | NodeData::String(_)
            | NodeData::Vararg
            | NodeData::Name(_) => {}
        }
        out.retain(|idx| idx.is_some());
        out
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeData::Chunk { .. }
                | NodeData::Block { .. }
                | NodeData::Local { .. }
                | NodeData::LocalFunction { .. }
                | NodeData::FunctionStat { .. }
                | NodeData::Assign { .. }
                | NodeData::Return { .. }
                | NodeData::If { .. }
                | NodeData::While { .. }
                | NodeData::Repeat { .. }
                | NodeData::NumericFor { .. }
                | NodeData::GenericFor { .. }
                | NodeData::Do { .. }
                | NodeData::ExprStat { .. }
                | NodeData::Break
                | NodeData::DocOnly
        )
    }

    /// Text of a `Name` node.
    pub fn name_text(&self) -> Option<&Atom> {
        match self {
            NodeData::Name(name) => Some(name),
            _ => None,
        }
    }
}

/// One node: its data, its source range and its parent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub data: NodeData,
    pub span: Span,
    pub parent: NodeIndex,
}
