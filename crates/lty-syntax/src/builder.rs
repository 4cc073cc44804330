//! Bottom-up tree construction.
//!
//! `TreeBuilder` is what a parser (or a test) uses to assemble a
//! [`NodeArena`]. Nodes must be created in source order: every new node gets
//! a span that ends after everything created before it and starts at its
//! earliest child, so textual order and parent containment both hold.

use crate::arena::NodeArena;
use crate::doc::{DocComment, DocTag};
use crate::node::{BinaryOp, FieldKey, IfArm, IndexKey, Node, NodeData, NodeIndex, UnaryOp};
use lty_common::{Atom, Span};

#[derive(Debug, Default)]
pub struct TreeBuilder {
    arena: NodeArena,
    cursor: u32,
}

impl TreeBuilder {
    pub fn new() -> TreeBuilder {
        TreeBuilder::default()
    }

    /// Allocate a node, wiring the parent link of each child.
    pub fn push(&mut self, data: NodeData) -> NodeIndex {
        let children = data.children();
        let start = children
            .iter()
            .map(|&child| self.arena.span(child).start)
            .min()
            .unwrap_or(self.cursor);
        let span = Span::new(start, self.cursor + 1);
        self.cursor += 2;
        let index = self.arena.add(Node {
            data,
            span,
            parent: NodeIndex::NONE,
        });
        for child in children {
            if let Some(node) = self.arena.get_mut(child) {
                node.parent = index;
            }
        }
        index
    }

    /// Attach documentation tags to `node` and hand it back.
    pub fn doc(&mut self, node: NodeIndex, tags: Vec<DocTag>) -> NodeIndex {
        self.arena.attach_doc(node, DocComment::new(tags));
        node
    }

    /// Finish the file: wrap `stmts` in a block and a chunk.
    pub fn finish(mut self, stmts: Vec<NodeIndex>) -> NodeArena {
        let block = self.block(stmts);
        let chunk = self.push(NodeData::Chunk { block });
        self.arena.set_root(chunk);
        self.arena
    }

    // Expressions

    pub fn nil(&mut self) -> NodeIndex {
        self.push(NodeData::Nil)
    }

    pub fn boolean(&mut self, value: bool) -> NodeIndex {
        self.push(if value { NodeData::True } else { NodeData::False })
    }

    pub fn number(&mut self, value: f64) -> NodeIndex {
        self.push(NodeData::Number(value))
    }

    pub fn string(&mut self, text: &str) -> NodeIndex {
        self.push(NodeData::String(Atom::new(text)))
    }

    pub fn vararg(&mut self) -> NodeIndex {
        self.push(NodeData::Vararg)
    }

    pub fn name(&mut self, text: &str) -> NodeIndex {
        self.push(NodeData::Name(Atom::new(text)))
    }

    /// `base.field`
    pub fn field(&mut self, base: NodeIndex, field: &str) -> NodeIndex {
        self.push(NodeData::Index {
            base,
            key: IndexKey::Named(Atom::new(field)),
        })
    }

    /// `base[key]`
    pub fn index(&mut self, base: NodeIndex, key: NodeIndex) -> NodeIndex {
        self.push(NodeData::Index {
            base,
            key: IndexKey::Expr(key),
        })
    }

    pub fn call(&mut self, callee: NodeIndex, args: Vec<NodeIndex>) -> NodeIndex {
        self.push(NodeData::Call {
            callee,
            method: None,
            args,
        })
    }

    /// `base:method(args)`
    pub fn method_call(&mut self, base: NodeIndex, method: &str, args: Vec<NodeIndex>) -> NodeIndex {
        self.push(NodeData::Call {
            callee: base,
            method: Some(Atom::new(method)),
            args,
        })
    }

    /// `function(params) body end`; `body` holds the statements.
    pub fn closure(&mut self, params: &[&str], body: Vec<NodeIndex>) -> NodeIndex {
        self.closure_with(params, false, body)
    }

    pub fn closure_with(&mut self, params: &[&str], variadic: bool, body: Vec<NodeIndex>) -> NodeIndex {
        let body = self.block(body);
        let params = params.iter().map(|p| self.name(p)).collect();
        self.push(NodeData::Closure {
            params,
            variadic,
            body,
        })
    }

    pub fn table(&mut self, fields: Vec<NodeIndex>) -> NodeIndex {
        self.push(NodeData::Table { fields })
    }

    /// `name = value` inside a table constructor.
    pub fn table_field(&mut self, name: &str, value: NodeIndex) -> NodeIndex {
        self.push(NodeData::TableField {
            key: FieldKey::Named(Atom::new(name)),
            value,
        })
    }

    /// `[key] = value` inside a table constructor.
    pub fn table_keyed(&mut self, key: NodeIndex, value: NodeIndex) -> NodeIndex {
        self.push(NodeData::TableField {
            key: FieldKey::Expr(key),
            value,
        })
    }

    /// Positional `value` inside a table constructor.
    pub fn table_item(&mut self, value: NodeIndex) -> NodeIndex {
        self.push(NodeData::TableField {
            key: FieldKey::Positional,
            value,
        })
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeIndex, rhs: NodeIndex) -> NodeIndex {
        self.push(NodeData::Binary { op, lhs, rhs })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeIndex) -> NodeIndex {
        self.push(NodeData::Unary { op, operand })
    }

    pub fn paren(&mut self, expr: NodeIndex) -> NodeIndex {
        self.push(NodeData::Paren { expr })
    }

    // Statements

    pub fn block(&mut self, stmts: Vec<NodeIndex>) -> NodeIndex {
        self.push(NodeData::Block { stmts })
    }

    /// `local name = expr`
    pub fn local(&mut self, name: &str, expr: NodeIndex) -> NodeIndex {
        self.locals(&[name], vec![expr])
    }

    /// `local name`
    pub fn local_decl(&mut self, name: &str) -> NodeIndex {
        self.locals(&[name], Vec::new())
    }

    /// `local a, b = e1, e2`
    pub fn locals(&mut self, names: &[&str], exprs: Vec<NodeIndex>) -> NodeIndex {
        let names = names.iter().map(|n| self.name(n)).collect();
        self.push(NodeData::Local { names, exprs })
    }

    pub fn local_function(&mut self, name: &str, func: NodeIndex) -> NodeIndex {
        let name = self.name(name);
        self.push(NodeData::LocalFunction { name, func })
    }

    /// `function target() end` where `target` is a name or field path.
    pub fn function_stat(&mut self, target: NodeIndex, func: NodeIndex) -> NodeIndex {
        self.push(NodeData::FunctionStat {
            target,
            method: false,
            func,
        })
    }

    /// `function Base:method() end`
    pub fn method_stat(&mut self, base: &str, method: &str, func: NodeIndex) -> NodeIndex {
        let base = self.name(base);
        let target = self.field(base, method);
        self.push(NodeData::FunctionStat {
            target,
            method: true,
            func,
        })
    }

    pub fn assign(&mut self, targets: Vec<NodeIndex>, exprs: Vec<NodeIndex>) -> NodeIndex {
        self.push(NodeData::Assign { targets, exprs })
    }

    pub fn ret(&mut self, exprs: Vec<NodeIndex>) -> NodeIndex {
        self.push(NodeData::Return { exprs })
    }

    /// `if c1 then b1 elseif c2 then b2 else e end`
    pub fn if_stat(&mut self, arms: Vec<(NodeIndex, Vec<NodeIndex>)>, else_body: Option<Vec<NodeIndex>>) -> NodeIndex {
        let arms = arms
            .into_iter()
            .map(|(cond, body)| IfArm {
                cond,
                block: self.block(body),
            })
            .collect();
        let else_block = match else_body {
            Some(body) => self.block(body),
            None => NodeIndex::NONE,
        };
        self.push(NodeData::If { arms, else_block })
    }

    pub fn while_stat(&mut self, cond: NodeIndex, body: Vec<NodeIndex>) -> NodeIndex {
        let block = self.block(body);
        self.push(NodeData::While { cond, block })
    }

    pub fn repeat_stat(&mut self, body: Vec<NodeIndex>, cond: NodeIndex) -> NodeIndex {
        let block = self.block(body);
        self.push(NodeData::Repeat { block, cond })
    }

    pub fn numeric_for(
        &mut self,
        var: &str,
        start: NodeIndex,
        limit: NodeIndex,
        step: Option<NodeIndex>,
        body: Vec<NodeIndex>,
    ) -> NodeIndex {
        let block = self.block(body);
        let var = self.name(var);
        self.push(NodeData::NumericFor {
            var,
            start,
            limit,
            step: step.unwrap_or(NodeIndex::NONE),
            block,
        })
    }

    pub fn generic_for(&mut self, names: &[&str], exprs: Vec<NodeIndex>, body: Vec<NodeIndex>) -> NodeIndex {
        let block = self.block(body);
        let names = names.iter().map(|n| self.name(n)).collect();
        self.push(NodeData::GenericFor {
            names,
            exprs,
            block,
        })
    }

    pub fn do_stat(&mut self, body: Vec<NodeIndex>) -> NodeIndex {
        let block = self.block(body);
        self.push(NodeData::Do { block })
    }

    pub fn expr_stat(&mut self, expr: NodeIndex) -> NodeIndex {
        self.push(NodeData::ExprStat { expr })
    }

    pub fn break_stat(&mut self) -> NodeIndex {
        self.push(NodeData::Break)
    }

    /// A free-standing annotation such as `---@alias`.
    pub fn doc_only(&mut self, tags: Vec<DocTag>) -> NodeIndex {
        let node = self.push(NodeData::DocOnly);
        self.doc(node, tags)
    }
}

#[cfg(test)]
#[path = "../tests/builder_tests.rs"]
mod tests;
