//! Construction helpers for resolved ASTs.
//!
//! The front end that will eventually produce these trees is not part of
//! this crate, so the driver and the test suite build them by hand. The
//! helpers mimic the output contract of the resolution pass: every
//! declaration gets a fresh [`SymbolId`], and declaring a source name again
//! shadows the earlier binding while both keep their own identity.

use hashbrown::HashMap;

use crate::{
    ast::{
        BinaryOperatorKind, FunctionParameter, FunctionSignature, Literal, LiteralKind, Node,
        NodeKind, SymbolId, UnaryOperatorKind,
    },
    ty::Type,
};

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    next_symbol: u32,
    bindings: HashMap<String, SymbolId>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name`, allocating a fresh symbol for it. Re-declaring a
    /// name shadows the previous binding exactly like the resolver would;
    /// the old symbol stays valid wherever it was already used.
    pub fn declare(&mut self, name: &str) -> SymbolId {
        let symbol = SymbolId(self.next_symbol);
        self.next_symbol += 1;
        self.bindings.insert(name.to_owned(), symbol);
        symbol
    }

    /// The symbol `name` currently resolves to.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.bindings.get(name).copied()
    }
}

pub fn module(declarations: Vec<Node>) -> Node {
    Node::with_children(NodeKind::Module, declarations)
}

pub fn block(statements: Vec<Node>) -> Node {
    Node::with_children(NodeKind::Block, statements)
}

pub fn let_binding(symbol: SymbolId, ty: Type, initializer: Option<Node>) -> Node {
    Node::with_children(
        NodeKind::Let { symbol, ty },
        initializer.into_iter().collect(),
    )
}

pub fn if_statement(condition: Node, body: Node) -> Node {
    Node::with_children(NodeKind::If, vec![condition, body])
}

pub fn elif_statement(condition: Node, body: Node) -> Node {
    Node::with_children(NodeKind::Elif, vec![condition, body])
}

pub fn else_statement(body: Node) -> Node {
    Node::with_children(NodeKind::Else, vec![body])
}

pub fn while_loop(condition: Node, body: Node) -> Node {
    Node::with_children(NodeKind::While, vec![condition, body])
}

pub fn break_statement() -> Node {
    Node::new(NodeKind::Break)
}

pub fn continue_statement() -> Node {
    Node::new(NodeKind::Continue)
}

pub fn return_statement(value: Option<Node>) -> Node {
    Node::with_children(NodeKind::Return, value.into_iter().collect())
}

/// Wraps an expression tree the way the parser does; directly inside a
/// block this is an expression statement.
pub fn expression(inner: Node) -> Node {
    Node::with_children(NodeKind::Expression, vec![inner])
}

/// Wraps a name lookup the way the parser does.
pub fn name(inner: Node) -> Node {
    Node::with_children(NodeKind::Name, vec![inner])
}

pub fn binary(operator: BinaryOperatorKind, lhs: Node, rhs: Node) -> Node {
    Node::with_children(NodeKind::Binary(operator), vec![lhs, rhs])
}

pub fn unary(operator: UnaryOperatorKind, operand: Node) -> Node {
    Node::with_children(NodeKind::Unary(operator), vec![operand])
}

pub fn negate(operand: Node) -> Node {
    Node::with_children(NodeKind::Negate, vec![operand])
}

pub fn call(callee: SymbolId, arguments: Vec<Node>) -> Node {
    Node::with_children(NodeKind::Call { callee }, arguments)
}

pub fn get(symbol: SymbolId) -> Node {
    Node::new(NodeKind::Get { symbol })
}

pub fn int_literal(value: i32) -> Node {
    Node::new(NodeKind::Literal(Literal {
        kind: LiteralKind::I32,
        text: value.to_string(),
    }))
}

pub fn bool_literal(value: bool) -> Node {
    Node::new(NodeKind::Literal(Literal {
        kind: LiteralKind::Bool,
        text: value.to_string(),
    }))
}

pub fn char_literal(character: char) -> Node {
    Node::new(NodeKind::Literal(Literal {
        kind: LiteralKind::U8,
        text: character.to_string(),
    }))
}

pub fn parameter(symbol: SymbolId, ty: Type) -> FunctionParameter {
    FunctionParameter { symbol, ty }
}

pub fn function(
    symbol: SymbolId,
    return_type: Type,
    parameters: Vec<FunctionParameter>,
    body: Node,
) -> Node {
    Node::with_children(
        NodeKind::Function {
            symbol,
            signature: FunctionSignature {
                return_type,
                parameters,
            },
        },
        vec![body],
    )
}

pub fn test(symbol: SymbolId, name: &str, body: Node) -> Node {
    Node::with_children(
        NodeKind::Test {
            symbol,
            name: name.to_owned(),
        },
        vec![body],
    )
}
