use strum::EnumIter;

use crate::ty::Type;

/// The unique identity of one declared variable, parameter, function, or
/// test, assigned by the name resolution pass.
///
/// The backend treats the index as opaque input and never reassigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// The canonical identifier this symbol is known by in generated C.
    ///
    /// Derived from the index alone, never from the source name, so two
    /// distinct symbols cannot collide no matter how their source names
    /// shadow or duplicate each other.
    pub fn mangled(self) -> String {
        format!("symbol_{}", self.0)
    }
}

/// One node of the resolved, type checked AST.
///
/// The tree is strict: children are owned in declaration order, there are
/// no back edges and no sharing, and the backend only ever reads it.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.children.last()
    }
}

#[derive(Debug)]
pub enum NodeKind {
    /// One source file's worth of top level declarations
    Module,
    /// A brace delimited statement list
    Block,
    /// A binding declaration; zero children for a bare declaration, one
    /// child holding the initializer expression otherwise
    Let { symbol: SymbolId, ty: Type },
    /// Two children: condition, body block
    If,
    /// Two children: condition, body block
    Elif,
    /// One child: body block
    Else,
    /// Two children: condition, body block
    While,
    Break,
    Continue,
    /// Zero children for a bare return, one child for a returned value
    Return,
    /// Structural wrapper the parser leaves around a single expression
    /// tree. Doubles as an expression statement when it appears directly
    /// inside a block.
    Expression,
    /// Structural wrapper the parser leaves around a name lookup
    Name,
    /// Two children: left operand, right operand
    Binary(BinaryOperatorKind),
    /// One child: the operand
    Unary(UnaryOperatorKind),
    /// One child: the operand
    Negate,
    /// Children are the argument expressions, left to right
    Call { callee: SymbolId },
    /// A use of a previously declared symbol
    Get { symbol: SymbolId },
    Literal(Literal),
    /// One child: the body block
    Function {
        symbol: SymbolId,
        signature: FunctionSignature,
    },
    /// Struct lowering has not been built yet; the declaration is carried
    /// through the tree and skipped by the backend
    Struct,
    /// One child: the body block. `name` is the source level test name,
    /// kept for human readable driver output.
    Test { symbol: SymbolId, name: String },
}

#[derive(Debug)]
pub struct FunctionSignature {
    pub return_type: Type,
    pub parameters: Vec<FunctionParameter>,
}

#[derive(Debug)]
pub struct FunctionParameter {
    pub symbol: SymbolId,
    pub ty: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum BinaryOperatorKind {
    Assign,               // =
    Equals,               // ==
    NotEquals,            // !=
    GreaterThan,          // >
    GreaterThanOrEqualTo, // >=
    LessThan,             // <
    LessThanOrEqualTo,    // <=
    Add,                  // +
    Subtract,             // -
    Multiply,             // *
    Divide,               // /
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum UnaryOperatorKind {
    LogicalNot, // !
    AddressOf,  // &
    Deref,      // *
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Verbatim source spelling for i32 and Bool literals; the single
    /// source character for u8 literals
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    U8,
    I32,
    Bool,
}

/// Every top level function declaration in the program, collected across
/// all modules before codegen begins and read-only for the duration of one
/// emission pass.
///
/// Prototypes and definitions are both emitted in this order, so forward
/// and mutual references always resolve in a single pass over the
/// generated C.
#[derive(Debug)]
pub struct FunctionRegistry<'ast> {
    functions: Vec<&'ast Node>,
}

impl<'ast> FunctionRegistry<'ast> {
    /// Walks the top level of every module in order, registering each
    /// function declaration as it is encountered.
    pub fn collect(modules: &'ast [Node]) -> Self {
        let mut functions = Vec::new();

        for module in modules {
            for node in &module.children {
                if matches!(node.kind, NodeKind::Function { .. }) {
                    functions.push(node);
                }
            }
        }

        Self { functions }
    }

    pub fn functions(&self) -> &[&'ast Node] {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
